use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{miette, IntoDiagnostic, NamedSource, Report, Result};

use mcasm::{Air, AsmParser, OpcodeTable, SymbolKind};

/// mcasm is a two-pass assembler for the 8-bit MightyController.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to assemble
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a `.asm` file into a raw `.bin` ROM image
    Assemble {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination of the ROM image, defaults to `build/<name>.bin`
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check a `.asm` file without outputting binary
    Check {
        /// File to check
        name: PathBuf,
        /// Print the resolved symbol table
        #[arg(short, long)]
        symbols: bool,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    mcasm::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(mcasm::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    match args.command {
        Some(Command::Assemble { name, out }) => assemble(&name, out),
        Some(Command::Check { name, symbols }) => {
            file_message(Green, "Checking", &name);
            let contents = read_source(&name)?;
            let table = OpcodeTable::new();
            let air = parse(&name, &contents, &table)?;
            // Branch targets are only resolved while emitting
            let rom = air.emit().map_err(|e| with_source(e.into(), &name, &contents))?;
            if symbols {
                print_symbols(&air);
            }
            message(Green, "Success", &format!("no errors found! ({} bytes)", rom.len()));
            Ok(())
        }
        None => match args.path {
            Some(path) => assemble(&path, None),
            None => {
                println!("\n~ mcasm v{VERSION} ~");
                println!("{SHORT_INFO}");
                Ok(())
            }
        },
    }
}

enum MsgColor {
    Green,
    Cyan,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
    };
    println!("{left:>12} {right}");
}

fn assemble(name: &Path, out: Option<PathBuf>) -> Result<()> {
    file_message(MsgColor::Green, "Assembling", name);
    let contents = read_source(name)?;
    let table = OpcodeTable::new();
    let air = parse(name, &contents, &table)?;
    let rom = air
        .emit()
        .map_err(|e| with_source(e.into(), name, &contents))?;
    message(MsgColor::Green, "Finished", &format!("{} bytes", rom.len()));

    let out = match out {
        Some(out) => out,
        None => default_out(name)?,
    };
    fs::write(&out, &rom).into_diagnostic()?;
    file_message(MsgColor::Green, "Saved", &out);
    Ok(())
}

fn read_source(name: &Path) -> Result<String> {
    fs::read_to_string(name)
        .map_err(|e| miette!("Failed to read {}: {e}", name.display()))
}

/// First pass, with the source attached to any diagnostic
fn parse<'a>(name: &Path, contents: &'a str, table: &OpcodeTable) -> Result<Air<'a>> {
    AsmParser::new(contents, table)
        .parse()
        .map_err(|e| with_source(e.into(), name, contents))
}

fn with_source(report: Report, name: &Path, contents: &str) -> Report {
    report.with_source_code(NamedSource::new(
        name.display().to_string(),
        contents.to_string(),
    ))
}

/// `<build dir>/<stem>.bin`, creating the build directory if needed
fn default_out(name: &Path) -> Result<PathBuf> {
    let dir = mcasm::env::build_dir();
    fs::create_dir_all(&dir).into_diagnostic()?;
    let stem = name
        .file_stem()
        .ok_or_else(|| miette!("{} has no file name", name.display()))?;
    Ok(dir.join(format!("{}.bin", stem.to_string_lossy())))
}

fn print_symbols(air: &Air) {
    if air.symbols().is_empty() {
        message(MsgColor::Cyan, "Symbols", "none defined");
        return;
    }
    for (name, entry) in air.symbols().iter() {
        let kind = match entry.kind {
            SymbolKind::Label => "label",
            SymbolKind::Const => "const",
        };
        message(
            MsgColor::Cyan,
            kind,
            &format!("{name} = ${:02X} (line {})", entry.value, entry.line),
        );
    }
}

const SHORT_INFO: &str = r"
Welcome to mcasm, the assembler for the 8-bit MightyController.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
