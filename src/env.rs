use std::{cell::RefCell, ffi::OsStr, path::PathBuf};

/// Directory default output paths are placed in.
const DEFAULT_BUILD_DIR: &str = "build";

#[derive(Clone, Debug)]
struct Env {
    build_dir: PathBuf,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub fn init() {
    let value = Env {
        build_dir: var_or("MCASM_BUILD_DIR", DEFAULT_BUILD_DIR).into(),
    };
    set_env(value);
}

pub fn build_dir() -> PathBuf {
    with_env(|env| env.build_dir.clone())
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.as_ref().unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(env)
    })
}

// Unset and empty variables both fall back to the default
fn var_or(name: impl AsRef<OsStr>, default: &str) -> String {
    std::env::var(name.as_ref())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
