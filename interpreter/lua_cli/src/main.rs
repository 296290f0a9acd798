//! Command-line runner: execute a script file.
//!
//! One positional argument — the script path. Exit code 0 on success,
//! 1 on any surfaced error. The engine's filesystem is rooted at the
//! script's directory, so `dofile` resolves siblings.

mod tracing_setup;

use std::path::Path;
use std::process::ExitCode;

use lua_eval::{Engine, EngineError, ScriptFs};

fn main() -> ExitCode {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Some("--version") | Some("-V") => {
            println!("lua {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Some(path) => path.to_string(),
        None => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run_script(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lua: {err}");
            if let EngineError::Runtime(runtime) = &err {
                if !runtime.traceback.is_empty() {
                    eprintln!("{}", runtime.render_traceback());
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run_script(path: &str) -> Result<(), EngineError> {
    let script = Path::new(path);
    let dir = script.parent().filter(|p| !p.as_os_str().is_empty());
    let file = script
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let mut builder = Engine::builder();
    if let Some(dir) = dir {
        builder = builder.fs(ScriptFs::os(dir));
    }
    let mut engine = builder.build();
    engine.eval_file(&file).map(|_| ())
}

fn print_usage() {
    println!("Usage: lua <script.lua>");
    println!();
    println!("Runs a script file. Exit code 0 on success, 1 on any error.");
    println!();
    println!("Environment:");
    println!("  LUA_LOG     tracing filter (RUST_LOG syntax), default 'warn'");
}
