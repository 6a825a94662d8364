use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use scribe::config::Settings;
use scribe::host::{MemoryHost, Pane};
use scribe::scripting::ScriptEngine;

static TRACING_INIT: Once = Once::new();

/// Log to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// `scribe <file> [script]`: run a script against `file` and print the
/// style runs its `on_style` handler produces as JSON
fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let Some(file) = args.get(1).map(PathBuf::from) else {
        return Err("usage: scribe <file> [script]".to_string());
    };

    let settings = Settings::load()?;
    let text = std::fs::read_to_string(&file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;

    let mut host = MemoryHost::with_text(&text);
    host.set_code_page(Pane::Editor, settings.code_page as isize);

    let mut engine = ScriptEngine::with_host(Box::new(host), settings)?;
    engine.activate_buffer(0);

    match args.get(2) {
        Some(script) => engine.load_file(&PathBuf::from(script))?,
        None => engine.load_default()?,
    }

    if let Some(styled) = engine.style_document()? {
        let runs = serde_json::to_string_pretty(&styled.runs())
            .map_err(|e| format!("Failed to serialize styles: {}", e))?;
        println!("{}", runs);
    }

    // Whatever the script traced
    let output = engine
        .session()
        .write()
        .map_err(|_| "Scripting session is unavailable".to_string())?
        .pane_text(Pane::Output)
        .map_err(|e| e.to_string())?;
    eprint!("{}", output);

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("scribe: {}", e);
            ExitCode::FAILURE
        }
    }
}
