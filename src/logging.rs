//! Subscriber setup for the binaries. `RUST_LOG` takes precedence over the
//! configured filter.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Logs to stderr.
pub fn init_stderr(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(io::stderr)
        .init();
}

/// Logs to the file at `path`, which is created or truncated. Used when the
/// terminal belongs to the UI.
pub fn init_file(default_filter: &str, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
