#![forbid(unsafe_code)]

//! `toggleview-harness` binary.
//!
//! ```sh
//! toggleview-harness list
//! toggleview-harness run fling-left --fps 120
//! TOGGLEVIEW_LOG=toggleview_core=debug toggleview-harness run storm --seed 7
//! ```

use tracing_subscriber::EnvFilter;

/// Env var holding the log filter directives.
const LOG_ENV: &str = "TOGGLEVIEW_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = toggleview_harness::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
