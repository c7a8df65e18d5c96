//! termsnip - saved shell commands for the terminal
//!
//! Store named commands (optionally multi-step), group them, reorder them
//! and send them to a shell session. `termsnip host` serves the same
//! operations as a JSON-lines protocol for editor sidebars.

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

mod cli;

/// Log filter variable, e.g. `TERMSNIP_LOG=debug`
const LOG_ENV: &str = "TERMSNIP_LOG";

// stderr only: stdout carries protocol traffic in host mode
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::execute_cli(&args).map_err(|e| eyre!("{:#}", e))
}
