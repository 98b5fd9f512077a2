use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Installs the fmt subscriber on stderr. Stays silent for plain CLI runs;
/// server mode logs at info, `--verbose` at debug.
pub fn init(verbose: bool, server: bool) -> Result<()> {
    let level = match (verbose, server) {
        (true, _) => Level::DEBUG,
        (false, true) => Level::INFO,
        (false, false) => return Ok(()),
    };
    let _ = fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .try_init();
    Ok(())
}
