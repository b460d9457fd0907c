use tracing::Level;

/// Installs the stderr fmt subscriber. Later calls are no-ops.
pub fn init(level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Logging initialized at {}", level);
    }
}

/// Picks the effective level: explicit flag, then `-v`, then config.
pub fn effective_level(flag: Option<&str>, verbose: bool, configured: Level) -> anyhow::Result<Level> {
    if let Some(raw) = flag {
        return raw
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log level: {raw}"));
    }
    if verbose && configured < Level::DEBUG {
        return Ok(Level::DEBUG);
    }
    Ok(configured)
}
