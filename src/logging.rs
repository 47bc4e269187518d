use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a compact stderr subscriber. `RUST_LOG` directives are combined with `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
    Ok(())
}
