use anyhow::{Context, Result};
use reimburse_core::{config::LoggingConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber; logs go to stderr so stdout stays parseable
///
/// `RUST_LOG` wins over the configured level; `verbose` forces `debug`.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .with_context(|| format!("invalid log level `{}`", config.level))?
    };

    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match config.format {
        LogFormat::Full => registry.with(layer).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
    }
    .context("Failed to set tracing subscriber")
}
