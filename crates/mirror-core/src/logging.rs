use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for mirroring diagnostics.
///
/// `RUST_LOG` wins when set. Otherwise `debug` selects the level: with it
/// on, segment splits, shared prefixes and planned directories are printed.
pub fn init(debug: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(debug)
        .with_line_number(debug)
        .compact();

    let default_level = default_level(debug);
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn default_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}
