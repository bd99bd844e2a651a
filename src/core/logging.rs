//! Logging initialization and utilities

/// Default `RUST_LOG` filter: renderer diagnostics at `info`, everything
/// else at `warn`.
const DEFAULT_FILTER: &str = "warn,quadvox=info";

/// Initialize the logging system for binaries embedding the renderer.
///
/// Per-frame statistics are emitted at `debug` under the `quadvox` target;
/// raise the filter (e.g. `RUST_LOG=quadvox=debug`) to see them. Timestamps
/// are dropped: frame logs are read as a stream, not correlated by wall
/// clock.
///
/// # Example
/// ```
/// quadvox::core::logging::init();
/// log::info!("renderer ready");
/// ```
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp(None)
        .init();
}
