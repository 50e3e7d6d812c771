use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` refines the filter; `default_level` is always added so a bare
/// invocation still reports at that level. Logs go to stderr so stdout stays
/// clean for command results.
pub fn init(default_level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
