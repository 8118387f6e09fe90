use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` adds to the default
/// `utility_pipeline=info` directive.
pub fn init_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(
        "utility_pipeline=info"
            .parse()
            .unwrap_or_else(|_| "info".parse().unwrap()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
