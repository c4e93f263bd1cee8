use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON logging on stderr.
///
/// When `quiet` is true, only error-level events are emitted.
/// Otherwise info-level and above. `RUST_LOG` directives are honored on top.
pub fn init_logging(quiet: bool) {
    let directive = if quiet { "winctl=error" } else { "winctl=info" };

    let filter = match directive.parse() {
        Ok(parsed) => EnvFilter::from_default_env().add_directive(parsed),
        Err(_) => EnvFilter::from_default_env(),
    };

    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .try_init();

    // A host application may have installed its own subscriber already.
    if let Err(e) = installed {
        tracing::debug!(event = "core.logging.subscriber_already_set", error = %e);
    }
}
