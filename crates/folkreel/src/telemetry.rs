//! OpenTelemetry span export.

use folkreel_core::LoggingConfig;
use folkreel_error::ConfigError;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Service name attached to exported spans.
pub const SERVICE_NAME: &str = "folkreel";

/// Install the fmt layer from `logging` plus an OpenTelemetry layer exporting
/// spans to stdout.
///
/// Returns the provider so the caller can flush it on exit.
pub fn init_observability(logging: &LoggingConfig) -> Result<SdkTracerProvider, ConfigError> {
    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attributes(vec![KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION"),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build();
    global::set_tracer_provider(provider.clone());

    let otel_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(logging.env_filter()?)
        .with(logging.fmt_layer())
        .with(otel_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(provider)
}

/// Flush and stop span export.
pub fn shutdown_observability(provider: SdkTracerProvider) {
    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "Failed to flush spans");
    }
}
