//! Logging and trace export initialization.
//!
//! All diagnostics go to stderr; stdout is reserved for command output.
//!
//! - `GROVE_LOG` sets the filter (`EnvFilter` syntax, e.g. `grove=debug`).
//!   Without it the level follows `-v`: warn → info → debug.
//! - `GROVE_LOG_FORMAT=json` switches to JSON events with span-close timing.
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` (the standard OTLP env var):
//!   - unset → local logging only
//!   - `"stderr"` → same as `GROVE_LOG_FORMAT=json`
//!   - `"http://..."` → spans also exported over OTLP HTTP (`otel` feature)
//!
//! ## Distributed tracing
//!
//! If `TRACEPARENT` is set (W3C Trace Context format), spans are created as
//! children of the remote parent, so an orchestrator invoking grove can see
//! its analysis spans in the same trace.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Env var holding the log filter.
pub const LOG_ENV: &str = "GROVE_LOG";
/// Env var selecting the log format (`json` or anything else for text).
pub const LOG_FORMAT_ENV: &str = "GROVE_LOG_FORMAT";

/// Opaque guard; dropping it flushes and shuts down the OTLP pipeline.
/// Hold this in `main()` until exit.
pub struct TelemetryGuard {
    #[cfg(feature = "otel")]
    trace_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "otel")]
        if let Some(provider) = self.trace_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("otel trace shutdown error: {e}");
        }
    }
}

/// How log events are rendered on stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Initialize logging for a CLI run with the given `-v` count.
///
/// Returns a guard that must be held until the program exits.
#[must_use]
pub fn init(verbosity: u8) -> TelemetryGuard {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let format = match (
        std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
        endpoint.as_deref(),
    ) {
        (Some("json"), _) | (_, Some("stderr")) => LogFormat::Json,
        _ => LogFormat::Text,
    };

    match endpoint.as_deref() {
        None | Some("" | "stderr") => init_local(verbosity, format),
        #[cfg(feature = "otel")]
        Some(_) => init_otlp(verbosity, format),
        #[cfg(not(feature = "otel"))]
        Some(_) => {
            eprintln!(
                "warning: OTEL_EXPORTER_OTLP_ENDPOINT set but grove built without 'otel' feature"
            );
            init_local(verbosity, format)
        }
    }
}

/// Filter from `GROVE_LOG`, else derived from the verbosity count.
#[must_use]
pub fn filter_for(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

const fn noop_guard() -> TelemetryGuard {
    TelemetryGuard {
        #[cfg(feature = "otel")]
        trace_provider: None,
    }
}

fn init_local(verbosity: u8, format: LogFormat) -> TelemetryGuard {
    let registry = tracing_subscriber::registry().with(filter_for(verbosity));
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init(),
    }
    noop_guard()
}

/// OTLP HTTP span export plus local stderr logging.
///
/// The SDK reads `OTEL_EXPORTER_OTLP_ENDPOINT` from the environment natively
/// and appends `/v1/traces`.
#[cfg(feature = "otel")]
fn init_otlp(verbosity: u8, format: LogFormat) -> TelemetryGuard {
    use opentelemetry::trace::TracerProvider as _;

    let span_exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            eprintln!("warning: failed to init OTLP span exporter: {e}");
            return init_local(verbosity, format);
        }
    };

    let trace_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_simple_exporter(span_exporter)
        .with_resource(otel_resource())
        .build();

    let tracer = trace_provider.tracer(env!("CARGO_PKG_NAME"));

    install_parent_context();

    let json = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text = (format == LogFormat::Text).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(json)
        .with(text)
        .init();

    TelemetryGuard {
        trace_provider: Some(trace_provider),
    }
}

/// If `TRACEPARENT` is set, install it as the current `OTel` context so that
/// subsequent spans become children of the remote parent.
#[cfg(feature = "otel")]
fn install_parent_context() {
    use opentelemetry::propagation::TextMapPropagator as _;
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use std::collections::HashMap;

    if let Ok(traceparent) = std::env::var("TRACEPARENT") {
        let mut carrier: HashMap<String, String> = HashMap::new();
        carrier.insert("traceparent".to_string(), traceparent);
        let cx = TraceContextPropagator::new().extract(&carrier);
        // Leaked on purpose: the context stays active for the whole process.
        std::mem::forget(cx.attach());
    }
}

#[cfg(feature = "otel")]
fn otel_resource() -> opentelemetry_sdk::Resource {
    use opentelemetry::KeyValue;
    opentelemetry_sdk::Resource::builder()
        .with_attribute(KeyValue::new("service.name", env!("CARGO_PKG_NAME")))
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build()
}
