/*!
Observability for the Rotalog store.

- Structured logging setup through `tracing-subscriber`
- Optional Prometheus counters (`metrics` feature), one registry per log instance
*/

#[cfg(feature = "metrics")]
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Registry, TextEncoder};
use tracing::subscriber::set_global_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry as TracingRegistry};

use crate::{Result, RotalogError};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_LOG_DIRECTIVE: &str = "rotalog_core=info";

/// Metrics for one rotating log instance
#[cfg(feature = "metrics")]
#[derive(Debug)]
pub struct LogMetrics {
    pub writes_total: Counter,
    pub reads_total: Counter,
    pub errors_total: Counter,
    pub archives_pruned_total: Counter,
    pub payload_size_bytes: Histogram,

    registry: Registry,
}

#[cfg(feature = "metrics")]
impl LogMetrics {
    /// Create counters registered in a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let writes_total = Counter::new("rotalog_writes_total", "Records appended to the log")
            .map_err(|e| RotalogError::observability(format!("Failed to create writes_total metric: {e}")))?;

        let reads_total = Counter::new("rotalog_reads_total", "Records read back from the log")
            .map_err(|e| RotalogError::observability(format!("Failed to create reads_total metric: {e}")))?;

        let errors_total = Counter::new("rotalog_errors_total", "Failed log operations")
            .map_err(|e| RotalogError::observability(format!("Failed to create errors_total metric: {e}")))?;

        let archives_pruned_total = Counter::new(
            "rotalog_archives_pruned_total",
            "Archive files deleted by retention",
        )
        .map_err(|e| {
            RotalogError::observability(format!("Failed to create archives_pruned_total metric: {e}"))
        })?;

        let payload_size_bytes = Histogram::with_opts(HistogramOpts::new(
            "rotalog_payload_size_bytes",
            "Uncompressed size of written payloads in bytes",
        ))
        .map_err(|e| {
            RotalogError::observability(format!("Failed to create payload_size_bytes metric: {e}"))
        })?;

        let collectors: [Box<dyn prometheus::core::Collector>; 5] = [
            Box::new(writes_total.clone()),
            Box::new(reads_total.clone()),
            Box::new(errors_total.clone()),
            Box::new(archives_pruned_total.clone()),
            Box::new(payload_size_bytes.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .map_err(|e| RotalogError::observability(format!("Failed to register metric: {e}")))?;
        }

        Ok(Self {
            writes_total,
            reads_total,
            errors_total,
            archives_pruned_total,
            payload_size_bytes,
            registry,
        })
    }

    pub fn record_write(&self, payload_size: usize) {
        self.writes_total.inc();
        self.payload_size_bytes.observe(payload_size as f64);
    }

    pub fn record_read(&self) {
        self.reads_total.inc();
    }

    pub fn record_error(&self) {
        self.errors_total.inc();
    }

    pub fn record_pruned(&self, count: usize) {
        self.archives_pruned_total.inc_by(count as f64);
    }

    /// Gather metrics in Prometheus text format
    pub fn gather_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| RotalogError::observability(format!("Failed to encode metrics: {e}")))?;

        String::from_utf8(buffer).map_err(|e| {
            RotalogError::observability(format!("Failed to convert metrics to string: {e}"))
        })
    }
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG` and falls back to [`DEFAULT_LOG_DIRECTIVE`]. With `json`
/// set, events are emitted as one JSON object per line.
pub fn init_observability(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    let registry = TracingRegistry::default().with(filter);

    let installed = if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(false);
        set_global_default(registry.with(fmt_layer))
    } else {
        set_global_default(registry.with(tracing_subscriber::fmt::layer().with_target(false)))
    };

    installed.map_err(|e| {
        RotalogError::observability(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    tracing::info!("Rotalog observability initialized");
    Ok(())
}

/// Initialize observability with plain-text output
pub fn init_default_observability() -> Result<()> {
    init_observability(false)
}
