//! Field value gauges
//!
//! Numeric field changes are exported as one gauge per
//! (group, version, kind, namespace, name, field).

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

/// Gauge name
pub const FIELD_VALUES: &str = "field_values";

/// Gauge label names, in label-value order
pub const LABELS: [&str; 6] = ["group", "version", "kind", "namespace", "name", "field"];

/// Label set of one field gauge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLabels {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub field: String,
}

impl FieldLabels {
    /// Label values in `LABELS` order
    pub fn values(&self) -> [&str; 6] {
        [
            self.group.as_str(),
            self.version.as_str(),
            self.kind.as_str(),
            self.namespace.as_str(),
            self.name.as_str(),
            self.field.as_str(),
        ]
    }
}

/// Receives numeric field values.
pub trait MetricsSink: Send + Sync {
    /// Sets the gauge for `labels`
    fn set(&self, labels: &FieldLabels, value: f64);

    /// Removes the gauge for `labels`, if present
    fn delete(&self, labels: &FieldLabels);
}

/// Prometheus-backed sink with its own registry.
#[derive(Clone)]
pub struct FieldValueGauges {
    gauges: GaugeVec,
    registry: Registry,
}

impl FieldValueGauges {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let gauges = GaugeVec::new(Opts::new(FIELD_VALUES, "field values"), &LABELS)?;
        registry.register(Box::new(gauges.clone()))?;
        Ok(Self { gauges, registry })
    }

    /// Current value of one gauge, if it exists
    pub fn get(&self, labels: &FieldLabels) -> Option<f64> {
        let text = self.encode().ok()?;
        let pairs: Vec<String> = LABELS
            .iter()
            .zip(labels.values())
            .map(|(name, value)| format!("{name}=\"{value}\""))
            .collect();
        text.lines()
            .filter(|line| line.starts_with(FIELD_VALUES))
            .find(|line| pairs.iter().all(|p| line.contains(p.as_str())))
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    /// Text exposition of every registered gauge
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for FieldValueGauges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValueGauges").finish_non_exhaustive()
    }
}

impl MetricsSink for FieldValueGauges {
    fn set(&self, labels: &FieldLabels, value: f64) {
        match self.gauges.get_metric_with_label_values(&labels.values()) {
            Ok(gauge) => gauge.set(value),
            Err(e) => debug!(error = %e, field = %labels.field, "failed to set field gauge"),
        }
    }

    fn delete(&self, labels: &FieldLabels) {
        // Missing gauges are fine here.
        let _ = self.gauges.remove_label_values(&labels.values());
    }
}
