//! Prometheus metrics, registered under the `onrack` prefix.

use once_cell::sync::Lazy;
use prometheus_client::encoding::{text, EncodeLabelSet};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Labels of a served request.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    /// HTTP method.
    pub method: String,
    /// Matched route template, e.g. `/api/1.1/nodes/{id}`.
    pub route: String,
    /// Response status code.
    pub status: u16,
}

/// Process-wide metrics.
pub static METRICS: Lazy<MetricsState> = Lazy::new(MetricsState::new);

/// Request counters for the API routes.
#[derive(Clone)]
pub struct HttpMetrics {
    requests: Family<HttpLabels, Counter>,
    latency: Family<HttpLabels, Histogram>,
    in_flight: Gauge,
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            requests: Family::default(),
            latency: Family::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 16))
            }),
            in_flight: Gauge::default(),
        }
    }
}

/// Sizes of the inventory collections.
#[derive(Clone, Default)]
pub struct InventoryMetrics {
    nodes: Gauge,
    whitelist: Gauge,
}

/// Registry plus every metric family it exposes.
pub struct MetricsState {
    registry: Registry,
    /// API request metrics.
    pub http: HttpMetrics,
    /// Inventory gauges.
    pub inventory: InventoryMetrics,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsState {
    /// Builds the registry.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("onrack");

        let http = HttpMetrics::new();
        let api = registry.sub_registry_with_prefix("http");
        api.register("requests", "API requests served", http.requests.clone());
        api.register(
            "request_duration_seconds",
            "API request latency in seconds",
            http.latency.clone(),
        );
        api.register(
            "active_requests",
            "API requests in flight",
            http.in_flight.clone(),
        );

        let inventory = InventoryMetrics::default();
        registry.register("nodes", "Nodes in the inventory", inventory.nodes.clone());
        registry.register(
            "dhcp_whitelist_entries",
            "MAC addresses in the DHCP whitelist",
            inventory.whitelist.clone(),
        );

        Self {
            registry,
            http,
            inventory,
        }
    }

    /// Marks a request as started; pair with [`MetricsState::finish_request`].
    pub fn begin_request(&self) {
        self.http.in_flight.inc();
    }

    /// Records a completed request.
    pub fn finish_request(&self, labels: HttpLabels, seconds: f64) {
        self.http.in_flight.dec();
        self.http.requests.get_or_create(&labels).inc();
        self.http.latency.get_or_create(&labels).observe(seconds);
    }

    /// Sets the node gauge.
    pub fn set_nodes(&self, count: usize) {
        self.inventory.nodes.set(count as i64);
    }

    /// Sets the whitelist gauge.
    pub fn set_whitelist_size(&self, count: usize) {
        self.inventory.whitelist.set(count as i64);
    }

    /// Prometheus text exposition of the registry.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if let Err(e) = text::encode(&mut buffer, &self.registry) {
            tracing::error!(error = %e, "Failed to encode metrics");
        }
        buffer
    }
}
