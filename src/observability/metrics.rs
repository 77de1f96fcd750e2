use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub fixes_total: IntCounterVec,
    pub ingest_latency_seconds: HistogramVec,
    pub active_sos_alerts: IntGauge,
    pub driver_speed_kmh: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let fixes_total = IntCounterVec::new(
            Opts::new("fixes_total", "Location fix submissions by outcome"),
            &["outcome"],
        )
        .expect("valid fixes_total metric");

        let ingest_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "ingest_latency_seconds",
                "Latency of fix ingestion in seconds",
            ),
            &["outcome"],
        )
        .expect("valid ingest_latency_seconds metric");

        let active_sos_alerts = IntGauge::new(
            "active_sos_alerts",
            "Currently unresolved SOS alerts",
        )
        .expect("valid active_sos_alerts metric");

        let driver_speed_kmh = GaugeVec::new(
            Opts::new("driver_speed_kmh", "Latest derived speed per driver"),
            &["driver_id"],
        )
        .expect("valid driver_speed_kmh metric");

        registry
            .register(Box::new(fixes_total.clone()))
            .expect("register fixes_total");
        registry
            .register(Box::new(ingest_latency_seconds.clone()))
            .expect("register ingest_latency_seconds");
        registry
            .register(Box::new(active_sos_alerts.clone()))
            .expect("register active_sos_alerts");
        registry
            .register(Box::new(driver_speed_kmh.clone()))
            .expect("register driver_speed_kmh");

        Self {
            registry,
            fixes_total,
            ingest_latency_seconds,
            active_sos_alerts,
            driver_speed_kmh,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
