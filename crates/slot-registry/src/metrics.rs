use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct DispatchMetrics {
    /// Requests by classified intent.
    pub requests: IntCounterVec,
    /// Failed requests by error kind.
    pub failures: IntCounterVec,
    pub device_commands: IntCounter,
    pub transport_failures: IntCounter,
    pub occupied_slots: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub dispatch: DispatchMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("cardslot_requests_total", "Dispatched commands by intent"),
            &["intent"],
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let failures = IntCounterVec::new(
            Opts::new("cardslot_failures_total", "Failed commands by error kind"),
            &["kind"],
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let device_commands =
            IntCounter::new("cardslot_device_commands_total", "Device commands sent")
                .map_err(|e| format!("metrics init error: {e}"))?;
        let transport_failures = IntCounter::new(
            "cardslot_transport_failures_total",
            "Device commands the transport failed to deliver",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let occupied_slots = IntGauge::new("cardslot_occupied_slots", "Items in the slot table")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let dispatch = DispatchMetrics {
            requests,
            failures,
            device_commands,
            transport_failures,
            occupied_slots,
        };
        let _ = registry.register(Box::new(dispatch.requests.clone()));
        let _ = registry.register(Box::new(dispatch.failures.clone()));
        let _ = registry.register(Box::new(dispatch.device_commands.clone()));
        let _ = registry.register(Box::new(dispatch.transport_failures.clone()));
        let _ = registry.register(Box::new(dispatch.occupied_slots.clone()));
        Ok(Self { registry, dispatch })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
