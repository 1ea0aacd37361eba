use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub status_transitions_total: IntCounterVec,
    pub photo_uploads_total: IntCounterVec,
    pub admin_logins_total: IntCounterVec,
    pub open_orders: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total delivery orders created")
                .expect("valid orders_created_total metric");

        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_total",
                "Order status transitions by target status",
            ),
            &["status"],
        )
        .expect("valid order_status_transitions_total metric");

        let photo_uploads_total = IntCounterVec::new(
            Opts::new("photo_uploads_total", "Photo uploads by kind"),
            &["kind"],
        )
        .expect("valid photo_uploads_total metric");

        let admin_logins_total = IntCounterVec::new(
            Opts::new("admin_logins_total", "Admin login attempts by outcome"),
            &["outcome"],
        )
        .expect("valid admin_logins_total metric");

        let open_orders = IntGauge::new("open_orders", "Orders not yet delivered")
            .expect("valid open_orders metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register order_status_transitions_total");
        registry
            .register(Box::new(photo_uploads_total.clone()))
            .expect("register photo_uploads_total");
        registry
            .register(Box::new(admin_logins_total.clone()))
            .expect("register admin_logins_total");
        registry
            .register(Box::new(open_orders.clone()))
            .expect("register open_orders");

        Self {
            registry,
            orders_created_total,
            status_transitions_total,
            photo_uploads_total,
            admin_logins_total,
            open_orders,
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
