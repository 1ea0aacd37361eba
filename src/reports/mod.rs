//! Pure aggregation over order snapshots for the admin dashboard and
//! downloadable reports. Everything here works on plain slices so it can be
//! exercised without the HTTP layer.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::order::{DeliveryOrder, OrderStatus, PaymentType};
use crate::models::rider::RiderProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    /// Inclusive lower bound of the reporting window: midnight today,
    /// midnight seven days ago, or the first of the current month.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let date = match self {
            ReportPeriod::Daily => now.date_naive(),
            ReportPeriod::Weekly => (now - Duration::days(7)).date_naive(),
            ReportPeriod::Monthly => {
                let today = now.date_naive();
                today.with_day(1).unwrap_or(today)
            }
        };
        date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "Daily",
            ReportPeriod::Weekly => "Weekly",
            ReportPeriod::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportData {
    pub total_orders: usize,
    pub delivered_count: usize,
    pub cash_orders: usize,
    pub online_orders: usize,
    pub total_earnings: u64,
    pub new_orders: usize,
    pub assigned_orders: usize,
    pub picked_orders: usize,
}

pub fn generate_report(
    orders: &[DeliveryOrder],
    period: ReportPeriod,
    now: DateTime<Utc>,
    base_rate: u64,
) -> ReportData {
    let start = period.start(now);
    let in_window: Vec<&DeliveryOrder> = orders
        .iter()
        .filter(|order| order.created_at >= start)
        .collect();

    let count_status =
        |status: OrderStatus| in_window.iter().filter(|o| o.status == status).count();
    let delivered_count = count_status(OrderStatus::Delivered);

    ReportData {
        total_orders: in_window.len(),
        delivered_count,
        cash_orders: in_window
            .iter()
            .filter(|o| o.payment_type == PaymentType::Cash)
            .count(),
        online_orders: in_window
            .iter()
            .filter(|o| o.payment_type == PaymentType::Online)
            .count(),
        total_earnings: delivered_count as u64 * base_rate,
        new_orders: count_status(OrderStatus::New),
        assigned_orders: count_status(OrderStatus::Assigned),
        picked_orders: count_status(OrderStatus::Picked),
    }
}

/// Two-column CSV matching the downloadable admin report.
pub fn render_csv(data: &ReportData, period: ReportPeriod) -> String {
    let rows = [
        ("Metric", "Value".to_string()),
        ("Report Period", period.label().to_string()),
        ("Total Orders", data.total_orders.to_string()),
        ("Delivered Orders", data.delivered_count.to_string()),
        ("Cash Orders", data.cash_orders.to_string()),
        ("Online Orders", data.online_orders.to_string()),
        ("Total Earnings (₹)", data.total_earnings.to_string()),
        ("New Orders", data.new_orders.to_string()),
        ("Assigned Orders", data.assigned_orders.to_string()),
        ("Picked Orders", data.picked_orders.to_string()),
    ];

    rows.iter()
        .map(|(metric, value)| format!("{metric},{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KpiSummary {
    pub today_orders: usize,
    pub month_orders: usize,
    pub pending_orders: usize,
    pub completed_orders: usize,
    pub active_riders: usize,
    pub daily_earnings: u64,
    pub monthly_earnings: u64,
}

pub fn kpi_summary(
    orders: &[DeliveryOrder],
    riders: &[RiderProfile],
    now: DateTime<Utc>,
    base_rate: u64,
) -> KpiSummary {
    let today_start = ReportPeriod::Daily.start(now);
    let month_start = ReportPeriod::Monthly.start(now);

    let today: Vec<&DeliveryOrder> = orders
        .iter()
        .filter(|o| o.created_at >= today_start)
        .collect();
    let month: Vec<&DeliveryOrder> = orders
        .iter()
        .filter(|o| o.created_at >= month_start)
        .collect();

    let delivered = |set: &[&DeliveryOrder]| {
        set.iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count()
    };

    KpiSummary {
        today_orders: today.len(),
        month_orders: month.len(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status != OrderStatus::Delivered)
            .count(),
        completed_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count(),
        active_riders: active_rider_count(orders, riders),
        daily_earnings: delivered(&today) as u64 * base_rate,
        monthly_earnings: delivered(&month) as u64 * base_rate,
    }
}

/// Riders currently holding an assigned or picked order.
pub fn active_rider_count(orders: &[DeliveryOrder], riders: &[RiderProfile]) -> usize {
    let active_ids: HashSet<&str> = orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Assigned | OrderStatus::Picked))
        .filter_map(|o| o.assigned_rider.as_ref().map(|r| r.as_str()))
        .collect();

    riders
        .iter()
        .filter(|rider| active_ids.contains(rider.id.as_str()))
        .count()
}
