use std::sync::RwLock;

use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::config::Config;
use crate::models::Principal;
use crate::models::order::DeliveryOrder;
use crate::models::profile::UserProfile;
use crate::models::rider::RiderProfile;
use crate::models::settings::{CompanySettings, DeliveryRate};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub orders: DashMap<Uuid, DeliveryOrder>,
    pub riders: DashMap<Principal, RiderProfile>,
    pub profiles: DashMap<Principal, UserProfile>,
    pub parcel_photos: DashMap<Uuid, Vec<u8>>,
    pub proof_photos: DashMap<Uuid, Vec<u8>>,
    pub sessions: DashMap<Uuid, AdminSession>,
    pub settings: RwLock<CompanySettings>,
    pub rates: DashMap<Uuid, DeliveryRate>,
    pub config: Config,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            orders: DashMap::new(),
            riders: DashMap::new(),
            profiles: DashMap::new(),
            parcel_photos: DashMap::new(),
            proof_photos: DashMap::new(),
            sessions: DashMap::new(),
            settings: RwLock::new(CompanySettings::default()),
            rates: DashMap::new(),
            config,
            metrics: Metrics::new(),
        }
    }

    /// Point-in-time copy of all orders, for reporting over a stable list.
    pub fn order_snapshot(&self) -> Vec<DeliveryOrder> {
        self.orders.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn rider_snapshot(&self) -> Vec<RiderProfile> {
        self.riders.iter().map(|entry| entry.value().clone()).collect()
    }
}
