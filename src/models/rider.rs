use serde::{Deserialize, Serialize};

use crate::models::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderProfile {
    pub id: Principal,
    pub name: String,
    pub phone_number: String,
    pub vehicle_type: String,
    pub location_url: Option<String>,
}
