use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySettings {
    pub company_name: String,
    pub contact_numbers: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            company_name: "Bikaner Express Delivery".to_string(),
            contact_numbers: String::new(),
        }
    }
}

/// Rate card entry shown to customers when booking a delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRate {
    pub id: Uuid,
    pub name: String,
    pub amount: u64,
}
