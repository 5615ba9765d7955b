use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod order;
pub mod settings;
pub mod watched_item;

// Re-exports for convenience
pub use order::*;
pub use settings::*;
pub use watched_item::*;

// Common enums used across models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT")]
pub enum ShipmentState {
    #[sqlx(rename = "ordered")]
    Ordered,
    #[sqlx(rename = "shipped")]
    Shipped,
    #[sqlx(rename = "delivered")]
    Delivered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Increased,
    Decreased,
}

// Helper function to generate ids in the format expected by the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
