//! Ingredient (inventory item) models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::StockOperation;
use crate::validation::{non_negative, not_blank};

/// Input for creating an ingredient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIngredientInput {
    #[validate(custom = "not_blank")]
    pub name: String,
    pub description: Option<String>,
    /// Measurement unit label, e.g. "kg" or "un"
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    /// Cost of one `unit`
    #[validate(custom = "non_negative")]
    pub unit_cost: Decimal,
    #[validate(custom = "non_negative")]
    pub stock: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub min_stock: Option<Decimal>,
    pub expiration_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Input for updating an ingredient. Changing `unit_cost` does not
/// recalculate recipes that use the ingredient. Sending `null` for
/// `description`, `expiration_date`, `category_id` or `supplier_id`
/// clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateIngredientInput {
    #[validate(custom = "not_blank")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(custom = "non_negative")]
    pub unit_cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub stock: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub min_stock: Option<Decimal>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStockInput {
    #[validate(custom = "non_negative")]
    pub quantity: Decimal,
    #[serde(default)]
    pub operation: StockOperation,
}
