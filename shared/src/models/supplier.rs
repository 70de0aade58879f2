//! Supplier models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::not_blank;

/// Input for registering a supplier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Brazilian company registration number
    pub cnpj: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    #[validate(custom = "not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cnpj: Option<String>,
    pub is_active: Option<bool>,
}
