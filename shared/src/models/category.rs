//! Category models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::not_blank;

/// Input for creating a category shared by recipes and ingredients
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(max = 100), custom = "not_blank")]
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(max = 100), custom = "not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
}
