//! Recipe models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{non_negative, not_blank};

/// One ingredient line of a recipe or simulation, quantity in the
/// ingredient's own unit
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RecipeIngredientInput {
    pub ingredient_id: Uuid,
    #[validate(custom = "non_negative")]
    pub quantity: Decimal,
}

/// Input for creating a recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRecipeInput {
    #[validate(custom = "not_blank")]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: i32,
    #[validate(range(min = 0))]
    pub preparation_time: Option<i32>,
    pub difficulty: Option<String>,
    pub instructions: Option<String>,
    pub category_id: Option<Uuid>,
    /// Flat per-batch overhead, defaults to zero
    #[validate(custom = "non_negative")]
    pub operational_cost: Option<Decimal>,
    /// Price of the whole batch, defaults to zero
    #[validate(custom = "non_negative")]
    pub selling_price: Option<Decimal>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientInput>,
}

/// Input for updating a recipe. When `ingredients` is present the
/// recipe's lines are replaced wholesale. `null` clears `description`,
/// `difficulty`, `instructions` or `category_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRecipeInput {
    #[validate(custom = "not_blank")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: Option<i32>,
    #[validate(range(min = 0))]
    pub preparation_time: Option<i32>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,
    #[validate(custom = "non_negative")]
    pub operational_cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub selling_price: Option<Decimal>,
    pub ingredients: Option<Vec<RecipeIngredientInput>>,
}

/// Input for an ad-hoc cost simulation over an arbitrary ingredient list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulationInput {
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientInput>,
    #[validate(custom = "non_negative")]
    pub operational_cost: Option<Decimal>,
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_null_category_clears_it() {
        let input: UpdateRecipeInput =
            serde_json::from_str(r#"{"category_id": null, "servings": 6}"#).unwrap();

        assert_eq!(input.category_id, Some(None));
        assert_eq!(input.description, None);
        assert_eq!(input.servings, Some(6));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_update_without_fields_changes_nothing() {
        let input: UpdateRecipeInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.category_id, None);
        assert_eq!(input.difficulty, None);
        assert!(input.ingredients.is_none());
    }
}
