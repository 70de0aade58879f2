//! Validation rules for request models
//!
//! Custom validators plug into `validator` derives via
//! `#[validate(custom = "...")]`.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::RecipeIngredientInput;

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Reject negative money or quantity values
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(error("non_negative", "Value must not be negative"));
    }
    Ok(())
}

/// Reject strings that are empty after trimming
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "Value must not be blank"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(error(
            "password_length",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Validate every ingredient line of a recipe or simulation
pub fn validate_lines(lines: &[RecipeIngredientInput]) -> Result<(), ValidationErrors> {
    for line in lines {
        line.validate()?;
    }
    Ok(())
}
