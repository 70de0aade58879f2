//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a manual stock adjustment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    #[default]
    Add,
    Subtract,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("stock cannot become negative (current {current}, requested {requested})")]
    Negative { current: Decimal, requested: Decimal },
}

impl StockOperation {
    /// Apply the adjustment to the current stock level
    pub fn apply(&self, current: Decimal, quantity: Decimal) -> Result<Decimal, StockError> {
        let next = match self {
            StockOperation::Add => current + quantity,
            StockOperation::Subtract => current - quantity,
        };

        if next < Decimal::ZERO {
            return Err(StockError::Negative {
                current,
                requested: quantity,
            });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("ADMIN"), None);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_stock_add_and_subtract() {
        assert_eq!(StockOperation::Add.apply(dec("2.5"), dec("1.5")), Ok(dec("4.0")));
        assert_eq!(StockOperation::Subtract.apply(dec("2.5"), dec("2.5")), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_stock_cannot_go_negative() {
        let result = StockOperation::Subtract.apply(dec("1"), dec("1.01"));
        assert!(matches!(result, Err(StockError::Negative { .. })));
    }
}
