//! HTTP request handlers

pub mod auth;
pub mod calculator;
pub mod category;
pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod supplier;
pub mod user;

pub use auth::*;
pub use calculator::*;
pub use category::*;
pub use health::*;
pub use ingredient::*;
pub use recipe::*;
pub use supplier::*;
pub use user::*;
