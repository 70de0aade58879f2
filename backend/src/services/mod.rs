//! Business logic services for the bakery back office

pub mod auth;
pub mod calculator;
pub mod category;
pub mod ingredient;
pub mod recipe;
pub mod supplier;
pub mod user;

pub use auth::AuthService;
pub use calculator::CalculatorService;
pub use category::CategoryService;
pub use ingredient::IngredientService;
pub use recipe::RecipeService;
pub use supplier::SupplierService;
pub use user::UserService;
