//! Route definitions for the bakery back office API

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/calculator", calculator_routes(state.clone()))
        .nest("/recipes", recipe_routes(state.clone()))
        .nest("/ingredients", ingredient_routes(state.clone()))
        .nest("/categories", category_routes(state.clone()))
        .nest("/suppliers", supplier_routes(state.clone()))
        .nest("/users", user_routes(state))
}

/// Authentication routes; register and login are public
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile", get(handlers::profile))
        .route("/refresh", post(handlers::refresh))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Costing routes (protected)
fn calculator_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/simulate", post(handlers::simulate_recipe_cost))
        .route("/margin-analysis", get(handlers::get_margin_analysis))
        .route(
            "/recipe/:recipe_id/calculate",
            post(handlers::calculate_recipe_costs),
        )
        .route(
            "/ingredient/:ingredient_id/usage",
            get(handlers::get_ingredient_usage),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Recipe routes (protected)
fn recipe_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes).post(handlers::create_recipe))
        .route("/stats", get(handlers::get_recipe_stats))
        .route(
            "/:recipe_id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Ingredient inventory routes (protected)
fn ingredient_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/alerts", get(handlers::get_stock_alerts))
        .route("/stats", get(handlers::get_ingredient_stats))
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
        .route(
            "/:ingredient_id/stock",
            patch(handlers::update_ingredient_stock),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Category routes (protected; mutations are admin only)
fn category_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Account routes (protected; listing and editing others are admin only)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route(
            "/profile",
            get(handlers::get_own_account).patch(handlers::update_profile),
        )
        .route("/stats", get(handlers::get_user_stats))
        .route("/change-password", post(handlers::change_password))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
