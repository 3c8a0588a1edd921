//! Per-user carts of dataset files

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::cart_routes;
