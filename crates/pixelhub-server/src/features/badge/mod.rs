//! Embeddable dataset badges

pub mod routes;
pub mod svg;

pub use routes::badge_routes;
