//! Syntax checking for `.pix` model files

pub mod routes;
pub mod syntax;

pub use routes::pixchecker_routes;
pub use syntax::{check_pix, PixSyntaxError};
