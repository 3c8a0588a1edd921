pub mod view;

pub use view::{CartLine, CartView, ViewCartQuery};
