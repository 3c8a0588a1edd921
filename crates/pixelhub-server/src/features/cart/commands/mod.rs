pub mod add_item;
pub mod checkout;
pub mod remove_item;

pub use add_item::{AddCartItemBody, AddCartItemCommand};
pub use checkout::{CheckoutBody, CheckoutCommand};
pub use remove_item::{CartRemovalResponse, ClearCartCommand, RemoveCartItemCommand};
