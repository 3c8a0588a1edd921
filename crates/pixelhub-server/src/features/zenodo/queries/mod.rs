pub mod connection;

pub use connection::{ConnectionQuery, ConnectionReport};
