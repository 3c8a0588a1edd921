pub mod publish;

pub use publish::{PublishDatasetCommand, PublishDatasetResponse};
