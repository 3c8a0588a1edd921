//! Domain models

pub mod activity;
pub mod cart;
pub mod dataset;

pub use activity::{ActivityTotals, DownloadRecord, ViewRecord};
pub use cart::CartItem;
pub use dataset::{
    Author, Dataset, DatasetCapabilities, DatasetFile, DatasetKind, DatasetMetadata, NewDataset,
    NewDatasetFile, PixPayload, PublicationType,
};
