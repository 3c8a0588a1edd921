pub mod create;
pub mod delete;
pub mod record_download;
pub mod record_view;

pub use create::CreateDatasetCommand;
pub use delete::{DeleteDatasetCommand, DeleteDatasetResponse};
pub use record_download::{ActivityBody, RecordDownloadCommand, RecordDownloadResponse};
pub use record_view::{RecordViewCommand, RecordViewResponse};
