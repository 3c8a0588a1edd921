//! Deposition API connection checks

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::features::zenodo::ZenodoClient;

pub const TEST_FILE_NAME: &str = "test_file.txt";
pub const TEST_FILE_CONTENT: &[u8] = b"This is a test file with some content.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionQuery {
    /// Also create, upload to and delete a test deposition
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub messages: Vec<String>,
}

/// True when listing depositions succeeds.
#[tracing::instrument(skip(client))]
pub async fn test_connection(client: &ZenodoClient) -> bool {
    match client.list_depositions().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Deposition API connection test failed");
            false
        },
    }
}

/// Create a test deposition, upload a file to it and delete it.
#[tracing::instrument(skip(client))]
pub async fn test_full_connection(client: &ZenodoClient) -> ConnectionReport {
    let metadata = json!({
        "title": "Test Deposition",
        "upload_type": "dataset",
        "description": "This is a test deposition created via Zenodo API",
        "creators": [{"name": "John Doe"}],
    });

    let deposition = match client.create_deposition(metadata).await {
        Ok(deposition) => deposition,
        Err(e) => {
            return ConnectionReport {
                success: false,
                messages: vec![format!("Failed to create test deposition: {}", e)],
            }
        },
    };

    let mut report = ConnectionReport {
        success: true,
        messages: Vec::new(),
    };

    if let Err(e) = client
        .upload_file(deposition.id, TEST_FILE_NAME, Some(TEST_FILE_CONTENT))
        .await
    {
        report.success = false;
        report.messages.push(format!("Failed to upload test file: {}", e));
    }

    if let Err(e) = client.delete_deposition(deposition.id).await {
        report.success = false;
        report
            .messages
            .push(format!("Failed to delete test deposition: {}", e));
    }

    report
}

pub async fn handle(client: &ZenodoClient, query: ConnectionQuery) -> ConnectionReport {
    if query.full {
        return test_full_connection(client).await;
    }

    let success = test_connection(client).await;
    ConnectionReport {
        success,
        messages: if success {
            Vec::new()
        } else {
            vec!["Deposition API is unreachable".to_string()]
        },
    }
}
