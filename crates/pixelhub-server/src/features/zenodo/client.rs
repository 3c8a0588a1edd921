//! HTTP client for the deposition API
//!
//! Speaks the Zenodo deposition protocol, which fakenodo emulates. Every
//! call expects a specific status code; anything else is returned as
//! [`ZenodoError::UnexpectedStatus`] carrying the response body. No call is
//! retried.

use pixelhub_common::deposition::{Deposition, DepositionFile};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ZenodoConfig;

#[derive(Debug, Error)]
pub enum ZenodoError {
    #[error("Deposition API returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Deposition API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ZenodoResult<T> = Result<T, ZenodoError>;

#[derive(Debug, Clone)]
pub struct ZenodoClient {
    http: Client,
    depositions_url: String,
    access_token: Option<String>,
}

impl ZenodoClient {
    pub fn new(config: &ZenodoConfig) -> ZenodoResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("PixelHub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            depositions_url: depositions_url(&config.url),
            access_token: config.access_token.clone(),
        })
    }

    /// Collection URL, e.g. `http://localhost:5001/api/depositions`
    pub fn depositions_url(&self) -> &str {
        &self.depositions_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.access_token {
            Some(token) => builder.query(&[("access_token", token)]),
            None => builder,
        }
    }

    async fn expect(response: Response, expected: &[StatusCode]) -> ZenodoResult<Response> {
        let status = response.status();
        if expected.contains(&status) {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ZenodoError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_depositions(&self) -> ZenodoResult<Vec<Deposition>> {
        let response = self
            .request(Method::GET, &self.depositions_url)
            .send()
            .await?;
        let response = Self::expect(response, &[StatusCode::OK]).await?;
        Ok(response.json().await?)
    }

    /// Create a draft deposition from Zenodo-style metadata.
    #[tracing::instrument(skip(self, metadata))]
    pub async fn create_deposition(&self, metadata: Value) -> ZenodoResult<Deposition> {
        let response = self
            .request(Method::POST, &self.depositions_url)
            .json(&json!({ "metadata": metadata }))
            .send()
            .await?;
        let response = Self::expect(response, &[StatusCode::CREATED]).await?;
        let deposition: Deposition = response.json().await?;

        tracing::info!(deposition_id = deposition.id, "Deposition created");
        Ok(deposition)
    }

    /// Attach a file to a deposition. Without `content` only the name is sent.
    #[tracing::instrument(skip(self, content))]
    pub async fn upload_file(
        &self,
        deposition_id: u64,
        name: &str,
        content: Option<&[u8]>,
    ) -> ZenodoResult<DepositionFile> {
        let mut form = multipart::Form::new().text("name", name.to_string());
        if let Some(bytes) = content {
            form = form.part(
                "file",
                multipart::Part::bytes(bytes.to_vec()).file_name(name.to_string()),
            );
        }

        let url = format!("{}/{}/files", self.depositions_url, deposition_id);
        let response = self.request(Method::POST, &url).multipart(form).send().await?;
        let response = Self::expect(response, &[StatusCode::CREATED]).await?;
        Ok(response.json().await?)
    }

    /// Publish a deposition, proposing `doi` when given.
    #[tracing::instrument(skip(self))]
    pub async fn publish_deposition(
        &self,
        deposition_id: u64,
        doi: Option<&str>,
    ) -> ZenodoResult<Deposition> {
        let url = format!("{}/{}/publish", self.depositions_url, deposition_id);
        let mut builder = self.request(Method::POST, &url);
        if let Some(doi) = doi {
            builder = builder.json(&json!({ "doi": doi }));
        }

        let response = builder.send().await?;
        let response = Self::expect(response, &[StatusCode::OK, StatusCode::ACCEPTED]).await?;
        let deposition: Deposition = response.json().await?;

        tracing::info!(
            deposition_id = deposition.id,
            doi = ?deposition.doi,
            "Deposition published"
        );
        Ok(deposition)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_deposition(&self, deposition_id: u64) -> ZenodoResult<Deposition> {
        let url = format!("{}/{}", self.depositions_url, deposition_id);
        let response = self.request(Method::GET, &url).send().await?;
        let response = Self::expect(response, &[StatusCode::OK]).await?;
        Ok(response.json().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_deposition(&self, deposition_id: u64) -> ZenodoResult<()> {
        let url = format!("{}/{}", self.depositions_url, deposition_id);
        let response = self.request(Method::DELETE, &url).send().await?;
        Self::expect(response, &[StatusCode::NO_CONTENT, StatusCode::OK]).await?;
        Ok(())
    }
}

fn depositions_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/depositions") {
        base.to_string()
    } else {
        format!("{}/depositions", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depositions_url_is_appended_once() {
        assert_eq!(
            depositions_url("http://localhost:5001/api"),
            "http://localhost:5001/api/depositions"
        );
        assert_eq!(
            depositions_url("http://localhost:5001/api/depositions/"),
            "http://localhost:5001/api/depositions"
        );
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let client = ZenodoClient::new(&ZenodoConfig::default()).unwrap();
        assert!(client.depositions_url().ends_with("/api/depositions"));
    }
}
