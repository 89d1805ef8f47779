//! Client for the external T21 document parsing service.

use crate::core::error::IngestError;
use crate::providers::util::with_retry;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// One vehicle extracted from a T21 document. Everything is optional at the
/// wire level; the ingestion workflow validates before touching the store.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRecord {
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub deal_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedDocument {
    pub vehicles: Vec<VehicleRecord>,
}

pub struct ParserClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ParserClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .user_agent("fundlot/1.0")
            .build()
            .map_err(|e| IngestError::Parser(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Probes `/health-check` with a hard 5-second timeout. Any transport
    /// failure or non-2xx status counts as unavailable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/health-check", self.base_url);
        debug!("Checking parser availability at {}", url);
        let result = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("T21 parser is unavailable: {}", e);
                false
            }
        }
    }

    /// Uploads one document to `/api/process-t21` and returns the extracted
    /// vehicle records.
    pub async fn process_document(&self, file: &Path) -> Result<ParsedDocument, IngestError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| IngestError::Parser(format!("failed to read {}: {e}", file.display())))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let url = format!("{}/api/process-t21", self.base_url);
        debug!("Uploading {} to {}", file_name, url);

        let response = with_retry(
            || async {
                let part = reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let form = reqwest::multipart::Form::new().part("file", part);
                self.client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .multipart(form)
                    .send()
                    .await
            },
            3,
            500,
        )
        .await
        .map_err(|e| IngestError::Parser(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Parser(format!(
                "API error: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| IngestError::Parser(e.to_string()))?;

        serde_json::from_str(&response_text).map_err(|_| {
            IngestError::Parser("Invalid data format received from T21 parser".to_string())
        })
    }
}
