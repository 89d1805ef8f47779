//! Document ingestion workflow.
//!
//! Each uploaded T21 document goes through the external parser, and every
//! extracted vehicle is validated before any store write. New vehicles are
//! inserted and immediately assigned to the fund their deal type maps to;
//! known VINs get their fields refreshed. The hosted store offers no
//! transaction across the two inserts, so a failed assignment triggers a
//! compensating delete of the just-inserted asset.

use crate::core::asset::validate_vin;
use crate::core::error::{IngestError, ValidationError};
use crate::core::fund::{FundId, fund_for_deal_type};
use crate::providers::parser::{ParserClient, VehicleRecord};
use crate::store::{AssetPatch, AssetStore, AssignmentUpsert, NewAsset};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ImportStatus {
    Created { fund: FundId },
    Updated,
    Rejected { reason: String },
}

/// Outcome for one vehicle of one document.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub vin: String,
    pub vehicle: String,
    pub status: ImportStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct ValidVehicle {
    vin: String,
    year: i32,
    make: String,
    model: String,
    purchase_price: Option<f64>,
    deal_type: Option<String>,
}

fn validate_vehicle(record: &VehicleRecord) -> Result<ValidVehicle, ValidationError> {
    validate_vin(&record.vin)?;
    let year = record.year.ok_or(ValidationError::MissingField("year"))?;
    let make = record
        .make
        .clone()
        .filter(|m| !m.trim().is_empty())
        .ok_or(ValidationError::MissingField("make"))?;
    let model = record
        .model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .ok_or(ValidationError::MissingField("model"))?;
    Ok(ValidVehicle {
        vin: record.vin.clone(),
        year,
        make,
        model,
        purchase_price: record.purchase_price,
        deal_type: record.deal_type.clone(),
    })
}

pub struct DocumentIngestor<'a> {
    parser: &'a ParserClient,
    store: &'a dyn AssetStore,
}

impl<'a> DocumentIngestor<'a> {
    pub fn new(parser: &'a ParserClient, store: &'a dyn AssetStore) -> Self {
        Self { parser, store }
    }

    /// Parses one document and ingests its vehicles in order.
    ///
    /// Invalid vehicles are reported as rejected and the rest of the file
    /// continues; parser or store failures abort the file.
    pub async fn ingest_file(&self, file: &Path) -> Result<Vec<ImportRecord>, IngestError> {
        if !self.parser.is_available().await {
            return Err(IngestError::ParserUnavailable);
        }

        let document = self.parser.process_document(file).await?;
        info!(
            file = %file.display(),
            vehicles = document.vehicles.len(),
            "Parsed document"
        );

        let mut records = Vec::with_capacity(document.vehicles.len());
        for vehicle in &document.vehicles {
            let description = match (vehicle.year, &vehicle.make, &vehicle.model) {
                (Some(year), Some(make), Some(model)) => format!("{year} {make} {model}"),
                _ => "(incomplete record)".to_string(),
            };
            let status = match self.ingest_vehicle(vehicle).await {
                Ok(status) => status,
                Err(IngestError::Validation(e)) => ImportStatus::Rejected {
                    reason: e.to_string(),
                },
                Err(e) => return Err(e),
            };
            records.push(ImportRecord {
                vin: vehicle.vin.clone(),
                vehicle: description,
                status,
                timestamp: Utc::now(),
            });
        }
        Ok(records)
    }

    async fn ingest_vehicle(&self, record: &VehicleRecord) -> Result<ImportStatus, IngestError> {
        let vehicle = validate_vehicle(record)?;

        if self.store.find_asset_by_vin(&vehicle.vin).await?.is_some() {
            self.store
                .update_asset_by_vin(
                    &vehicle.vin,
                    AssetPatch {
                        year: vehicle.year,
                        make: vehicle.make,
                        model: vehicle.model,
                        purchase_price: vehicle.purchase_price,
                    },
                )
                .await?;
            return Ok(ImportStatus::Updated);
        }

        let asset = self
            .store
            .insert_asset(NewAsset {
                vin: vehicle.vin.clone(),
                year: vehicle.year,
                make: vehicle.make,
                model: vehicle.model,
                purchase_price: vehicle.purchase_price,
            })
            .await?;

        let fund = fund_for_deal_type(vehicle.deal_type.as_deref().unwrap_or_default());
        let assignment = AssignmentUpsert {
            asset_id: asset.id.clone(),
            fund_id: fund,
            display_order: 0,
            disposition_price: None,
        };
        if let Err(e) = self.store.upsert_assignment(assignment).await {
            // No transaction spans the two inserts; remove the asset rather
            // than leave it orphaned and unassigned.
            if let Err(delete_err) = self.store.delete_asset(&asset.id).await {
                warn!(
                    asset_id = %asset.id,
                    error = %delete_err,
                    "Compensating delete failed after assignment error"
                );
            }
            return Err(e.into());
        }

        Ok(ImportStatus::Created { fund })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreConfig;
    use crate::store::memory::MemoryStore;
    use crate::store::rest::RestStore;
    use std::io::Write;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(vin: &str, deal_type: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            vin: vin.to_string(),
            year: Some(2008),
            make: Some("GMC".to_string()),
            model: Some("Yukon".to_string()),
            purchase_price: Some(2600.0),
            deal_type: deal_type.map(str::to_string),
        }
    }

    async fn parser_with_vehicles(body: &str) -> (MockServer, ParserClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health-check"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/process-t21"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(&mock_server)
            .await;
        let client = ParserClient::new(&mock_server.uri(), "secret").unwrap();
        (mock_server, client)
    }

    fn temp_document() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"t21").unwrap();
        file
    }

    #[tokio::test]
    async fn test_new_vehicle_is_created_and_assigned_by_deal_type() {
        let body = r#"{"vehicles": [
            {"vin": "1GKFK13038J127695", "year": 2008, "make": "GMC", "model": "Yukon", "deal_type": "BHPH Financed"},
            {"vin": "3VWPW31C98M518041", "year": 2008, "make": "Volkswagen", "model": "New Beetle Coupe", "deal_type": "Cash"},
            {"vin": "1G1ZS58FX8F101877", "year": 2008, "make": "Chevrolet", "model": "Malibu Classic", "deal_type": "Auction"}
        ]}"#;
        let (_server, parser) = parser_with_vehicles(body).await;
        let store = MemoryStore::new();
        let ingestor = DocumentIngestor::new(&parser, &store);

        let file = temp_document();
        let records = ingestor.ingest_file(file.path()).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].status,
            ImportStatus::Created { fund: FundId::Bhph }
        );
        assert_eq!(
            records[1].status,
            ImportStatus::Created { fund: FundId::Caps }
        );
        assert_eq!(
            records[2].status,
            ImportStatus::Created {
                fund: FundId::Cos10
            }
        );
        assert_eq!(store.asset_count().await, 3);
        assert_eq!(store.list_assignments().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_known_vin_updates_in_place() {
        let body = r#"{"vehicles": [
            {"vin": "1GKFK13038J127695", "year": 2009, "make": "GMC", "model": "Yukon Denali"}
        ]}"#;
        let (_server, parser) = parser_with_vehicles(body).await;
        let store = MemoryStore::new();
        store
            .seed_asset("1GKFK13038J127695", 2008, "GMC", "Yukon", None, None)
            .await;
        let ingestor = DocumentIngestor::new(&parser, &store);

        let file = temp_document();
        let records = ingestor.ingest_file(file.path()).await.unwrap();

        assert_eq!(records[0].status, ImportStatus::Updated);
        assert_eq!(store.asset_count().await, 1);
        // Updating an existing asset never touches its fund assignment.
        assert!(store.list_assignments().await.unwrap().is_empty());

        let asset = store
            .find_asset_by_vin("1GKFK13038J127695")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(asset.year, 2009);
        assert_eq!(asset.model, "Yukon Denali");
    }

    #[tokio::test]
    async fn test_short_vin_is_rejected_before_any_write() {
        let body = r#"{"vehicles": [
            {"vin": "1GKFK13038J12769", "year": 2008, "make": "GMC", "model": "Yukon"},
            {"vin": "", "make": "GMC", "model": "Yukon"},
            {"vin": "1G1ZS58FX8F101877", "make": "Chevrolet", "model": "Malibu"}
        ]}"#;
        let (_server, parser) = parser_with_vehicles(body).await;
        let store = MemoryStore::new();
        let ingestor = DocumentIngestor::new(&parser, &store);

        let file = temp_document();
        let records = ingestor.ingest_file(file.path()).await.unwrap();

        assert_eq!(records.len(), 3);
        assert!(matches!(records[0].status, ImportStatus::Rejected { .. }));
        assert!(matches!(records[1].status, ImportStatus::Rejected { .. }));
        // The third has a valid VIN but no year.
        match &records[2].status {
            ImportStatus::Rejected { reason } => assert!(reason.contains("year"), "{reason}"),
            other => panic!("expected rejection, got {other:?}"),
        }

        assert_eq!(store.asset_count().await, 0);
        assert!(store.list_assignments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_parser_short_circuits() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health-check"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;
        let parser = ParserClient::new(&mock_server.uri(), "secret").unwrap();
        let store = MemoryStore::new();
        let ingestor = DocumentIngestor::new(&parser, &store);

        let file = temp_document();
        let err = ingestor.ingest_file(file.path()).await.unwrap_err();
        assert!(matches!(err, IngestError::ParserUnavailable));
        assert_eq!(store.asset_count().await, 0);
    }

    /// The asset insert succeeds, the assignment insert fails: the asset row
    /// must be deleted again, leaving the store in its pre-call state.
    #[tokio::test]
    async fn test_failed_assignment_triggers_compensating_delete() {
        let body = r#"{"vehicles": [
            {"vin": "1GKFK13038J127695", "year": 2008, "make": "GMC", "model": "Yukon", "deal_type": "Cash"}
        ]}"#;
        let (_parser_server, parser) = parser_with_vehicles(body).await;

        let store_server = MockServer::start().await;
        // VIN lookup finds nothing.
        Mock::given(method("GET"))
            .and(path("/rest/v1/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&store_server)
            .await;
        // Asset insert succeeds and mints an id.
        Mock::given(method("POST"))
            .and(path("/rest/v1/assets"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([{
                "id": "minted-id",
                "vin": "1GKFK13038J127695",
                "year": 2008,
                "make": "GMC",
                "model": "Yukon"
            }])))
            .mount(&store_server)
            .await;
        // Assignment insert fails.
        Mock::given(method("POST"))
            .and(path("/rest/v1/fund_assets"))
            .respond_with(
                ResponseTemplate::new(409).set_body_string(r#"{"message":"conflict"}"#),
            )
            .mount(&store_server)
            .await;
        // The compensating delete must target the minted id.
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/assets"))
            .and(query_param("id", "eq.minted-id"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&store_server)
            .await;

        let store = RestStore::new(&StoreConfig {
            base_url: store_server.uri(),
            api_key: "test-key".to_string(),
        })
        .unwrap();
        let ingestor = DocumentIngestor::new(&parser, &store);

        let file = temp_document();
        let err = ingestor.ingest_file(file.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("Database error:"), "{err}");
    }

    #[test]
    fn test_validate_vehicle_field_checks() {
        let mut record = record("1GKFK13038J127695", None);
        assert!(validate_vehicle(&record).is_ok());

        record.make = Some("  ".to_string());
        assert_eq!(
            validate_vehicle(&record).unwrap_err(),
            ValidationError::MissingField("make")
        );

        record.make = Some("GMC".to_string());
        record.model = None;
        assert_eq!(
            validate_vehicle(&record).unwrap_err(),
            ValidationError::MissingField("model")
        );
    }
}
