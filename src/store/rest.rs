//! REST client for the hosted table store.
//!
//! The store speaks a PostgREST-style interface: tables under `/rest/v1/`,
//! filters as query parameters, embedded joins via `select`, and upserts as
//! `POST` with `Prefer: resolution=merge-duplicates` plus an `on_conflict`
//! key. Every request carries the project API key.

use super::{AssetPatch, AssetStore, AssignmentRow, AssignmentUpsert, NewAsset, PriceUpdate};
use crate::core::asset::Asset;
use crate::core::config::StoreConfig;
use crate::core::error::StoreError;
use crate::core::fund::FundId;
use crate::providers::util::with_retry;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const ASSET_SELECT: &str = "*,fund_assets(fund_id,disposition_price)";
const ASSIGNMENT_SELECT: &str = "asset_id,fund_id,disposition_price,assets(sales_price)";

pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FundAssetFields {
    fund_id: FundId,
    #[serde(default)]
    disposition_price: Option<f64>,
}

/// An `assets` row with its embedded `fund_assets` join. The unique
/// constraint on `fund_assets.asset_id` means the array holds at most one
/// element.
#[derive(Debug, Deserialize)]
struct AssetRow {
    id: String,
    vin: String,
    year: i32,
    make: String,
    model: String,
    #[serde(default)]
    purchase_price: Option<f64>,
    #[serde(default)]
    total_cost: Option<f64>,
    #[serde(default)]
    sales_price: Option<f64>,
    #[serde(default)]
    fund_assets: Vec<FundAssetFields>,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        let assignment = row.fund_assets.into_iter().next();
        Asset {
            id: row.id,
            vin: row.vin,
            year: row.year,
            make: row.make,
            model: row.model,
            purchase_price: row.purchase_price,
            total_cost: row.total_cost,
            sales_price: row.sales_price,
            fund_id: assignment.as_ref().map(|a| a.fund_id),
            disposition_price: assignment.and_then(|a| a.disposition_price),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JoinedAsset {
    #[serde(default)]
    sales_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FundAssetRow {
    asset_id: String,
    fund_id: FundId,
    #[serde(default)]
    disposition_price: Option<f64>,
    #[serde(default)]
    assets: Option<JoinedAsset>,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent("fundlot/1.0")
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", &self.api_key))
    }

    /// Non-2xx responses become `Database error:` messages with whatever the
    /// backend said.
    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            format!("{status}: {}", body.trim())
        };
        Err(StoreError::Backend(message))
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table);
        debug!("Querying {} with {:?}", url, query);
        let response = with_retry(
            || async {
                self.authed(self.client.get(&url).query(query))
                    .send()
                    .await
            },
            3,
            500,
        )
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let response = Self::checked(response).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Backend(format!("unexpected response shape: {e}")))
    }
}

#[async_trait]
impl AssetStore for RestStore {
    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        let rows: Vec<AssetRow> = self.get_rows("assets", &[("select", ASSET_SELECT)]).await?;
        Ok(rows.into_iter().map(Asset::from).collect())
    }

    async fn find_asset(&self, id: &str) -> Result<Option<Asset>, StoreError> {
        let filter = format!("eq.{id}");
        let rows: Vec<AssetRow> = self
            .get_rows(
                "assets",
                &[("select", ASSET_SELECT), ("id", filter.as_str())],
            )
            .await?;
        Ok(rows.into_iter().next().map(Asset::from))
    }

    async fn find_asset_by_vin(&self, vin: &str) -> Result<Option<Asset>, StoreError> {
        let filter = format!("eq.{vin}");
        let rows: Vec<AssetRow> = self
            .get_rows(
                "assets",
                &[("select", ASSET_SELECT), ("vin", filter.as_str())],
            )
            .await?;
        Ok(rows.into_iter().next().map(Asset::from))
    }

    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, StoreError> {
        let response = self
            .authed(self.client.post(self.table_url("assets")))
            .header("Prefer", "return=representation")
            .json(&asset)
            .send()
            .await?;
        let response = Self::checked(response).await?;
        let rows: Vec<AssetRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("unexpected response shape: {e}")))?;
        rows.into_iter()
            .next()
            .map(Asset::from)
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))
    }

    async fn update_asset_by_vin(&self, vin: &str, patch: AssetPatch) -> Result<(), StoreError> {
        let filter = format!("eq.{vin}");
        let response = self
            .authed(
                self.client
                    .patch(self.table_url("assets"))
                    .query(&[("vin", filter.as_str())]),
            )
            .json(&patch)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn delete_asset(&self, id: &str) -> Result<(), StoreError> {
        let filter = format!("eq.{id}");
        let response = self
            .authed(
                self.client
                    .delete(self.table_url("assets"))
                    .query(&[("id", filter.as_str())]),
            )
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn upsert_assignment(&self, change: AssignmentUpsert) -> Result<(), StoreError> {
        debug!(asset_id = %change.asset_id, fund_id = %change.fund_id, "Upserting assignment");
        let response = self
            .authed(
                self.client
                    .post(self.table_url("fund_assets"))
                    .query(&[("on_conflict", "asset_id")]),
            )
            .header("Prefer", "resolution=merge-duplicates")
            .json(&change)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, StoreError> {
        let rows: Vec<FundAssetRow> = self
            .get_rows("fund_assets", &[("select", ASSIGNMENT_SELECT)])
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| AssignmentRow {
                asset_id: row.asset_id,
                fund_id: row.fund_id,
                disposition_price: row.disposition_price,
                sales_price: row.assets.and_then(|a| a.sales_price),
            })
            .collect())
    }

    async fn upsert_disposition_prices(
        &self,
        changes: Vec<PriceUpdate>,
    ) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }
        let response = self
            .authed(
                self.client
                    .post(self.table_url("fund_assets"))
                    .query(&[("on_conflict", "asset_id")]),
            )
            .header("Prefer", "resolution=merge-duplicates")
            .json(&changes)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> RestStore {
        RestStore::new(&StoreConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_assets_with_fund_join() {
        let mock_server = MockServer::start().await;
        let body = serde_json::json!([
            {
                "id": "a1",
                "vin": "1GKFK13038J127695",
                "year": 2008,
                "make": "GMC",
                "model": "Yukon",
                "total_cost": 3215.0,
                "sales_price": null,
                "fund_assets": [{"fund_id": "cha10", "disposition_price": 3000.0}]
            },
            {
                "id": "a2",
                "vin": "3VWPW31C98M518041",
                "year": 2008,
                "make": "Volkswagen",
                "model": "New Beetle Coupe",
                "fund_assets": []
            }
        ]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/assets"))
            .and(query_param("select", ASSET_SELECT))
            .and(header("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let assets = store_for(&mock_server).list_assets().await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].fund_id, Some(FundId::Cha10));
        assert_eq!(assets[0].disposition_price, Some(3000.0));
        assert!(assets[1].is_unassigned());
    }

    #[tokio::test]
    async fn test_find_asset_by_vin() {
        let mock_server = MockServer::start().await;
        let body = serde_json::json!([{
            "id": "a1",
            "vin": "1GKFK13038J127695",
            "year": 2008,
            "make": "GMC",
            "model": "Yukon",
            "fund_assets": []
        }]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/assets"))
            .and(query_param("vin", "eq.1GKFK13038J127695"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let asset = store_for(&mock_server)
            .find_asset_by_vin("1GKFK13038J127695")
            .await
            .unwrap();
        assert_eq!(asset.unwrap().id, "a1");
    }

    #[tokio::test]
    async fn test_insert_asset_returns_representation() {
        let mock_server = MockServer::start().await;
        let body = serde_json::json!([{
            "id": "minted-id",
            "vin": "1GKFK13038J127695",
            "year": 2008,
            "make": "GMC",
            "model": "Yukon",
            "purchase_price": 2600.0
        }]);

        Mock::given(method("POST"))
            .and(path("/rest/v1/assets"))
            .and(header("Prefer", "return=representation"))
            .and(body_partial_json(
                serde_json::json!({"vin": "1GKFK13038J127695"}),
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(body))
            .mount(&mock_server)
            .await;

        let asset = store_for(&mock_server)
            .insert_asset(NewAsset {
                vin: "1GKFK13038J127695".to_string(),
                year: 2008,
                make: "GMC".to_string(),
                model: "Yukon".to_string(),
                purchase_price: Some(2600.0),
            })
            .await
            .unwrap();
        assert_eq!(asset.id, "minted-id");
    }

    #[tokio::test]
    async fn test_upsert_assignment_uses_conflict_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/fund_assets"))
            .and(query_param("on_conflict", "asset_id"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .and(body_partial_json(
                serde_json::json!({"asset_id": "a1", "fund_id": "bhph"}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        store_for(&mock_server)
            .upsert_assignment(AssignmentUpsert {
                asset_id: "a1".to_string(),
                fund_id: FundId::Bhph,
                display_order: 0,
                disposition_price: Some(1375.0),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_assignments_flattens_join() {
        let mock_server = MockServer::start().await;
        let body = serde_json::json!([
            {"asset_id": "a1", "fund_id": "caps", "disposition_price": null, "assets": {"sales_price": 4500.0}},
            {"asset_id": "a2", "fund_id": "cos10", "disposition_price": 900.0, "assets": null}
        ]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/fund_assets"))
            .and(query_param("select", ASSIGNMENT_SELECT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let rows = store_for(&mock_server).list_assignments().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sales_price, Some(4500.0));
        assert_eq!(rows[1].disposition_price, Some(900.0));
        assert!(rows[1].sales_price.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_is_wrapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/assets"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message":"permission denied for table assets"}"#),
            )
            .mount(&mock_server)
            .await;

        let err = store_for(&mock_server).list_assets().await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Database error:"), "{message}");
        assert!(message.contains("permission denied"), "{message}");
    }
}
