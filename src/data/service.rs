//! HTTP client for the displacement-characteristics backend.
//!
//! Three endpoints: snapshot fetch, recalculate (compute service) and save
//! (persistence service). The client is transport only — it never interprets
//! the structured `error` object inside a payload; the session does that, so
//! a failed call can leave the table untouched.

use reqwest::blocking::Client;

use crate::error::AppError;
use crate::io::snapshot::{GroupKeys, RecalculateResponse, ServiceError, Snapshot};
use crate::io::submit::{RecalculateRequest, SaveRequest};

const SNAPSHOT_PATH: &str = "/displacement/setting-interval";
const RECALCULATE_PATH: &str = "/displacement/setting-interval/recalculate";
const SAVE_PATH: &str = "/displacement/setting-interval/save";

pub struct IntervalClient {
    client: Client,
    base_url: String,
}

impl IntervalClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("DC_API_URL")
            .map_err(|_| AppError::new(2, "Missing DC_API_URL in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn fetch_snapshot(&self, keys: &GroupKeys) -> Result<Snapshot, AppError> {
        let resp = self
            .client
            .get(format!("{}{SNAPSHOT_PATH}", self.base_url))
            .query(&[
                ("ventures", keys.ventures.as_str()),
                ("workshop", keys.workshop.as_str()),
                ("field", keys.field.as_str()),
                ("group_well", keys.group_well.as_str()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("Snapshot request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Snapshot request failed with status {}.", resp.status()),
            ));
        }

        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse snapshot response: {e}")))
    }

    pub fn recalculate(&self, request: &RecalculateRequest) -> Result<RecalculateResponse, AppError> {
        let resp = self
            .client
            .post(format!("{}{RECALCULATE_PATH}", self.base_url))
            .json(request)
            .send()
            .map_err(|e| AppError::new(4, format!("Recalculate request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Recalculate request failed with status {}.", resp.status()),
            ));
        }

        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse recalculate response: {e}")))
    }

    pub fn save(&self, request: &SaveRequest) -> Result<(), AppError> {
        let resp = self
            .client
            .post(format!("{}{SAVE_PATH}", self.base_url))
            .json(request)
            .send()
            .map_err(|e| AppError::new(4, format!("Save request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Save request failed with status {}.", resp.status()),
            ));
        }

        let receipt: SaveReceipt = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse save response: {e}")))?;
        if !receipt.error.is_ok() {
            return Err(AppError::new(3, receipt.error.description));
        }
        Ok(())
    }
}

#[derive(Debug, serde::Deserialize)]
struct SaveReceipt {
    #[serde(default)]
    error: ServiceError,
}
