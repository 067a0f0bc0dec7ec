use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{CellValue, RecordStore, TabularRow};
use crate::config::SheetConfig;

/// Leads sheet behind the Google Sheets `values` REST API.
pub struct SheetsClient {
    client: reqwest::Client,
    api_base: Url,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<CellValue>>,
}

impl SheetsClient {
    pub fn new(config: &SheetConfig, token: &str, timeout: Duration) -> Result<Self, String> {
        let api_base =
            Url::parse(&config.api_base).map_err(|e| format!("Invalid sheets API base: {e}"))?;
        if api_base.cannot_be_a_base() {
            return Err(format!("Invalid sheets API base: {}", config.api_base));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_base,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            token: token.to_string(),
        })
    }

    /// A1 range on this client's sheet, quoting the sheet name when needed.
    fn range(&self, cells: &str) -> String {
        if self.sheet_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            format!("{}!{cells}", self.sheet_name)
        } else {
            format!("'{}'!{cells}", self.sheet_name.replace('\'', "''"))
        }
    }

    fn values_url(&self, range: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        }
        url.query_pairs_mut().extend_pairs(query);
        url
    }
}

#[async_trait]
impl RecordStore for SheetsClient {
    async fn read_serial_column(&self) -> Result<Vec<CellValue>, String> {
        let url = self.values_url(
            &self.range("A:A"),
            &[
                ("majorDimension", "COLUMNS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ],
        );

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| format!("Sheets read failed: {e}"))?;

        let resp = check_status(resp, "read").await?;
        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| format!("Sheets read returned unexpected body: {e}"))?;

        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn write_row(&self, row: u64, values: Vec<Value>) -> Result<(), String> {
        let range = self.range(&format!("A{row}:H{row}"));
        // RAW: form text is stored as typed, never parsed as a formula or number.
        let url = self.values_url(&range, &[("valueInputOption", "RAW")]);

        debug_assert_eq!(values.len(), TabularRow::WIDTH);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [values],
        });

        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Sheets update failed: {e}"))?;

        check_status(resp, "update").await?;
        Ok(())
    }
}

async fn check_status(resp: reqwest::Response, op: &str) -> Result<reqwest::Response, String> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(1024)
        .collect::<String>();
    Err(format!("Sheets {op} returned {}: {body}", status.as_u16()))
}
