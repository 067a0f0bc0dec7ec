pub mod sheets;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::models::Submission;

/// One cell of the serial column as the store reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Numeric value of the cell, if it holds one. Numeric text counts.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse().ok()?,
            CellValue::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

/// Tabular store holding one lead per row.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every cell of the serial column, header included, top to bottom.
    async fn read_serial_column(&self) -> Result<Vec<CellValue>, String>;

    /// Overwrite the 1-based `row` with `values`, starting at the first column.
    async fn write_row(&self, row: u64, values: Vec<Value>) -> Result<(), String>;
}

/// `[Serial, Name, Phone, Email, StoreName, Status, Reason, Revenue]`
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRow {
    pub serial: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub reason: String,
}

impl TabularRow {
    pub const WIDTH: usize = 8;

    pub fn new(serial: u64, submission: &Submission, status: &str) -> Self {
        Self {
            serial,
            name: submission.name.clone(),
            phone: submission.phone.clone().unwrap_or_default(),
            email: submission.email.clone(),
            status: status.to_string(),
            reason: submission.message.clone(),
        }
    }

    /// Cell values in column order. Store name and revenue are filled in by
    /// hand later and always go out empty.
    pub fn values(&self) -> Vec<Value> {
        vec![
            json!(self.serial),
            json!(self.name),
            json!(self.phone),
            json!(self.email),
            json!(""),
            json!(self.status),
            json!(self.reason),
            json!(""),
        ]
    }
}

/// Where a submission landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appended {
    pub serial: u64,
    pub row: u64,
}

/// Highest numeric serial plus one; non-numeric cells (the header included)
/// are skipped. Values beyond `u64` pin the result at `u64::MAX`.
pub fn next_serial(column: &[CellValue]) -> u64 {
    let max = column
        .iter()
        .filter_map(CellValue::as_number)
        .filter(|n| *n >= 0.0)
        .fold(0.0_f64, f64::max);
    (max.floor() as u64).saturating_add(1)
}

/// Row directly below the last populated one. Row 1 is kept for the header
/// even when the column is completely empty.
pub fn next_row(column: &[CellValue]) -> u64 {
    column.len().max(1) as u64 + 1
}

/// Append `submission` as the next lead row.
///
/// Reading the column and writing the row are two separate calls with nothing
/// held in between: concurrent submissions can compute the same serial and
/// overwrite each other's row. That race is accepted.
pub async fn append(
    store: &dyn RecordStore,
    submission: &Submission,
    status: &str,
) -> Result<Appended, String> {
    let column = store.read_serial_column().await?;
    let serial = next_serial(&column);
    let row = next_row(&column);

    let values = TabularRow::new(serial, submission, status).values();
    store.write_row(row, values).await?;

    Ok(Appended { serial, row })
}
