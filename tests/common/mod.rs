#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use contact_relay::config::{Config, SheetConfig, DEFAULT_ROW_STATUS};
use contact_relay::email::{MailTransport, OutgoingMail};
use contact_relay::records::{CellValue, RecordStore};
use contact_relay::state::Channel;

/// Mail transport that keeps what it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub failure: Option<String>,
}

impl RecordingMailer {
    pub fn failing(detail: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(detail.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), String> {
        if let Some(detail) = &self.failure {
            return Err(detail.clone());
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// In-memory leads sheet: column A plus a log of row writes.
#[derive(Default)]
pub struct MemorySheet {
    pub column: Mutex<Vec<CellValue>>,
    pub writes: Mutex<Vec<(u64, Vec<Value>)>>,
    pub failure: Option<String>,
}

impl MemorySheet {
    pub fn with_column(column: Vec<CellValue>) -> Self {
        Self {
            column: Mutex::new(column),
            ..Default::default()
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            ..Default::default()
        }
    }

    pub fn writes(&self) -> Vec<(u64, Vec<Value>)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemorySheet {
    async fn read_serial_column(&self) -> Result<Vec<CellValue>, String> {
        if let Some(detail) = &self.failure {
            return Err(detail.clone());
        }
        Ok(self.column.lock().unwrap().clone())
    }

    async fn write_row(&self, row: u64, values: Vec<Value>) -> Result<(), String> {
        let mut column = self.column.lock().unwrap();
        let index = (row - 1) as usize;
        if column.len() <= index {
            column.resize(index + 1, CellValue::Text(String::new()));
        }
        column[index] = serde_json::from_value(values[0].clone()).map_err(|e| e.to_string())?;

        self.writes.lock().unwrap().push((row, values));
        Ok(())
    }
}

/// Sheet whose column read panics, standing in for a forwarder task that dies
/// after the email went out.
pub struct PanickingSheet;

#[async_trait]
impl RecordStore for PanickingSheet {
    async fn read_serial_column(&self) -> Result<Vec<CellValue>, String> {
        panic!("sheet read blew up");
    }

    async fn write_row(&self, _row: u64, _values: Vec<Value>) -> Result<(), String> {
        Ok(())
    }
}

pub fn header_cell() -> CellValue {
    CellValue::Text("S.No".to_string())
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        max_body_size: 65_536,
        trusted_proxies: vec![],
        cors_origins: vec![],
        rate_limit: 5,
        rate_limit_window: Duration::from_secs(3600),
        outbound_timeout: Duration::from_secs(10),
        recipients: vec!["sales@example.com".to_string()],
        smtp: None,
        sheet: None,
    }
}

pub fn sheet_config() -> SheetConfig {
    SheetConfig {
        api_base: "http://127.0.0.1:0".to_string(),
        spreadsheet_id: "leads".to_string(),
        sheet_name: "Sheet1".to_string(),
        token: Some("test-token".to_string()),
        status: DEFAULT_ROW_STATUS.to_string(),
    }
}

pub fn enquiry() -> Value {
    json!({
        "name": "Asha Kapoor",
        "email": "asha@example.com",
        "phone": "+91 98765 43210",
        "message": "Looking for a teak dining table.\nSeats six.",
    })
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body to the contact endpoint, return (body, status).
    pub async fn submit(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .json(data)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Same, with an `X-Forwarded-For` header.
    pub async fn submit_from(&self, forwarded_for: &str, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .header("x-forwarded-for", forwarded_for)
            .json(data)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// App with a working recording mailer and no sheet.
pub async fn spawn_app() -> (TestApp, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let app = spawn_with(
        test_config(),
        Channel::Ready(mailer.clone()),
        Channel::Disabled,
    )
    .await;
    (app, mailer)
}

/// App with a working recording mailer and the given in-memory sheet.
pub async fn spawn_with_sheet(
    sheet: MemorySheet,
) -> (TestApp, Arc<RecordingMailer>, Arc<MemorySheet>) {
    let mailer = Arc::new(RecordingMailer::default());
    let sheet = Arc::new(sheet);
    let mut config = test_config();
    config.sheet = Some(sheet_config());

    let app = spawn_with(
        config,
        Channel::Ready(mailer.clone()),
        Channel::Ready(sheet.clone()),
    )
    .await;
    (app, mailer, sheet)
}

pub async fn spawn_with(
    config: Config,
    mailer: Channel<dyn MailTransport>,
    records: Channel<dyn RecordStore>,
) -> TestApp {
    let state = contact_relay::new_state(config, mailer, records);
    serve(contact_relay::router(state)).await
}

/// Serve an already built router on a random port.
pub async fn serve(app: Router) -> TestApp {
    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
    }
}
