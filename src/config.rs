use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub cors_origins: Vec<String>,
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub outbound_timeout: Duration,
    pub recipients: Vec<String>,
    pub smtp: Option<SmtpConfig>,
    pub sheet: Option<SheetConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub tls: TlsMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TlsMode {
    Tls,
    StartTls,
    None,
}

#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Bearer token for the Sheets API. `None` leaves the sheet configured but unusable.
    pub token: Option<String>,
    /// Literal written into the Status column; must match the sheet's dropdown.
    pub status: String,
}

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_ROW_STATUS: &str = "Pending";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env = Env(lookup);

        let host: IpAddr = env
            .or("CONTACT_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_HOST: {e}"))?;

        let port: u16 = env
            .or("CONTACT_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_PORT: {e}"))?;

        let log_level = env.or("CONTACT_LOG_LEVEL", "info");

        let max_body_size: usize = env
            .or("CONTACT_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = split_list(&env.or("CONTACT_TRUSTED_PROXIES", ""))
            .map(|s| {
                s.parse()
                    .map_err(|e| format!("Invalid CONTACT_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cors_origins = split_list(&env.or("CONTACT_CORS_ORIGINS", ""))
            .map(str::to_string)
            .collect();

        let rate_limit: u32 = env
            .or("CONTACT_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_RATE_LIMIT: {e}"))?;

        let rate_limit_window = env
            .or("CONTACT_RATE_LIMIT_WINDOW_SECS", "3600")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid CONTACT_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let outbound_timeout = env
            .or("CONTACT_OUTBOUND_TIMEOUT_SECS", "10")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid CONTACT_OUTBOUND_TIMEOUT_SECS: {e}"))?;

        let recipients = split_list(&env.or("RECIPIENT_EMAILS", ""))
            .map(str::to_string)
            .collect();

        // Credentials are optional here: a missing pair is reported per request
        // as a configuration error instead of refusing to start.
        let smtp = match (env.opt("EMAIL_USER"), env.opt("EMAIL_PASS")) {
            (Some(user), Some(pass)) => {
                let tls = match env.or("CONTACT_SMTP_TLS", "tls").as_str() {
                    "tls" => TlsMode::Tls,
                    "starttls" => TlsMode::StartTls,
                    "none" => TlsMode::None,
                    other => return Err(format!("Invalid CONTACT_SMTP_TLS: {other}")),
                };
                Some(SmtpConfig {
                    host: env.or("CONTACT_SMTP_HOST", "smtp.gmail.com"),
                    port: env
                        .or("CONTACT_SMTP_PORT", "465")
                        .parse()
                        .map_err(|e| format!("Invalid CONTACT_SMTP_PORT: {e}"))?,
                    from: env.opt("CONTACT_SMTP_FROM").unwrap_or_else(|| user.clone()),
                    user,
                    pass,
                    tls,
                })
            }
            _ => None,
        };

        let sheet = env.opt("CONTACT_SHEETS_SPREADSHEET_ID").map(|spreadsheet_id| SheetConfig {
            api_base: env.or("CONTACT_SHEETS_API_BASE", DEFAULT_SHEETS_API_BASE),
            spreadsheet_id,
            sheet_name: env.or("CONTACT_SHEETS_NAME", "Sheet1"),
            token: env.opt("CONTACT_SHEETS_TOKEN"),
            status: env.or("CONTACT_SHEETS_STATUS", DEFAULT_ROW_STATUS),
        });

        Ok(Config {
            host,
            port,
            log_level,
            max_body_size,
            trusted_proxies,
            cors_origins,
            rate_limit,
            rate_limit_window,
            outbound_timeout,
            recipients,
            smtp,
            sheet,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Unset and blank values are treated the same.
    fn opt(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
