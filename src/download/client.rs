use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ui::Ui;

const LATEST_URL: &str = "https://developers.eveonline.com/static-data/tranquility/latest.jsonl";
const ZIP_URL: &str =
    "https://developers.eveonline.com/static-data/eve-online-static-data-latest-jsonl.zip";

#[derive(Debug, Deserialize)]
pub struct SdeInfo {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "buildNumber")]
    pub build_number: u64,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
}

/// Anything that can answer a GET with a JSON document.
///
/// The HTTP client is the production source; tests substitute fixed fixtures.
pub trait JsonSource {
    fn fetch_json(&self, url: &str, ui: &mut impl Ui) -> Result<Value>;
}

/// Fixed pacing applied to every request
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    /// Sleep after each successful call
    pub pause: Duration,
    /// Sleep before retrying after an HTTP error status
    pub backoff: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            backoff: Duration::from_secs(30),
        }
    }
}

pub struct HttpClient {
    client: Client,
    throttle: Throttle,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_throttle(Throttle::default())
    }

    pub fn with_throttle(throttle: Throttle) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("zkb-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, throttle })
    }

    /// Fetch the latest SDE build info
    pub fn fetch_latest_info(&self, ui: &mut impl Ui) -> Result<SdeInfo> {
        let value = self.fetch_json(LATEST_URL, ui)?;
        let info: SdeInfo = serde_json::from_value(value).context("Failed to parse SDE info")?;

        Ok(info)
    }

    /// Download the SDE zip file to the given path
    pub fn download_zip(&self, dest: &Path, ui: &mut impl Ui) -> Result<()> {
        ui.log(format!("Download: {}", ZIP_URL));
        let response = self
            .client
            .get(ZIP_URL)
            .send()
            .and_then(|r| r.error_for_status())
            .context("Failed to start download")?;

        let total_size = response.content_length().unwrap_or(0);

        let mut file = std::fs::File::create(dest).context("Failed to create destination file")?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];
        let mut reader = response;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .context("Failed to read from response")?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .context("Failed to write to file")?;

            downloaded += bytes_read as u64;
            ui.set_progress(downloaded, total_size, format_bytes(downloaded, total_size));
        }

        ui.clear_progress();
        ui.log("Download complete");
        Ok(())
    }
}

impl JsonSource for HttpClient {
    /// GET `url` and decode the body as JSON.
    ///
    /// HTTP error statuses are retried forever after a fixed backoff.
    /// Connection failures and undecodable bodies are returned as errors.
    fn fetch_json(&self, url: &str, ui: &mut impl Ui) -> Result<Value> {
        loop {
            ui.log(format!("Download: {}", url));

            let response = self
                .client
                .get(url)
                .send()
                .with_context(|| format!("Failed to fetch {}", url))?;

            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                warn!(%status, url, "HTTP error, retrying after backoff");
                ui.log(format!("HTTP error {}: {}", status, url));
                thread::sleep(self.throttle.backoff);
                continue;
            }

            let body = response
                .text()
                .with_context(|| format!("Failed to read response from {}", url))?;
            let value: Value = serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse JSON from {}", url))?;

            debug!(url, bytes = body.len(), "fetched");
            thread::sleep(self.throttle.pause);
            return Ok(value);
        }
    }
}

/// Format bytes as human-readable string
fn format_bytes(current: u64, total: u64) -> String {
    fn fmt(bytes: u64) -> String {
        if bytes >= 1_000_000_000 {
            format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
        } else if bytes >= 1_000_000 {
            format!("{:.1} MB", bytes as f64 / 1_000_000.0)
        } else if bytes >= 1_000 {
            format!("{:.1} KB", bytes as f64 / 1_000.0)
        } else {
            format!("{} B", bytes)
        }
    }
    format!("{} / {}", fmt(current), fmt(total))
}
