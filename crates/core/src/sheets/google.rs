use crate::config::Settings;
use crate::sheets::auth::{ServiceAccountKey, SHEETS_SCOPES};
use crate::sheets::error::SheetsApiError;
use crate::sheets::range::A1Range;
use crate::sheets::{CellValue, SheetsApi, WorksheetRef};
use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Google Sheets v4 REST client bound to one spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchUpdateReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateReply {
    add_sheet: Option<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: String,
    major_dimension: &'static str,
    values: &'a [Vec<CellValue>],
}

impl GoogleSheetsClient {
    /// Exchange the configured service-account key for a token and bind to the sheet.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build Google http client")?;

        let key = ServiceAccountKey::from_file(&settings.google_service_account)?;
        let token = key
            .fetch_access_token(&http, SHEETS_SCOPES)
            .await
            .context("failed to authorize service account")?;
        tracing::debug!(
            client_email = %key.client_email,
            expires_in = token.expires_in,
            "obtained Google access token"
        );

        Ok(Self::new(
            http,
            DEFAULT_BASE_URL,
            &settings.google_sheet_id,
            token.access_token,
        ))
    }

    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        spreadsheet_id: &str,
        access_token: String,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token,
        }
    }

    /// `{base}/{spreadsheet_id}{suffix}` followed by percent-encoded `segments`.
    fn url(&self, suffix: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid Sheets base url: {}", self.base_url))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("Sheets base url cannot be a base"))?;
            path.push(&format!("{}{suffix}", self.spreadsheet_id));
            path.extend(segments);
        }
        Ok(url)
    }

    fn values_url(&self, range: &A1Range, suffix: &str) -> Result<Url> {
        self.url("", &["values", &format!("{range}{suffix}")])
    }

    async fn send<T: DeserializeOwned>(&self, stage: &'static str, req: RequestBuilder) -> Result<T> {
        let res = req
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Google Sheets {stage} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read Google Sheets {stage} response"))?;
        if !status.is_success() {
            return Err(SheetsApiError {
                stage,
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("unexpected Google Sheets {stage} response: {text}"))
    }
}

#[async_trait::async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn find_worksheet(&self, title: &str) -> Result<Option<WorksheetRef>> {
        let url = self.url("", &[])?;
        let meta: SpreadsheetMeta = self
            .send(
                "get_spreadsheet",
                self.http
                    .get(url)
                    .query(&[("fields", "sheets.properties.title")]),
            )
            .await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .map(|p| WorksheetRef { title: p.title }))
    }

    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<WorksheetRef> {
        let url = self.url(":batchUpdate", &[])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {"rowCount": rows, "columnCount": cols},
                    }
                }
            }]
        });
        let resp: BatchUpdateResponse = self
            .send("add_sheet", self.http.post(url).json(&body))
            .await?;

        let props = resp
            .replies
            .into_iter()
            .find_map(|r| r.add_sheet)
            .map(|s| s.properties)
            .context("addSheet reply missing from batchUpdate response")?;
        Ok(WorksheetRef { title: props.title })
    }

    async fn column_values(&self, range: &A1Range) -> Result<Vec<String>> {
        let url = self.values_url(range, "")?;
        let vr: ValueRange = self
            .send(
                "read_values",
                self.http.get(url).query(&[("majorDimension", "COLUMNS")]),
            )
            .await?;

        let column = vr.values.into_iter().next().unwrap_or_default();
        Ok(column.iter().map(display_value).collect())
    }

    async fn update(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()> {
        let url = self.values_url(range, "")?;
        let body = ValueRangeBody {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: rows,
        };
        let _: Value = self
            .send(
                "update_values",
                self.http
                    .put(url)
                    .query(&[("valueInputOption", "RAW")])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn clear(&self, range: &A1Range) -> Result<()> {
        let url = self.url("", &["values:batchClear"])?;
        let body = json!({ "ranges": [range.to_string()] });
        let _: Value = self
            .send("clear_values", self.http.post(url).json(&body))
            .await?;
        Ok(())
    }

    async fn append(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()> {
        let url = self.values_url(range, ":append")?;
        let body = ValueRangeBody {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: rows,
        };
        let _: Value = self
            .send(
                "append_values",
                self.http
                    .post(url)
                    .query(&[("valueInputOption", "RAW"), ("insertDataOption", "OVERWRITE")])
                    .json(&body),
            )
            .await?;
        Ok(())
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
