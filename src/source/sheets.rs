use crate::model::RawTable;
use crate::source::SourceError;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Read-only client for the `spreadsheets.values.get` endpoint.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    api_key: Option<String>,
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsClient {
    pub fn new(token: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: SHEETS_API.to_string(),
            token,
            api_key,
        }
    }

    /// Rows of `range`; `None` when the range holds no values.
    pub async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Option<RawTable>, SourceError> {
        let url = self.range_url(spreadsheet_id, range)?;
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(api_key) = &self.api_key {
            request = request.query(&[("key", api_key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized {
                status: status.as_u16(),
            });
        }
        let body = response.error_for_status()?.json::<ValueRange>().await?;
        Ok(values_to_table(body.values))
    }

    fn range_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SourceError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SourceError::Address(e.to_string()))?;
        let Ok(mut segments) = url.path_segments_mut() else {
            return Err(SourceError::Address(self.base_url.clone()));
        };
        segments.pop_if_empty().extend([spreadsheet_id, "values", range]);
        drop(segments);
        Ok(url)
    }
}

/// Row 0 is the header; shorter data rows are padded with empty cells.
fn values_to_table(values: Vec<Vec<Value>>) -> Option<RawTable> {
    let mut rows = values.into_iter().map(|row| {
        row.into_iter()
            .map(|cell| match cell {
                Value::String(text) => text,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
    });
    let headers = rows.next()?;
    let rows = rows
        .map(|mut row| {
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            row
        })
        .collect::<Vec<_>>();
    Some(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn header_row_and_padding() {
        let body: ValueRange = serde_json::from_value(json!({
            "range": "QA!A1:C3",
            "majorDimension": "ROWS",
            "values": [
                ["Module", "P0 issues Open", "Bug Titles"],
                ["Inbox", "2", "A,B"],
                ["Voice", 3]
            ]
        }))
        .unwrap();
        let table = values_to_table(body.values).unwrap();
        assert_eq!(table.headers, vec!["Module", "P0 issues Open", "Bug Titles"]);
        assert_eq!(table.rows[0], vec!["Inbox", "2", "A,B"]);
        assert_eq!(table.rows[1], vec!["Voice", "3", ""]);
    }

    #[test]
    fn empty_range_is_no_data() {
        let body: ValueRange = serde_json::from_value(json!({ "range": "QA!A1:C3" })).unwrap();
        assert_eq!(values_to_table(body.values), None);
    }

    #[test]
    fn range_is_percent_encoded_into_the_path() {
        let client = SheetsClient::default();
        let url = client.range_url("abc123", "QA Data!A1:J20").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/QA%20Data!A1:J20"
        );
    }
}
