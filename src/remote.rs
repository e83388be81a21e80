use std::io::Read;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::RemoteConfig;
use crate::data::decode::json_record;
use crate::data::model::Record;
use crate::error::FetchError;

// ---------------------------------------------------------------------------
// Remote page supplier
// ---------------------------------------------------------------------------

/// `limit = 0` asks the server for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

/// One page of server-side rows plus the server's page count.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePage {
    pub rows: Vec<Record>,
    pub total_pages: usize,
}

pub trait PageSupplier {
    fn fetch_page(&self, request: PageRequest) -> Result<RemotePage, FetchError>;
}

/// Blocking HTTP supplier: `GET {base_url}{endpoint}?page=..&limit=..`.
#[derive(Debug, Clone)]
pub struct HttpPageSupplier {
    url: String,
    timeout: Duration,
}

impl HttpPageSupplier {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.endpoint
            ),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PageSupplier for HttpPageSupplier {
    fn fetch_page(&self, request: PageRequest) -> Result<RemotePage, FetchError> {
        log::info!(
            "fetching page {} (limit {}) from {}",
            request.page,
            request.limit,
            self.url
        );
        let response = ureq::get(&self.url)
            .query("page", &request.page.to_string())
            .query("limit", &request.limit.to_string())
            .timeout(self.timeout)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => FetchError::Status {
                    url: self.url.clone(),
                    code,
                },
                other => FetchError::Transport {
                    url: self.url.clone(),
                    reason: other.to_string(),
                },
            })?;

        parse_page_response(response.into_reader())
    }
}

// ---------------------------------------------------------------------------
// Response body
// ---------------------------------------------------------------------------

/// Expected response:
///
/// ```json
/// { "data": [ { "_id": "..", "data": { "name": "Bob", ... } }, ... ], "totalPages": 4 }
/// ```
///
/// Items may also be bare row objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope {
    #[serde(default)]
    data: Vec<JsonValue>,
    #[serde(default)]
    total_pages: Option<usize>,
}

impl PageEnvelope {
    fn into_page(self) -> Result<RemotePage, FetchError> {
        let rows = self
            .data
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let row = match item.get("data") {
                    Some(inner) if inner.is_object() => inner,
                    _ => item,
                };
                json_record(row, i).map_err(|e| FetchError::Decode(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RemotePage {
            rows,
            total_pages: self.total_pages.unwrap_or(1).max(1),
        })
    }
}

/// Parse a page response body.
pub fn parse_page_response(body: impl Read) -> Result<RemotePage, FetchError> {
    let envelope: PageEnvelope =
        serde_json::from_reader(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    envelope.into_page()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn parse(body: &str) -> Result<RemotePage, FetchError> {
        parse_page_response(body.as_bytes())
    }

    #[test]
    fn stored_documents_unwrap_their_data_field() {
        let body = r#"{
            "data": [{"_id": "a1", "data": {"name": "Bob", "age": 30}, "createdAt": "x"}],
            "totalPages": 4
        }"#;
        let page = parse(body).unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(
            page.rows,
            vec![vec![
                ("name".to_string(), CellValue::from("Bob")),
                ("age".to_string(), CellValue::Integer(30)),
            ]]
        );
    }

    #[test]
    fn bare_rows_and_missing_total() {
        let page = parse(r#"{"data":[{"a":1},{"b":null}]}"#).unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1], vec![("b".to_string(), CellValue::Null)]);
    }

    #[test]
    fn zero_total_means_one_page() {
        let page = parse(r#"{"data":[],"totalPages":0}"#).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn non_object_rows_are_decode_errors() {
        assert!(matches!(parse(r#"{"data":[1,2]}"#), Err(FetchError::Decode(_))));
        assert!(matches!(parse("<html>"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn reads_from_a_stream() {
        let body = std::io::Cursor::new(br#"{"data":[{"a":"x"}],"totalPages":2}"#.to_vec());
        let page = parse_page_response(body).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows, vec![vec![("a".to_string(), CellValue::from("x"))]]);
    }

    #[test]
    fn url_joins_base_and_endpoint() {
        let config = RemoteConfig {
            base_url: "http://example.test:5000/".into(),
            ..RemoteConfig::default()
        };
        assert_eq!(
            HttpPageSupplier::new(&config).url(),
            "http://example.test:5000/api/csv-data"
        );
    }
}
