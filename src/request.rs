//! Transport-level request and response shapes

use crate::types::HttpMethod;
use reqwest::Url;

/// Fully built request, ready for signing and sending
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Encoded query string without the leading `?`
    pub fn query(&self) -> &str {
        self.url.query().unwrap_or("")
    }

    /// Path plus `?query` when a query is present, as signed by most providers
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", self.url.path(), query),
            _ => self.url.path().to_string(),
        }
    }

    pub fn append_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.url.query_pairs().any(|(key, _)| key == name)
    }

    /// Sets a header, replacing any existing one with the same name
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request body, or the empty string
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// URL safe for logs: the `signature` query parameter is masked
    pub fn redacted_url(&self) -> String {
        if !self.has_query_param("signature") {
            return self.url.to_string();
        }
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "signature" { "***".into() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

/// Response as observed by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Header names are lower-case
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(url: &str) -> RequestSpec {
        RequestSpec::new(HttpMethod::GET, Url::parse(url).unwrap())
    }

    #[test]
    fn test_path_and_query() {
        assert_eq!(spec("https://x.io/api/v1/ping").path_and_query(), "/api/v1/ping");
        let mut req = spec("https://x.io/api/v3/order");
        req.append_query("symbol", "BTCUSDT");
        req.append_query("side", "BUY");
        assert_eq!(req.path_and_query(), "/api/v3/order?symbol=BTCUSDT&side=BUY");
        assert!(req.has_query_param("side"));
    }

    #[test]
    fn test_set_header_replaces() {
        let mut req = spec("https://x.io/");
        req.set_header("Accept", "text/plain");
        req.set_header("accept", "application/json");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("ACCEPT"), Some("application/json"));
    }

    #[test]
    fn test_redacted_url_masks_signature() {
        let mut req = spec("https://x.io/api/v3/account");
        req.append_query("timestamp", "1");
        req.append_query("signature", "deadbeef");
        let redacted = req.redacted_url();
        assert!(!redacted.contains("deadbeef"));
        assert!(redacted.contains("timestamp=1"));
    }

    #[test]
    fn test_response_header_lookup() {
        let resp = TransportResponse::new(200, "{}").with_header("X-RateLimit-Limit", "60");
        assert_eq!(resp.header("x-ratelimit-limit"), Some("60"));
        assert!(resp.is_success());
        assert!(!TransportResponse::new(502, "").is_success());
    }
}
