//! Types shared across the wrapper

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Rate-limit fields as reported by the provider, names left untouched
pub type RateLimit = Map<String, Value>;

/// HTTP verbs used by the provider APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    /// Get the verb as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        }
    }
}

/// API key and optional secret, shared read-only by every call of a client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: Option<String>,
}

impl Credentials {
    /// Key-only credentials (CoinMarketCap, CryptoCompare)
    pub fn key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: None,
        }
    }

    /// Key and secret pair for HMAC-signing providers
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Some(api_secret.into()),
        }
    }

    pub fn secret(&self) -> Option<&str> {
        self.api_secret.as_deref()
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Call-time arguments, keyed by parameter name
///
/// Keys are kept sorted so iteration order never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion
    ///
    /// ```
    /// use cryptowrapper::Arguments;
    ///
    /// let args = Arguments::new().with("symbol", "BTCUSDT").with("limit", 5);
    /// assert_eq!(args.len(), 2);
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl TryFrom<Value> for Arguments {
    type Error = Value;

    /// Accepts a JSON object; any other value is handed back
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(other),
        }
    }
}

/// Successful call result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Raw provider payload
    pub body: Value,

    /// True when served from the response cache
    pub cached: bool,

    /// Rate-limit fields found in the upstream response, if any
    pub rate_limit: Option<RateLimit>,
}

impl ApiResponse {
    pub fn new(body: Value, cached: bool, rate_limit: Option<RateLimit>) -> Self {
        Self {
            body,
            cached,
            rate_limit,
        }
    }

    /// Merges the metadata into the payload
    ///
    /// Objects gain `cached` and `ratelimit` keys. Arrays get `cached` on each
    /// object element and a trailing `{"ratelimit": ...}` element. Scalars are
    /// returned as they are.
    pub fn annotated(&self) -> Value {
        let cached = Value::Bool(self.cached);
        match &self.body {
            Value::Object(map) => {
                let mut map = map.clone();
                map.insert("cached".to_string(), cached);
                if let Some(rate_limit) = &self.rate_limit {
                    map.insert("ratelimit".to_string(), Value::Object(rate_limit.clone()));
                }
                Value::Object(map)
            }
            Value::Array(items) => {
                let mut items: Vec<Value> = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => {
                            let mut map = map.clone();
                            map.insert("cached".to_string(), cached.clone());
                            Value::Object(map)
                        }
                        other => other.clone(),
                    })
                    .collect();
                if let Some(rate_limit) = &self.rate_limit {
                    let mut entry = Map::new();
                    entry.insert("ratelimit".to_string(), Value::Object(rate_limit.clone()));
                    items.push(Value::Object(entry));
                }
                Value::Array(items)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arguments_ignore_insertion_order() {
        let a = Arguments::new().with("a", 1).with("b", 2);
        let b = Arguments::new().with("b", 2).with("a", 1);
        assert_eq!(a, b);
        assert_eq!(a.iter().next().map(|(k, _)| k.as_str()), Some("a"));
    }

    #[test]
    fn test_arguments_from_json_object() {
        let args = Arguments::try_from(json!({"symbol": "BTC", "limit": 1})).unwrap();
        assert_eq!(args.get("symbol"), Some(&json!("BTC")));
        assert!(Arguments::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_annotated_object() {
        let mut rate_limit = RateLimit::new();
        rate_limit.insert("remaining".into(), json!("59"));
        let response = ApiResponse::new(json!({"price": 1.0}), true, Some(rate_limit));

        assert_eq!(
            response.annotated(),
            json!({"price": 1.0, "cached": true, "ratelimit": {"remaining": "59"}})
        );
    }

    #[test]
    fn test_annotated_array() {
        let response = ApiResponse::new(json!([{"id": 1}, 7]), false, None);
        assert_eq!(response.annotated(), json!([{"id": 1, "cached": false}, 7]));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = Credentials::new("key", "very-secret");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("key"));
        assert!(!rendered.contains("very-secret"));
    }
}
