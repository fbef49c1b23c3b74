//! Endpoint descriptors: the static shape of one remote operation

use crate::{
    error::ClientError,
    types::{Arguments, HttpMethod},
};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into the path template
    Path,
    /// Appended to the query string
    Query,
    /// Field of the JSON request body
    Body,
    /// Sent verbatim as a `text/plain` body
    RawBody,
}

/// One declared parameter of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub location: ParamLocation,
    pub required: bool,
    /// Value the provider assumes when the parameter is omitted, in query encoding
    pub default: Option<&'static str>,
}

impl Parameter {
    const fn new(name: &'static str, location: ParamLocation, required: bool) -> Self {
        Self {
            name,
            location,
            required,
            default: None,
        }
    }

    /// Required `{name}` path placeholder
    pub const fn path(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Path, true)
    }

    /// Optional `{/name}` path segment
    pub const fn optional_path(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Path, false)
    }

    pub const fn query(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Query, true)
    }

    pub const fn optional_query(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Query, false)
    }

    pub const fn body(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Body, true)
    }

    pub const fn optional_body(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Body, false)
    }

    pub const fn raw_body(name: &'static str) -> Self {
        Self::new(name, ParamLocation::RawBody, true)
    }

    pub const fn default_value(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

/// Immutable description of one API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Operation identifier, unique within a provider (e.g. `ticker_24h_GET`)
    pub name: &'static str,
    pub method: HttpMethod,
    /// Path with `{name}` placeholders and optional `{/name}` segments
    pub path: &'static str,
    pub parameters: &'static [Parameter],
    pub auth_required: bool,
    /// False for state-mutating endpoints, which are never cached
    pub cacheable: bool,
    /// Destination of arguments that match no declared parameter
    pub extra_location: ParamLocation,
}

impl EndpointDescriptor {
    /// Public endpoint; only GETs are cacheable by default
    pub const fn new(name: &'static str, method: HttpMethod, path: &'static str) -> Self {
        Self {
            name,
            method,
            path,
            parameters: &[],
            auth_required: false,
            cacheable: matches!(method, HttpMethod::GET),
            extra_location: ParamLocation::Query,
        }
    }

    pub const fn get(name: &'static str, path: &'static str) -> Self {
        Self::new(name, HttpMethod::GET, path)
    }

    pub const fn post(name: &'static str, path: &'static str) -> Self {
        Self::new(name, HttpMethod::POST, path)
    }

    pub const fn put(name: &'static str, path: &'static str) -> Self {
        Self::new(name, HttpMethod::PUT, path)
    }

    pub const fn delete(name: &'static str, path: &'static str) -> Self {
        Self::new(name, HttpMethod::DELETE, path)
    }

    /// Marks the endpoint as requiring credentials
    pub const fn private(self) -> Self {
        Self {
            auth_required: true,
            ..self
        }
    }

    /// Never cached: state-mutating or too volatile to serve stale
    pub const fn uncached(self) -> Self {
        Self {
            cacheable: false,
            ..self
        }
    }

    /// Read-only endpoint served over a non-GET verb
    pub const fn read_only(self) -> Self {
        Self {
            cacheable: true,
            ..self
        }
    }

    pub const fn params(self, parameters: &'static [Parameter]) -> Self {
        Self { parameters, ..self }
    }

    pub const fn extra_in(self, extra_location: ParamLocation) -> Self {
        Self {
            extra_location,
            ..self
        }
    }

    /// Looks up a declared parameter
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Location an argument is sent to
    pub fn location_of(&self, name: &str) -> ParamLocation {
        self.parameter(name)
            .map(|p| p.location)
            .unwrap_or(self.extra_location)
    }

    /// Checks required parameters and argument shapes
    pub fn validate(&self, args: &Arguments) -> Result<(), ClientError> {
        for param in self.parameters {
            let value = args.get(param.name).filter(|v| !v.is_null());
            match (value, param.required) {
                (None, true) => {
                    return Err(ClientError::invalid_arguments(
                        self.name,
                        format!("missing required parameter `{}`", param.name),
                    ))
                }
                (None, false) => {}
                (Some(value), _) => self.check_shape(param, value)?,
            }
        }
        Ok(())
    }

    fn check_shape(&self, param: &Parameter, value: &Value) -> Result<(), ClientError> {
        match param.location {
            ParamLocation::Path => {
                self.path_segment(param.name, value)?;
            }
            ParamLocation::RawBody if !value.is_string() => {
                return Err(ClientError::invalid_arguments(
                    self.name,
                    format!("`{}` must be a string", param.name),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    /// Percent-encoded text of a path argument
    ///
    /// Empty values and dot segments are refused; the URL parser would fold
    /// them into a different path.
    fn path_segment(&self, name: &str, value: &Value) -> Result<String, ClientError> {
        let text = scalar_text(value).ok_or_else(|| {
            ClientError::invalid_arguments(
                self.name,
                format!("path parameter `{}` must be a scalar", name),
            )
        })?;
        if matches!(text.as_str(), "" | "." | "..") {
            return Err(ClientError::invalid_arguments(
                self.name,
                format!("path parameter `{}` is not a valid segment", name),
            ));
        }
        Ok(urlencoding::encode(&text).into_owned())
    }

    /// Substitutes percent-encoded path parameters into the template
    pub fn render_path(&self, args: &Arguments) -> Result<String, ClientError> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let close = rest[open..].find('}').map(|i| open + i).ok_or_else(|| {
                ClientError::invalid_arguments(self.name, "unterminated path placeholder")
            })?;
            let placeholder = &rest[open + 1..close];
            let (optional, name) = match placeholder.strip_prefix('/') {
                Some(name) => (true, name),
                None => (false, placeholder),
            };

            match args.get(name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let segment = self.path_segment(name, value)?;
                    if optional {
                        out.push('/');
                    }
                    out.push_str(&segment);
                }
                None if optional => {}
                None => {
                    return Err(ClientError::invalid_arguments(
                        self.name,
                        format!("missing required parameter `{}`", name),
                    ))
                }
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);

        Ok(out)
    }

    /// Cache identity of a call: order-independent and blind to arguments that
    /// are null or equal to their declared default
    pub fn fingerprint(&self, args: &Arguments) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());

        for (name, value) in args.iter() {
            if value.is_null() {
                continue;
            }
            let default = self.parameter(name).and_then(|p| p.default);
            if default.is_some() && default == query_text(value).as_deref() {
                continue;
            }
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
            hasher.update([b'=']);
            let text = match self.location_of(name) {
                // Same text that goes on the wire, so `10` and `"10"` share a key
                ParamLocation::Path | ParamLocation::Query => query_text(value),
                ParamLocation::Body | ParamLocation::RawBody => Some(value.to_string()),
            };
            hasher.update(text.unwrap_or_default().as_bytes());
        }

        Fingerprint(hex::encode(hasher.finalize()))
    }
}

/// Deterministic cache key of a call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text of a scalar value; `None` for null, arrays and objects
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Query-string encoding of an argument; containers become compact JSON
pub fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_text(scalar),
    }
}
