//! Route handlers. Each returns a response or a crate error rendered as a
//! problem payload by the dispatcher.

pub mod employee;
pub mod excel;
pub mod mapping;

use crate::store::Document;
use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// What a handler sees of the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RequestContext {
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Body as a JSON object; an empty body is an empty object.
    pub fn json_object(&self) -> Result<Document> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }
        self.json()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::invalid(format!("Request body must be valid JSON: {}", e)))
    }
}

/// Decode `a=1&b=two%20words` into a map; later keys win.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key), decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map(|s| s.into_owned()).unwrap_or(spaced)
}
