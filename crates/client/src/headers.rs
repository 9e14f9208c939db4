//! Request headers shared by the JSON APIs.

use std::collections::BTreeMap;

pub const ACCEPT: &str = "accept";
pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
pub const CLIENT_ID: &str = "client-id";

const APPLICATION_JSON: &str = "application/json";

/// Lower-cased header map for an API request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiHeaders(BTreeMap<String, String>);

impl ApiHeaders {
    /// JSON accept/content-type headers plus bearer auth and client id.
    ///
    /// A missing token or client id omits that header entirely.
    pub fn build(token: Option<&str>, client_id: Option<&str>) -> Self {
        let mut headers = Self::default();
        headers.insert(ACCEPT, APPLICATION_JSON);
        headers.insert(CONTENT_TYPE, APPLICATION_JSON);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.insert(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(client_id) = client_id.filter(|c| !c.is_empty()) {
            headers.insert(CLIENT_ID, client_id);
        }
        headers
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ApiHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| {
                if k == AUTHORIZATION { (k, "[REDACTED]") } else { (k, v) }
            }))
            .finish()
    }
}

/// Headers for the order API.
pub fn order_api_headers(token: Option<&str>, client_id: Option<&str>) -> ApiHeaders {
    ApiHeaders::build(token, client_id)
}

/// Headers for the user API.
pub fn user_api_headers(token: Option<&str>, client_id: Option<&str>) -> ApiHeaders {
    ApiHeaders::build(token, client_id)
}
