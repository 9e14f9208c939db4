//! Thin async HTTPS transport for the JSON APIs.
//!
//! Every call validates its input before any I/O: the URL must parse and use
//! `https` (plain `http` only when the client explicitly allows it), and the
//! body-carrying verbs refuse requests built for a different method.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ServiceError, ServiceResult};
use crate::headers::ApiHeaders;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: ApiHeaders,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: ApiHeaders::default(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_headers(mut self, headers: ApiHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ServiceResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ServiceError::decode(format!("invalid JSON body: {e}")))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Canonical reason phrase for the status code.
    pub fn status_reason(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
    }
}

/// Transport used by the API services.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> ServiceResult<ApiResponse>;

    async fn head(&self, url: &str) -> ServiceResult<ApiResponse>;

    async fn post(&self, request: ApiRequest) -> ServiceResult<ApiResponse>;

    async fn put(&self, request: ApiRequest) -> ServiceResult<ApiResponse>;

    async fn delete(&self, request: ApiRequest) -> ServiceResult<ApiResponse>;
}

/// Parse `url` and check its scheme.
pub fn validate_url(url: &str, allow_insecure: bool) -> ServiceResult<Url> {
    let parsed = Url::parse(url).map_err(|_| ServiceError::bad_request("invalid URL"))?;
    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if allow_insecure => Ok(parsed),
        _ => Err(ServiceError::bad_request("invalid URL")),
    }
}

fn expect_method(request: &ApiRequest, expected: Method) -> ServiceResult<()> {
    if request.method == expected {
        Ok(())
    } else {
        Err(ServiceError::bad_request("invalid request"))
    }
}

/// reqwest-backed [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpsClient {
    client: reqwest::Client,
    allow_insecure: bool,
}

impl HttpsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow plain `http` URLs, for talking to local test servers.
    pub fn with_allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    #[instrument(skip_all, fields(method = %method, url = %url))]
    async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: &ApiHeaders,
        body: Option<&Value>,
    ) -> ServiceResult<ApiResponse> {
        let mut builder = self.client.request(method.into(), url);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ServiceError::transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?
            .to_vec();

        debug!(status, bytes = body.len(), "response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    async fn send(&self, request: ApiRequest, expected: Method) -> ServiceResult<ApiResponse> {
        expect_method(&request, expected)?;
        let url = validate_url(&request.url, self.allow_insecure)?;
        self.execute(expected, url, &request.headers, request.body.as_ref())
            .await
    }
}

#[async_trait]
impl HttpTransport for HttpsClient {
    async fn get(&self, url: &str) -> ServiceResult<ApiResponse> {
        let url = validate_url(url, self.allow_insecure)?;
        self.execute(Method::Get, url, &ApiHeaders::default(), None).await
    }

    async fn head(&self, url: &str) -> ServiceResult<ApiResponse> {
        let url = validate_url(url, self.allow_insecure)?;
        self.execute(Method::Head, url, &ApiHeaders::default(), None).await
    }

    async fn post(&self, request: ApiRequest) -> ServiceResult<ApiResponse> {
        self.send(request, Method::Post).await
    }

    async fn put(&self, request: ApiRequest) -> ServiceResult<ApiResponse> {
        self.send(request, Method::Put).await
    }

    async fn delete(&self, request: ApiRequest) -> ServiceResult<ApiResponse> {
        self.send(request, Method::Delete).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_https_is_accepted_by_default() {
        assert!(validate_url("https://api.example.com/v1", false).is_ok());
        assert_eq!(
            validate_url("http://api.example.com/v1", false).unwrap_err(),
            ServiceError::bad_request("invalid URL")
        );
        assert!(validate_url("http://127.0.0.1:8080/v1", true).is_ok());
        assert!(validate_url("ftp://files.example.com", true).is_err());
        assert!(validate_url("not a url", true).is_err());
    }

    #[test]
    fn response_helpers() {
        let ok = ApiResponse::new(200, br#"{ "user": null }"#.to_vec());
        assert!(ok.is_ok());
        assert_eq!(ok.json::<Value>().unwrap(), json!({ "user": null }));

        let missing = ApiResponse::new(404, "nope");
        assert!(!missing.is_ok());
        assert_eq!(missing.status_reason(), "Not Found");
        assert_eq!(missing.json::<Value>().unwrap_err().status, 502);
        assert_eq!(missing.text(), "nope");
    }

    // Both cases fail validation before the client opens a connection.
    #[tokio::test]
    async fn mismatched_method_is_rejected() {
        let client = HttpsClient::new();
        let err = client
            .post(ApiRequest::delete("https://api.example.com/v1"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::bad_request("invalid request"));

        let err = client.get("http://api.example.com").await.unwrap_err();
        assert_eq!(err.message, "invalid URL");
    }
}
