//! Requests and responses for the user API.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use kfs_models::{User, is_user};

use crate::config::ClientConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::headers::{ApiHeaders, user_api_headers};
use crate::https::{ApiRequest, ApiResponse, HttpTransport, HttpsClient, Method};
use crate::session::SessionStore;

/// Client for the user account endpoints.
pub struct UserService<T = HttpsClient> {
    transport: T,
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
}

impl UserService<HttpsClient> {
    /// Service backed by a reqwest client honouring `config.allow_insecure`.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        let transport = HttpsClient::new().with_allow_insecure(config.allow_insecure);
        Self::with_transport(transport, config, session)
    }
}

impl<T: HttpTransport> UserService<T> {
    pub fn with_transport(transport: T, config: ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self {
            transport,
            config,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn headers(&self) -> ApiHeaders {
        user_api_headers(
            self.session.access_token().as_deref(),
            self.session.client_id().as_deref(),
        )
    }

    fn request(&self, method: Method, body: Value) -> ApiRequest {
        ApiRequest::new(method, self.config.endpoint())
            .with_headers(self.headers())
            .with_json(body)
    }

    /// Fetch a user's account information.
    #[instrument(skip(self))]
    pub async fn get_account_info(&self, username: &str) -> ServiceResult<User> {
        validate_username(username)?;

        let request = self.request(Method::Post, json!({ "username": username }));
        let response = self.transport.post(request).await?;
        if !response.is_ok() {
            return Err(error_from_response(&response));
        }

        let body: Value = response.json()?;
        body.get("user")
            .and_then(User::from_json)
            .ok_or_else(|| ServiceError::decode("response did not contain a valid user"))
    }

    /// Save a user's account information. Returns whether the API accepted it.
    #[instrument(skip(self, details))]
    pub async fn update_account_info(&self, username: &str, details: &User) -> ServiceResult<bool> {
        validate_username(username)?;

        let details = serde_json::to_value(details)
            .map_err(|e| ServiceError::bad_request(format!("invalid user model: {e}")))?;
        if !is_user(&details) {
            return Err(ServiceError::bad_request("invalid user model"));
        }

        let request = self.request(Method::Post, json!({ "username": username, "details": details }));
        let response = self.transport.post(request).await?;
        log_outcome("update_account_info", &response);
        Ok(response.is_ok())
    }

    /// Delete a user's account. Returns whether the API accepted it.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, username: &str) -> ServiceResult<bool> {
        validate_username(username)?;

        let request = self.request(Method::Delete, json!({ "username": username }));
        let response = self.transport.delete(request).await?;
        log_outcome("delete_account", &response);
        Ok(response.is_ok())
    }
}

fn validate_username(username: &str) -> ServiceResult<()> {
    if username.trim().is_empty() {
        return Err(ServiceError::bad_request("invalid username param"));
    }
    Ok(())
}

/// Build an error from a non-2xx response, preferring the body's `message`.
fn error_from_response(response: &ApiResponse) -> ServiceError {
    let message = response
        .json::<Value>()
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| response.status_reason().to_string());
    ServiceError::build(response.status, message)
}

fn log_outcome(operation: &'static str, response: &ApiResponse) {
    if response.is_ok() {
        info!(operation, status = response.status, "user API call succeeded");
    } else {
        warn!(operation, status = response.status, "user API call rejected");
    }
}
