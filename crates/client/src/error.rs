//! Errors surfaced by the remote service layer.

/// A failed service call, carrying an HTTP-style status code.
///
/// Validation failures raised before any I/O use the 4xx range; failures
/// talking to or decoding from the remote end use 5xx.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("service error ({status}): {message}")]
pub struct ServiceError {
    pub status: u16,
    pub message: String,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn build(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::build(400, message)
    }

    /// The remote end could not be reached.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::build(503, message)
    }

    /// The remote end answered with something we could not interpret.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::build(502, message)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_pick_status_ranges() {
        assert!(ServiceError::bad_request("invalid URL").is_client_error());
        assert!(ServiceError::transport("connection refused").is_server_error());
        assert_eq!(ServiceError::decode("bad body").status, 502);
        assert!(!ServiceError::build(302, "moved").is_client_error());
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = ServiceError::build(404, "user not found");
        assert_eq!(err.to_string(), "service error (404): user not found");
    }
}
