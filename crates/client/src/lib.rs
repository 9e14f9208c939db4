//! `kfs-client`: HTTP access to the remote account APIs.
//!
//! The [`HttpTransport`] trait is the seam between services and the network;
//! [`HttpsClient`] is the reqwest implementation used in production.

pub mod config;
pub mod error;
pub mod headers;
pub mod https;
pub mod session;
pub mod user_service;

pub use config::ClientConfig;
pub use error::{ServiceError, ServiceResult};
pub use headers::{ApiHeaders, order_api_headers, user_api_headers};
pub use https::{ApiRequest, ApiResponse, HttpTransport, HttpsClient, Method};
pub use session::{MemorySession, SessionStore};
pub use user_service::UserService;
