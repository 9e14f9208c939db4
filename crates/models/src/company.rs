use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, ValueObject};

use crate::address::Address;

/// Employer / organisation details attached to a business account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl ValueObject for Company {}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: None,
            phone: None,
            address: None,
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let address = match json::nested(obj, "address") {
            None => None,
            Some(v) => match Address::try_from(v) {
                Ok(a) => Some(a),
                Err(err) => {
                    warn!(error = %err, "ignoring malformed company address");
                    None
                }
            },
        };

        Ok(Self {
            name: json::required_string(obj, "name")?,
            department: json::optional_string(obj, "department")?,
            phone: json::optional_string(obj, "phone")?,
            address,
        })
    }
}

impl TryFrom<&Value> for Company {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

pub fn is_company(value: &Value) -> bool {
    Company::try_from(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_is_required() {
        assert!(!is_company(&json!({ "department": "R&D" })));
        assert!(is_company(&json!({ "name": "Acme" })));
    }

    #[test]
    fn malformed_address_is_dropped_not_fatal() {
        let company = Company::from_json(&json!({
            "name": "Acme",
            "address": { "line1": "1 Main St" }
        }))
        .unwrap();

        assert_eq!(company.name, "Acme");
        assert_eq!(company.address, None);
    }
}
