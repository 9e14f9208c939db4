use serde::Serialize;
use serde_json::Value;

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, ValueObject};

/// Keys an address payload must carry (values may be null).
const REQUIRED_KEYS: &[&str] = &["line1", "city", "state", "zipcode", "country"];

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Primary street address.
    pub line1: Option<String>,
    /// Secondary street address (suite, apartment).
    pub line2: Option<String>,
    pub city: Option<String>,
    /// Region of the address.
    pub state: Option<String>,
    pub county: Option<String>,
    /// Mailing code.
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl ValueObject for Address {}

impl Address {
    /// Fail-soft construction from a raw payload.
    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        json::require_keys(obj, REQUIRED_KEYS)?;

        Ok(Self {
            line1: json::optional_string(obj, "line1")?,
            line2: json::non_empty_string(obj, "line2")?,
            city: json::optional_string(obj, "city")?,
            state: json::optional_string(obj, "state")?,
            county: json::non_empty_string(obj, "county")?,
            zipcode: json::optional_string(obj, "zipcode")?,
            country: json::optional_string(obj, "country")?,
        })
    }

    /// Full, formatted address.
    ///
    /// ```
    /// # use kfs_models::Address;
    /// let address = Address {
    ///     line1: Some("One Apple Park Way".into()),
    ///     city: Some("Cupertino".into()),
    ///     state: Some("CA".into()),
    ///     zipcode: Some("95014".into()),
    ///     country: Some("US".into()),
    ///     ..Address::default()
    /// };
    /// assert_eq!(address.print(), "One Apple Park Way, Cupertino, CA 95014 US");
    /// ```
    pub fn print(&self) -> String {
        fn part(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("")
        }

        let mut street = part(&self.line1).to_string();
        if let Some(line2) = &self.line2 {
            street.push(' ');
            street.push_str(line2);
        }

        let mut region = part(&self.state).to_string();
        if let Some(county) = &self.county {
            region.push_str(", ");
            region.push_str(county);
        }

        format!(
            "{street}, {}, {region} {} {}",
            part(&self.city),
            part(&self.zipcode),
            part(&self.country)
        )
        .trim_end()
        .to_string()
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.print())
    }
}

impl TryFrom<&Value> for Address {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

pub fn is_address(value: &Value) -> bool {
    Address::try_from(value).is_ok()
}
