use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, ValueObject};

use crate::address::Address;

/// A stored card or payment-processor account.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,
    pub is_payment_processor: bool,
    pub is_default: bool,
    pub billing_address: Address,
}

impl core::fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaymentMethod")
            .field("name", &self.name)
            .field("card_number", &self.masked_card_number())
            .field("card_type", &self.card_type)
            .field("card_network", &self.card_network)
            .field("security_code", &self.security_code.as_ref().map(|_| "[REDACTED]"))
            .field("is_payment_processor", &self.is_payment_processor)
            .field("is_default", &self.is_default)
            .field("billing_address", &self.billing_address)
            .finish()
    }
}

impl ValueObject for PaymentMethod {}

impl PaymentMethod {
    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Card number with everything but the last four digits masked.
    pub fn masked_card_number(&self) -> Option<String> {
        let number = self.card_number.as_deref()?;
        let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
        let keep = digits.len().min(4);
        let hidden = digits.len() - keep;
        let tail: String = digits[hidden..].iter().collect();
        Some(format!("{}{tail}", "*".repeat(hidden)))
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let billing_address = match json::nested(obj, "billingAddress") {
            None => return Err(DomainError::missing("billingAddress")),
            Some(v) => Address::try_from(v)
                .map_err(|e| DomainError::invalid("billingAddress", e.to_string()))?,
        };

        Ok(Self {
            name: json::required_string(obj, "name")?,
            card_number: json::optional_string(obj, "cardNumber")?,
            card_type: json::optional_string(obj, "cardType")?,
            card_network: json::optional_string(obj, "cardNetwork")?,
            security_code: json::optional_string(obj, "securityCode")?,
            is_payment_processor: json::optional_bool(obj, "isPaymentProcessor")?.unwrap_or(false),
            is_default: json::optional_bool(obj, "isDefault")?.unwrap_or(false),
            billing_address,
        })
    }
}

impl TryFrom<&Value> for PaymentMethod {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

pub fn is_payment_method(value: &Value) -> bool {
    PaymentMethod::try_from(value).is_ok()
}

/// Billing profile: stored payment methods plus an optional billing address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub payment_methods: Vec<PaymentMethod>,
}

impl ValueObject for Billing {}

impl Billing {
    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// The method flagged default, else the first stored method.
    pub fn default_method(&self) -> Option<&PaymentMethod> {
        self.payment_methods
            .iter()
            .find(|m| m.is_default)
            .or_else(|| self.payment_methods.first())
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let methods = json::nested(obj, "paymentMethods")
            .ok_or_else(|| DomainError::missing("paymentMethods"))?
            .as_array()
            .ok_or_else(|| DomainError::invalid("paymentMethods", "expected array"))?;

        let payment_methods = methods
            .iter()
            .enumerate()
            .filter_map(|(index, m)| match PaymentMethod::try_from(m) {
                Ok(method) => Some(method),
                Err(err) => {
                    warn!(index, error = %err, "skipping malformed payment method");
                    None
                }
            })
            .collect();

        let address = json::nested(obj, "address").and_then(Address::from_json);

        Ok(Self {
            address,
            payment_methods,
        })
    }
}

impl TryFrom<&Value> for Billing {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

pub fn is_billing(value: &Value) -> bool {
    Billing::try_from(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address_json() -> Value {
        json!({
            "line1": "1 Main St", "city": "Springfield", "state": "IL",
            "zipcode": "62701", "country": "US"
        })
    }

    #[test]
    fn payment_method_requires_name_and_billing_address() {
        assert!(!is_payment_method(&json!({ "name": "Visa" })));
        assert!(!is_payment_method(&json!({ "billingAddress": address_json() })));
        assert!(is_payment_method(&json!({ "name": "Visa", "billingAddress": address_json() })));
    }

    #[test]
    fn debug_output_redacts_card_details() {
        let method = PaymentMethod::from_json(&json!({
            "name": "Visa",
            "cardNumber": "4111 1111 1111 1234",
            "securityCode": "987",
            "billingAddress": address_json()
        }))
        .unwrap();

        let debug = format!("{method:?}");
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("987"));
        assert!(debug.contains("************1234"));
    }

    #[test]
    fn default_method_prefers_flagged_then_first() {
        let billing = Billing::from_json(&json!({
            "paymentMethods": [
                { "name": "Amex", "billingAddress": address_json() },
                { "name": "bad" },
                { "name": "Visa", "isDefault": true, "billingAddress": address_json() }
            ]
        }))
        .unwrap();

        assert_eq!(billing.payment_methods.len(), 2);
        assert_eq!(billing.default_method().unwrap().name, "Visa");

        let unflagged = Billing {
            payment_methods: billing.payment_methods[..1].to_vec(),
            ..Billing::default()
        };
        assert_eq!(unflagged.default_method().unwrap().name, "Amex");
        assert!(Billing::default().default_method().is_none());
    }

    #[test]
    fn billing_requires_payment_methods_array() {
        assert!(!is_billing(&json!({})));
        assert!(!is_billing(&json!({ "paymentMethods": "visa" })));
        assert!(is_billing(&json!({ "paymentMethods": [] })));
    }

    #[test]
    fn short_card_numbers_are_not_over_masked() {
        let mut method = PaymentMethod::from_json(&json!({
            "name": "Card", "cardNumber": "12", "billingAddress": address_json()
        }))
        .unwrap();
        assert_eq!(method.masked_card_number().as_deref(), Some("12"));

        method.card_number = None;
        assert_eq!(method.masked_card_number(), None);
    }
}
