//! User account model with its priority-ordered invoice history.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, Entity};

use crate::address::Address;
use crate::billing::Billing;
use crate::company::Company;
use crate::ledger::{InvoiceInput, InvoiceLedger};

/// Id carried by a user that has not been persisted yet.
pub const ANONYMOUS_USER_ID: &str = "*";

/// Keys a user payload must carry.
const REQUIRED_KEYS: &[&str] = &["id", "firstName", "lastName", "email"];

/// Account type. Transmitted as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserType {
    Admin = 0,
    #[default]
    Guest = 1,
    Personal = 2,
    Business = 3,
}

impl UserType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(UserType::Admin),
            1 => Some(UserType::Guest),
            2 => Some(UserType::Personal),
            3 => Some(UserType::Business),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for UserType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A customer account as seen by the client.
///
/// Constructed from an API payload with [`User::from_json`], which never fails
/// because of a bad nested record: malformed address, company, billing or
/// invoice entries are logged and left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: String,
    #[serde(rename = "type")]
    user_type: UserType,
    first_name: Option<String>,
    last_name: Option<String>,
    suffix: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<Address>,
    company: Option<Company>,
    billing: Option<Billing>,
    invoices: InvoiceLedger,
    has_edits: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: ANONYMOUS_USER_ID.to_string(),
            user_type: UserType::default(),
            first_name: None,
            last_name: None,
            suffix: None,
            email: None,
            phone: None,
            address: None,
            company: None,
            billing: None,
            invoices: InvoiceLedger::new(),
            has_edits: false,
        }
    }
}

impl Entity for User {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Fail-soft hydration. `None` only when the payload is not user-shaped.
    pub fn from_json(value: &Value) -> Option<Self> {
        match Self::try_from(value) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "payload is not a user record");
                None
            }
        }
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        json::require_keys(obj, REQUIRED_KEYS)?;

        let mut user = Self::new(json::required_string(obj, "id")?);

        // Past the key check every scalar is lenient: a wrong type is dropped, not fatal.
        user.first_name = lenient_string(obj, "firstName", &user.id);
        user.last_name = lenient_string(obj, "lastName", &user.id);
        user.email = lenient_string(obj, "email", &user.id);
        user.suffix = lenient_string(obj, "suffix", &user.id);
        user.phone = lenient_string(obj, "phone", &user.id);
        if let Some(code) = json::optional_i64(obj, "type").ok().flatten() {
            match UserType::from_code(code) {
                Some(t) => user.user_type = t,
                None => warn!(user_id = %user.id, code, "unknown user type; keeping default"),
            }
        }

        user.address = hydrate_nested(obj, "address", &user.id, |v| Address::try_from(v));
        user.company = hydrate_nested(obj, "company", &user.id, |v| Company::try_from(v));
        user.billing = hydrate_nested(obj, "billing", &user.id, |v| Billing::try_from(v));

        if let Some(invoices) = json::nested(obj, "invoices") {
            let accepted = user.invoices.extend_from_json(invoices);
            debug!(user_id = %user.id, accepted, "replayed invoice history");
        }

        // Replay above must not count as an edit; only the persisted flag does.
        user.has_edits = json::optional_bool(obj, "hasEdits").ok().flatten().unwrap_or(false);

        Ok(user)
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn company(&self) -> Option<&Company> {
        self.company.as_ref()
    }

    pub fn billing(&self) -> Option<&Billing> {
        self.billing.as_ref()
    }

    pub fn invoices(&self) -> &InvoiceLedger {
        &self.invoices
    }

    /// Whether the model has local changes not yet saved.
    pub fn has_edits(&self) -> bool {
        self.has_edits
    }

    pub fn mark_edited(&mut self) {
        self.has_edits = true;
    }

    /// Reset the edit flag, typically after a successful save.
    pub fn mark_saved(&mut self) {
        self.has_edits = false;
    }

    pub fn set_user_type(&mut self, user_type: UserType) {
        self.user_type = user_type;
        self.mark_edited();
    }

    pub fn set_first_name(&mut self, value: Option<String>) {
        self.first_name = value;
        self.mark_edited();
    }

    pub fn set_last_name(&mut self, value: Option<String>) {
        self.last_name = value;
        self.mark_edited();
    }

    pub fn set_suffix(&mut self, value: Option<String>) {
        self.suffix = value;
        self.mark_edited();
    }

    pub fn set_email(&mut self, value: Option<String>) {
        self.email = value;
        self.mark_edited();
    }

    pub fn set_phone(&mut self, value: Option<String>) {
        self.phone = value;
        self.mark_edited();
    }

    pub fn set_address(&mut self, value: Option<Address>) {
        self.address = value;
        self.mark_edited();
    }

    pub fn set_company(&mut self, value: Option<Company>) {
        self.company = value;
        self.mark_edited();
    }

    pub fn set_billing(&mut self, value: Option<Billing>) {
        self.billing = value;
        self.mark_edited();
    }

    /// Add an invoice to the user's history.
    ///
    /// Goes through the same path as hydration: raw payloads that are not
    /// order-shaped are dropped. Returns whether the invoice was recorded.
    pub fn add_invoice<'a>(&mut self, invoice: impl Into<InvoiceInput<'a>>, priority: Option<f64>) -> bool {
        let added = self.invoices.enqueue(invoice, priority);
        if added {
            self.mark_edited();
        }
        added
    }

    /// Clears the invoice list.
    pub fn clear_invoices(&mut self) {
        self.invoices.clear();
        self.mark_edited();
    }

    /// Full display name (e.g. `John Smith Sr`); missing parts are skipped.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.last_name, &self.suffix]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn lenient_string(obj: &Object, field: &'static str, user_id: &str) -> Option<String> {
    match json::optional_string(obj, field) {
        Ok(value) => value,
        Err(err) => {
            warn!(user_id, field, error = %err, "dropping mistyped user field");
            None
        }
    }
}

fn hydrate_nested<T>(
    obj: &Object,
    field: &'static str,
    user_id: &str,
    parse: impl FnOnce(&Value) -> DomainResult<T>,
) -> Option<T> {
    let value = json::nested(obj, field)?;
    match parse(value) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(user_id, field, error = %err, "ignoring malformed nested record");
            None
        }
    }
}

impl TryFrom<&Value> for User {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

/// User-shape predicate: an object with `id`, `firstName`, `lastName` and
/// `email` keys and a non-empty string id. Holds exactly when
/// [`User::from_json`] succeeds.
pub fn is_user(value: &Value) -> bool {
    User::try_from(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "id": "u-42",
            "type": 3,
            "firstName": "John",
            "lastName": "Smith",
            "suffix": "Sr",
            "email": "john@example.com",
            "phone": "555-0100",
            "address": {
                "line1": "One Apple Park Way", "city": "Cupertino", "state": "CA",
                "zipcode": "95014", "country": "US"
            },
            "company": { "name": "Acme" },
            "billing": { "paymentMethods": [] },
            "invoices": [
                { "lineItem": { "id": "A" }, "priority": 2 },
                { "lineItem": { "id": "B" }, "priority": 1 },
                { "lineItem": { "id": "C" } }
            ]
        })
    }

    fn invoice_ids(user: &User) -> Vec<String> {
        user.invoices().iter().map(|e| e.line_item.id.clone()).collect()
    }

    #[test]
    fn hydrates_every_section() {
        let user = User::from_json(&user_json()).unwrap();

        assert_eq!(user.id(), "u-42");
        assert_eq!(user.user_type(), UserType::Business);
        assert_eq!(user.full_name(), "John Smith Sr");
        assert_eq!(user.address().unwrap().print(), "One Apple Park Way, Cupertino, CA 95014 US");
        assert_eq!(user.company().unwrap().name, "Acme");
        assert!(user.billing().is_some());
        assert_eq!(invoice_ids(&user), vec!["B", "A", "C"]);
        assert!(!user.has_edits());
    }

    #[test]
    fn non_user_payload_is_rejected() {
        assert!(User::from_json(&json!({ "id": "u-1", "email": "x@example.com" })).is_none());
        assert!(User::from_json(&json!([])).is_none());
        assert!(!is_user(&json!({ "id": 5, "firstName": null, "lastName": null, "email": null })));
        assert!(is_user(&json!({ "id": "u", "firstName": null, "lastName": null, "email": null })));
    }

    #[test]
    fn shape_predicate_matches_hydration() {
        let payloads = [
            json!({ "id": "u", "firstName": 5, "lastName": "S", "email": "e" }),
            json!({ "id": "u", "firstName": "F", "lastName": [], "email": { "a": 1 } }),
            json!({ "id": "u", "firstName": null, "lastName": null, "email": null }),
            json!({ "id": "", "firstName": "F", "lastName": "L", "email": "e" }),
            json!({ "id": "u", "firstName": "F", "lastName": "L" }),
            json!("u"),
            user_json(),
        ];
        for payload in &payloads {
            assert_eq!(is_user(payload), User::from_json(payload).is_some(), "{payload}");
        }

        let user = User::from_json(&payloads[0]).unwrap();
        assert_eq!(user.first_name(), None);
        assert_eq!(user.last_name(), Some("S"));
    }

    #[test]
    fn bad_nested_records_do_not_block_hydration() {
        let mut payload = user_json();
        payload["type"] = json!(99);
        payload["suffix"] = json!(7);
        payload["address"] = json!({ "line1": "only a street" });
        payload["company"] = json!("Acme");
        payload["invoices"] = json!([
            { "lineItem": { "id": "ok" }, "priority": 1 },
            { "lineItem": { "sku": "missing id" }, "priority": 0 },
            42
        ]);

        let user = User::from_json(&payload).unwrap();
        assert_eq!(user.user_type(), UserType::Guest);
        assert_eq!(user.suffix(), None);
        assert!(user.address().is_none());
        assert!(user.company().is_none());
        assert_eq!(invoice_ids(&user), vec!["ok"]);
    }

    #[test]
    fn add_invoice_accepts_orders_and_raw_payloads() {
        let mut user = User::new("u-1");
        assert!(user.add_invoice(Order::new("live"), Some(3.0)));
        assert!(user.add_invoice(&json!({ "id": "raw" }), Some(1.0)));
        assert!(!user.add_invoice(&json!({ "nope": true }), Some(0.0)));

        assert_eq!(invoice_ids(&user), vec!["raw", "live"]);
        assert!(user.has_edits());

        user.clear_invoices();
        assert!(user.invoices().is_empty());
    }

    #[test]
    fn rejected_invoice_does_not_mark_edits() {
        let mut user = User::new("u-1");
        assert!(!user.add_invoice(&json!("not an order"), None));
        assert!(!user.has_edits());
    }

    #[test]
    fn rehydrating_from_serialised_user_keeps_invoice_order() {
        let mut live = User::new("u-7");
        live.add_invoice(Order::new("A"), Some(2.0));
        live.add_invoice(Order::new("C"), None);
        live.add_invoice(Order::new("B"), Some(1.0));
        live.add_invoice(Order::new("D"), Some(1.0));

        let mut serialised = serde_json::to_value(&live).unwrap();
        // Required keys travel as nulls.
        assert!(serialised.get("firstName").unwrap().is_null());

        let restored = User::from_json(&serialised).unwrap();
        assert_eq!(restored.invoices(), live.invoices());
        assert_eq!(invoice_ids(&restored), vec!["B", "D", "A", "C"]);

        // An order the ledger refuses never reaches the serialised form.
        assert!(!live.add_invoice(Order::new(""), Some(0.0)));
        let restored = User::from_json(&serde_json::to_value(&live).unwrap()).unwrap();
        assert_eq!(restored.invoices(), live.invoices());

        serialised["invoices"] = json!(null);
        assert!(User::from_json(&serialised).unwrap().invoices().is_empty());
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let mut user = User::new("u-1");
        user.set_last_name(Some("Smith".into()));
        assert_eq!(user.full_name(), "Smith");
        assert!(user.has_edits());

        user.mark_saved();
        assert!(!user.has_edits());
        assert_eq!(User::default().full_name(), "");
        assert_eq!(User::default().id(), ANONYMOUS_USER_ID);
    }

    #[test]
    fn identity_follows_id_not_fields() {
        let a = User::new("u-1");
        let mut b = User::new("u-1");
        b.set_email(Some("new@example.com".into()));

        assert_ne!(a, b);
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&User::new("u-2")));
    }

    #[test]
    fn type_serialises_as_numeric_code() {
        let mut user = User::new("u-1");
        user.set_user_type(UserType::Personal);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["type"], 2);
        assert_eq!(value["hasEdits"], true);
    }
}
