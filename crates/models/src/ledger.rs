//! Invoice priority ledger.
//!
//! Ordering policy:
//! - **min-first**: a lower numeric priority is dequeued earlier;
//! - entries without a priority form the lowest-precedence tier and are
//!   dequeued after every prioritised entry;
//! - ties are broken by insertion order (per-ledger sequence number).
//!
//! Storage is an ordered map keyed by `(rank, sequence)`, which gives O(log n)
//! insert and dequeue and a cheap head lookup (price-time priority, the way an
//! order book keeps FIFO order inside each price level).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::order::Order;

/// Finite priority with a total order.
#[derive(Debug, Clone, Copy)]
struct Priority(f64);

impl Priority {
    fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Collapse -0.0 into 0.0 so both land in the same tier.
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Variant order matters: every `Ranked` sorts before `Unranked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Ranked(Priority),
    Unranked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    rank: Rank,
    seq: u64,
}

/// A line item together with the priority it was enqueued with.
///
/// Serialises to the persisted shape `{ "lineItem": {...}, "priority": n }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntry {
    pub line_item: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

/// Input accepted by [`InvoiceLedger::enqueue`]: a constructed order, or a raw
/// payload that still has to pass the order-shape check.
#[derive(Debug, Clone)]
pub enum InvoiceInput<'a> {
    Order(Order),
    Json(&'a Value),
}

impl From<Order> for InvoiceInput<'_> {
    fn from(value: Order) -> Self {
        Self::Order(value)
    }
}

impl<'a> From<&'a Value> for InvoiceInput<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

/// Priority-ordered invoice history owned by a single user.
#[derive(Debug, Clone, Default)]
pub struct InvoiceLedger {
    entries: BTreeMap<EntryKey, InvoiceEntry>,
    next_seq: u64,
}

impl InvoiceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from its persisted shape.
    ///
    /// A non-array input yields an empty ledger; bad elements are skipped.
    pub fn from_json(value: &Value) -> Self {
        let mut ledger = Self::new();
        ledger.extend_from_json(value);
        ledger
    }

    /// Replay persisted entries through [`enqueue`](Self::enqueue).
    ///
    /// Returns the number of entries accepted.
    pub fn extend_from_json(&mut self, value: &Value) -> usize {
        let Some(items) = value.as_array() else {
            warn!(found = kfs_core::error::json_kind(value), "invoice list is not an array; ignoring");
            return 0;
        };

        let mut accepted = 0;
        for (index, item) in items.iter().enumerate() {
            let Some(obj) = item.as_object() else {
                warn!(index, "skipping non-object invoice entry");
                continue;
            };

            let line_item = obj.get("lineItem").unwrap_or(&Value::Null);
            let priority = match obj.get("priority") {
                None | Some(Value::Null) => None,
                Some(p) => {
                    let n = p.as_f64();
                    if n.is_none() {
                        warn!(index, "invoice priority is not a number; using default tier");
                    }
                    n
                }
            };

            if self.enqueue(line_item, priority) {
                accepted += 1;
            }
        }

        debug!(accepted, total = items.len(), "hydrated invoice ledger");
        accepted
    }

    /// Insert an entry.
    ///
    /// Orders and raw payloads that fail the order-shape check are dropped and logged;
    /// the ledger is left unchanged. Returns whether the entry was inserted.
    pub fn enqueue<'a>(&mut self, entry: impl Into<InvoiceInput<'a>>, priority: Option<f64>) -> bool {
        let line_item = match entry.into() {
            InvoiceInput::Order(order) => match order.validate() {
                Ok(()) => order,
                Err(err) => {
                    warn!(error = %err, "dropping invalid invoice line item");
                    return false;
                }
            },
            InvoiceInput::Json(value) => match Order::try_from(value) {
                Ok(order) => order,
                Err(err) => {
                    warn!(error = %err, "dropping malformed invoice line item");
                    return false;
                }
            },
        };

        let rank = match priority {
            None => Rank::Unranked,
            Some(p) => match Priority::new(p) {
                Some(p) => Rank::Ranked(p),
                None => {
                    warn!(order_id = %line_item.id, priority = p, "non-finite priority; using default tier");
                    Rank::Unranked
                }
            },
        };
        let priority = match rank {
            Rank::Ranked(p) => Some(p.0),
            Rank::Unranked => None,
        };

        let key = EntryKey {
            rank,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(key, InvoiceEntry { line_item, priority });
        true
    }

    /// Remove and return the highest-precedence entry.
    pub fn dequeue(&mut self) -> Option<InvoiceEntry> {
        self.entries.pop_first().map(|(_, entry)| entry)
    }

    /// Borrow the highest-precedence entry without removing it.
    pub fn peek(&self) -> Option<&InvoiceEntry> {
        self.entries.first_key_value().map(|(_, entry)| entry)
    }

    /// Drop every entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in dequeue order.
    pub fn iter(&self) -> impl Iterator<Item = &InvoiceEntry> + '_ {
        self.entries.values()
    }
}

/// Two ledgers are equal when they would dequeue the same entries in the same order.
impl PartialEq for InvoiceLedger {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Serialize for InvoiceLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
