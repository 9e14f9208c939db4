//! Catalog models: items, orderable products and user reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, Entity};

/// Fields shared by everything listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price in smallest currency unit (e.g., cents).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            price: None,
            images: Vec::new(),
        }
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let images = match json::nested(obj, "images") {
            None => Vec::new(),
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(_) => return Err(DomainError::invalid("images", "expected array")),
        };

        Ok(Self {
            id: json::required_string(obj, "id")?,
            name: json::optional_string(obj, "name")?,
            description: json::optional_string(obj, "description")?,
            price: json::optional_u64(obj, "price")?,
            images,
        })
    }
}

impl TryFrom<&Value> for CatalogItem {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

/// A user's rating and written review of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Star rating, 0 through 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserReview {
    fn from_object(obj: &Object) -> DomainResult<Self> {
        let rating = json::optional_f64(obj, "rating")?;
        if let Some(r) = rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(DomainError::invalid("rating", "must be between 0 and 5"));
            }
        }

        let created_at = match json::optional_string(obj, "createdAt")? {
            None => None,
            Some(s) => Some(
                kfs_core::time::to_utc(s.as_str())
                    .ok_or_else(|| DomainError::invalid("createdAt", "expected timestamp"))?,
            ),
        };

        Ok(Self {
            id: json::optional_string(obj, "id")?,
            user_id: json::optional_string(obj, "userId")?,
            rating,
            title: json::optional_string(obj, "title")?,
            body: json::optional_string(obj, "body")?,
            created_at,
        })
    }
}

impl TryFrom<&Value> for UserReview {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

/// An orderable catalog product.
///
/// Ratings and reviews are only carried when the product enables them; a
/// payload that ships review data for a product with reviews disabled has that
/// data discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
    /// Key features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    /// Technical specifications, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Value>,
    pub enable_ratings: bool,
    /// Aggregated user rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub enable_reviews: bool,
    pub reviews: Vec<UserReview>,
    /// The signed-in user's own review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_review: Option<UserReview>,
    /// External link to support and documentation.
    #[serde(rename = "documentsURL", skip_serializing_if = "Option::is_none")]
    pub documents_url: Option<String>,
}

impl Entity for CatalogProduct {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.item.id
    }
}

impl CatalogProduct {
    pub fn new(id: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            item: CatalogItem::new(id),
            sku: sku.into(),
            quantity: None,
            stock: None,
            features: None,
            specifications: None,
            enable_ratings: false,
            rating: None,
            enable_reviews: false,
            reviews: Vec::new(),
            user_review: None,
            documents_url: None,
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    pub fn in_stock(&self) -> bool {
        self.stock.is_some_and(|s| s > 0)
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let item = CatalogItem::from_object(obj)?;
        let mut product = Self::new(item.id.clone(), json::required_string(obj, "sku")?);
        product.item = item;

        // Zero counts are treated as "not reported".
        product.quantity = json::optional_u64(obj, "quantity")?.filter(|q| *q > 0);
        product.stock = json::optional_u64(obj, "stock")?.filter(|s| *s > 0);
        product.features = json::non_empty_string(obj, "features")?;
        product.specifications = json::nested(obj, "specifications").cloned();
        product.documents_url = json::non_empty_string(obj, "documentsURL")?;

        if json::optional_bool(obj, "enableRatings")? == Some(true) {
            product.enable_ratings = true;
            product.rating = json::optional_f64(obj, "rating")?;
        }

        if json::optional_bool(obj, "enableReviews")? == Some(true) {
            product.enable_reviews = true;
            let sku = product.sku.clone();

            product.user_review = json::nested(obj, "userReview").and_then(|v| {
                UserReview::try_from(v)
                    .map_err(|err| warn!(sku = %sku, error = %err, "ignoring malformed user review"))
                    .ok()
            });

            if let Some(Value::Array(list)) = json::nested(obj, "reviews") {
                product.reviews = list
                    .iter()
                    .filter(|v| !v.is_null())
                    .filter_map(|v| {
                        UserReview::try_from(v)
                            .map_err(|err| warn!(sku = %sku, error = %err, "skipping malformed review"))
                            .ok()
                    })
                    .collect();
            }
        }

        Ok(product)
    }
}

impl TryFrom<&Value> for CatalogProduct {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

pub fn is_product(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| {
            json::required_string(obj, "id").is_ok() && json::required_string(obj, "sku").is_ok()
        })
}
