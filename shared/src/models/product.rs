//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_non_negative_price, validate_not_blank};

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub current_stock: i32,
    pub minimum_stock: i32,
    /// Optimistic concurrency token, bumped on every committed change
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a freshly created product from a validated draft
    pub fn from_draft(id: Uuid, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            purchase_price: draft.purchase_price,
            sale_price: draft.sale_price,
            current_stock: draft.current_stock,
            minimum_stock: draft.minimum_stock,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields with a validated draft and bump the version
    pub fn apply_draft(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.category = draft.category;
        self.purchase_price = draft.purchase_price;
        self.sale_price = draft.sale_price;
        self.current_stock = draft.current_stock;
        self.minimum_stock = draft.minimum_stock;
        self.version += 1;
        self.updated_at = now;
    }

    /// Stock is strictly below the configured minimum
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.minimum_stock
    }

    /// Margin earned on a single unit; negative for loss-making prices
    pub fn profit_per_unit(&self) -> Decimal {
        self.sale_price - self.purchase_price
    }

    /// The editable fields of this product as a draft
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            current_stock: self.current_stock,
            minimum_stock: self.minimum_stock,
        }
    }
}

/// Editable product fields, used for creation and as the merged result of an update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ProductDraft {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    #[validate(custom = "validate_non_negative_price")]
    pub purchase_price: Decimal,

    #[validate(custom = "validate_non_negative_price")]
    pub sale_price: Decimal,

    #[serde(default)]
    #[validate(range(min = 0, message = "Current stock cannot be negative"))]
    pub current_stock: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub minimum_stock: i32,
}

/// Partial update of a product; absent fields keep their stored value.
///
/// For `description` and `category`, an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub current_stock: Option<i32>,
    pub minimum_stock: Option<i32>,
}

impl ProductChanges {
    /// Merge these changes onto the stored product, producing the draft to validate
    pub fn merge_onto(self, product: &Product) -> ProductDraft {
        let mut draft = product.to_draft();
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = non_empty(description);
        }
        if let Some(category) = self.category {
            draft.category = non_empty(category);
        }
        if let Some(price) = self.purchase_price {
            draft.purchase_price = price;
        }
        if let Some(price) = self.sale_price {
            draft.sale_price = price;
        }
        if let Some(stock) = self.current_stock {
            draft.current_stock = stock;
        }
        if let Some(minimum) = self.minimum_stock {
            draft.minimum_stock = minimum;
        }
        draft
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// A product together with its movement history, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub movements: Vec<super::StockMovement>,
}
