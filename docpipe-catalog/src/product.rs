//! The product entity and its classification.

use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use docpipe_core::entity::Entity;

/// Classification of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    /// Unclassified.
    Any,
    /// Deposit account product.
    Deposit,
    /// Vehicle loan.
    Autocredit,
    /// Mortgage loan.
    Mortgage,
    /// Consumer loan.
    Credit,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Insurance product.
    Insurance,
    /// Cash services.
    CashService,
}

/// A catalog product persisted in the `products` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier; `None` until inserted.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Short machine-friendly alias.
    pub alias: String,
    /// Display name.
    pub name: String,
    /// Product classification.
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// When the product was created.
    pub created: DateTime,
}

impl Product {
    /// Creates an unsaved product stamped with the current time.
    pub fn new(alias: impl Into<String>, name: impl Into<String>, product_type: ProductType) -> Self {
        Self {
            id: None,
            alias: alias.into(),
            name: name.into(),
            product_type,
            created: DateTime::now(),
        }
    }
}

impl Entity for Product {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn collection_name() -> &'static str {
        "products"
    }
}
