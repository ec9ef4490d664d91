//! Core traits for persisted entities and their document representation.
//!
//! Every record stored through a [`Repository`](crate::repository::Repository)
//! implements [`Entity`]: it names its collection and exposes an optional
//! [`ObjectId`] that the store assigns on insert. [`EntityExt`] provides the
//! BSON conversions and is blanket-implemented for all entities.

use bson::{Bson, Document, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{DocPipeError, DocPipeResult};

/// Core trait for records persisted in a document collection.
///
/// An entity's id is `None` until the store assigns one on insert and is
/// immutable afterwards. An entity without an assigned id cannot be updated
/// or deleted by identity.
///
/// The id field should map to the store's primary-key field through serde:
///
/// ```ignore
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
/// use docpipe_core::entity::Entity;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Product {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub name: String,
/// }
///
/// impl Entity for Product {
///     fn id(&self) -> Option<&ObjectId> {
///         self.id.as_ref()
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = Some(id);
///     }
///
///     fn collection_name() -> &'static str {
///         "products"
///     }
/// }
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the store-assigned identifier, or `None` before insert.
    fn id(&self) -> Option<&ObjectId>;

    /// Records the store-assigned identifier after insert.
    fn set_id(&mut self, id: ObjectId);

    /// Returns the name of the collection this entity belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "products").
    fn collection_name() -> &'static str;
}

/// Extension trait providing document conversions for entities.
///
/// Automatically implemented for every [`Entity`].
pub trait EntityExt: Entity {
    /// Serializes this entity into a BSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`DocPipeError::Serialization`] if serialization fails or
    /// the entity does not serialize to a document.
    fn to_document(&self) -> DocPipeResult<Document>;

    /// Deserializes an entity from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`DocPipeError::Serialization`] if the document does not
    /// match the entity's shape.
    fn from_document(document: Document) -> DocPipeResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_document(&self) -> DocPipeResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            _ => Err(DocPipeError::Serialization(format!(
                "{} did not serialize to a document",
                std::any::type_name::<E>(),
            ))),
        }
    }

    fn from_document(document: Document) -> DocPipeResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }
}

/// Parses a caller-supplied id string into an [`ObjectId`].
///
/// # Errors
///
/// Returns [`DocPipeError::InvalidArgument`] when the string is empty or is
/// not a well-formed 24-hex-digit identifier. The check runs before any
/// store access.
pub fn parse_entity_id(id: &str) -> DocPipeResult<ObjectId> {
    if id.trim().is_empty() {
        return Err(DocPipeError::InvalidArgument(
            "entity id must not be empty".to_string(),
        ));
    }

    ObjectId::parse_str(id).map_err(|_| {
        DocPipeError::InvalidArgument(format!("malformed entity id: {id:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entity_id_accepts_well_formed_ids() {
        let id = ObjectId::new();
        assert_eq!(parse_entity_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_entity_id_rejects_empty_and_blank() {
        assert!(matches!(
            parse_entity_id(""),
            Err(DocPipeError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_entity_id("   "),
            Err(DocPipeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn parse_entity_id_rejects_malformed_ids() {
        for id in ["xyz", "0123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(matches!(
                parse_entity_id(id),
                Err(DocPipeError::InvalidArgument(_))
            ));
        }
    }
}
