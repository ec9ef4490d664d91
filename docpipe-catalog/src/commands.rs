//! Write-side requests for the product catalog.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use docpipe_core::{
    error::{DocPipeError, DocPipeResult},
    request::{Handler, Request},
    store::DynDocumentStore,
    validate::{ValidationFailure, Validator},
};

use crate::product::{Product, ProductType};

/// Creates one product in the catalog; responds with the stored product,
/// id populated.
#[derive(Debug, Clone)]
pub struct AddProduct {
    /// Short machine-friendly alias.
    pub alias: String,
    /// Display name.
    pub name: String,
    /// Product classification.
    pub product_type: ProductType,
}

impl Request for AddProduct {
    type Response = Product;

    fn name() -> &'static str {
        "AddProduct"
    }
}

/// Handler persisting an [`AddProduct`] command.
pub struct AddProductHandler {
    store: Arc<DynDocumentStore>,
}

impl AddProductHandler {
    /// Creates the handler over the shared store.
    pub fn new(store: Arc<DynDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<AddProduct> for AddProductHandler {
    async fn handle(
        &self,
        request: &AddProduct,
        token: &CancellationToken,
    ) -> DocPipeResult<Product> {
        let repository = self.store.repository::<Product>();
        let product = Product::new(
            request.alias.clone(),
            request.name.clone(),
            request.product_type,
        );

        token
            .run_until_cancelled(repository.add(product))
            .await
            .ok_or(DocPipeError::Cancelled)?
    }
}

/// Rules for [`AddProduct`]: alias and name must not be blank.
pub struct AddProductValidator;

#[async_trait]
impl Validator<AddProduct> for AddProductValidator {
    async fn validate(
        &self,
        request: &AddProduct,
        _token: &CancellationToken,
    ) -> DocPipeResult<Vec<ValidationFailure>> {
        let mut failures = Vec::new();

        if request.name.trim().is_empty() {
            failures.push(ValidationFailure::new("name", "must not be empty"));
        }
        if request.alias.trim().is_empty() {
            failures.push(ValidationFailure::new("alias", "must not be empty"));
        }

        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(alias: &str, name: &str) -> AddProduct {
        AddProduct {
            alias: alias.to_string(),
            name: name.to_string(),
            product_type: ProductType::Deposit,
        }
    }

    #[tokio::test]
    async fn validator_accepts_a_complete_command() {
        let failures = AddProductValidator
            .validate(&command("a1", "Prod1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn validator_rejects_blank_fields() {
        let failures = AddProductValidator
            .validate(&command("  ", ""), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            failures,
            vec![
                ValidationFailure::new("name", "must not be empty"),
                ValidationFailure::new("alias", "must not be empty"),
            ]
        );
    }
}
