//! Read-side requests for the product catalog.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use docpipe_core::{
    error::{DocPipeError, DocPipeResult},
    page::Page,
    request::{Handler, Request},
    store::DynDocumentStore,
    validate::{IdentifiedRequest, PagingRequest},
};

use crate::product::Product;

/// Reads one page of the catalog together with the total product count.
#[derive(Debug, Clone)]
pub struct GetProducts {
    /// Window size; defaults to 10.
    pub page_size: i64,
    /// Zero-based window index; defaults to 0.
    pub page_index: i64,
}

impl Default for GetProducts {
    fn default() -> Self {
        Self { page_size: 10, page_index: 0 }
    }
}

impl Request for GetProducts {
    type Response = Page<Product>;

    fn name() -> &'static str {
        "GetProducts"
    }
}

impl PagingRequest for GetProducts {
    fn page_size(&self) -> i64 {
        self.page_size
    }

    fn page_index(&self) -> i64 {
        self.page_index
    }
}

/// Handler reading a product page plus the collection total.
pub struct GetProductsHandler {
    store: Arc<DynDocumentStore>,
}

impl GetProductsHandler {
    /// Creates the handler over the shared store.
    pub fn new(store: Arc<DynDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetProducts> for GetProductsHandler {
    async fn handle(
        &self,
        request: &GetProducts,
        token: &CancellationToken,
    ) -> DocPipeResult<Page<Product>> {
        let repository = self.store.repository::<Product>();
        let skip = request.page_size * request.page_index;

        let items = token
            .run_until_cancelled(repository.get(Some(request.page_size), skip, None, None))
            .await
            .ok_or(DocPipeError::Cancelled)??;
        let total = token
            .run_until_cancelled(repository.count(None))
            .await
            .ok_or(DocPipeError::Cancelled)??;

        Ok(Page::new(items, total))
    }
}

/// Reads one product by its id.
#[derive(Debug, Clone)]
pub struct GetProduct {
    /// The product id, as a 24-hex-digit string.
    pub id: String,
}

impl Request for GetProduct {
    type Response = Product;

    fn name() -> &'static str {
        "GetProduct"
    }
}

impl IdentifiedRequest for GetProduct {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Handler resolving a [`GetProduct`] point lookup.
pub struct GetProductHandler {
    store: Arc<DynDocumentStore>,
}

impl GetProductHandler {
    /// Creates the handler over the shared store.
    pub fn new(store: Arc<DynDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetProduct> for GetProductHandler {
    async fn handle(
        &self,
        request: &GetProduct,
        token: &CancellationToken,
    ) -> DocPipeResult<Product> {
        let repository = self.store.repository::<Product>();

        token
            .run_until_cancelled(repository.get_by_id(&request.id))
            .await
            .ok_or(DocPipeError::Cancelled)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductType;
    use docpipe_core::store::DocumentStore;
    use docpipe_memory::MemoryStore;

    async fn seeded_store(count: usize) -> Arc<DynDocumentStore> {
        let store = Arc::new(DocumentStore::new(MemoryStore::new()).into_dyn());
        let repository = store.repository::<Product>();
        for n in 0..count {
            repository
                .add(Product::new(format!("a{n}"), format!("Prod{n}"), ProductType::Any))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn get_products_pages_and_reports_the_total() {
        let store = seeded_store(5).await;
        let handler = GetProductsHandler::new(store);

        let page = handler
            .handle(
                &GetProducts { page_size: 2, page_index: 1 },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Prod2", "Prod3"]);
    }

    #[tokio::test]
    async fn get_product_resolves_a_stored_id() {
        let store = seeded_store(1).await;
        let stored = store
            .repository::<Product>()
            .get(None, 0, None, None)
            .await
            .unwrap()
            .remove(0);
        let handler = GetProductHandler::new(store);

        let found = handler
            .handle(
                &GetProduct { id: stored.id.unwrap().to_hex() },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(found, stored);
    }
}
