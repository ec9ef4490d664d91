//! Repository contract tests against the in-memory backend.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use docpipe_core::{
    entity::Entity,
    error::DocPipeError,
    filter::{Filter, Sort},
    store::{DocumentStore, DynDocumentStore},
};
use docpipe_memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gadget {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    size: i64,
}

impl Entity for Gadget {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn collection_name() -> &'static str {
        "gadgets"
    }
}

fn gadget(name: &str, size: i64) -> Gadget {
    Gadget { id: None, name: name.to_string(), size }
}

fn store() -> DynDocumentStore {
    DocumentStore::new(MemoryStore::new()).into_dyn()
}

async fn seed(store: &DynDocumentStore, count: i64) {
    let repository = store.repository::<Gadget>();
    for n in 0..count {
        repository.add(gadget(&format!("g{n}"), n)).await.unwrap();
    }
}

#[tokio::test]
async fn add_assigns_an_id_and_round_trips() {
    let store = store();
    let repository = store.repository::<Gadget>();

    let stored = repository.add(gadget("widget", 3)).await.unwrap();
    let id = stored.id.expect("store must assign an id");

    let found = repository.get_by_id(&id.to_hex()).await.unwrap();
    assert_eq!(found, stored);
    assert_eq!(found.name, "widget");
}

#[tokio::test]
async fn get_by_id_distinguishes_malformed_and_missing_ids() {
    let store = store();
    let repository = store.repository::<Gadget>();

    assert!(matches!(
        repository.get_by_id("").await,
        Err(DocPipeError::InvalidArgument(_))
    ));
    assert!(matches!(
        repository.get_by_id("not-hex").await,
        Err(DocPipeError::InvalidArgument(_))
    ));
    assert!(matches!(
        repository.get_by_id(&ObjectId::new().to_hex()).await,
        Err(DocPipeError::NotFound { .. })
    ));
}

#[tokio::test]
async fn get_rejects_an_invalid_window_before_store_access() {
    let store = store();
    let repository = store.repository::<Gadget>();

    assert!(matches!(
        repository.get(Some(0), 0, None, None).await,
        Err(DocPipeError::InvalidArgument(_))
    ));
    assert!(matches!(
        repository.get(Some(-3), 0, None, None).await,
        Err(DocPipeError::InvalidArgument(_))
    ));
    assert!(matches!(
        repository.get(Some(10), -1, None, None).await,
        Err(DocPipeError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn get_returns_at_most_take_items_in_disjoint_windows() {
    let store = store();
    seed(&store, 7).await;
    let repository = store.repository::<Gadget>();

    let first = repository.get(Some(3), 0, None, None).await.unwrap();
    let second = repository.get(Some(3), 3, None, None).await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    for gadget in &second {
        assert!(!first.contains(gadget), "windows must not overlap");
    }

    // Unmodified collection: the two windows are the first six entities in
    // stable order.
    let all = repository.get(None, 0, None, None).await.unwrap();
    let combined: Vec<&Gadget> = first.iter().chain(second.iter()).collect();
    assert_eq!(combined, all.iter().take(6).collect::<Vec<_>>());
}

#[tokio::test]
async fn get_applies_filter_then_sort_then_window() {
    let store = store();
    seed(&store, 10).await;
    let repository = store.repository::<Gadget>();

    let page = repository
        .get(
            Some(2),
            1,
            Some(Filter::gt("size", 4)),
            Some(Sort::desc("size")),
        )
        .await
        .unwrap();

    let sizes: Vec<i64> = page.iter().map(|gadget| gadget.size).collect();
    assert_eq!(sizes, vec![8, 7]);
}

#[tokio::test]
async fn get_without_take_returns_everything_from_skip() {
    let store = store();
    seed(&store, 5).await;
    let repository = store.repository::<Gadget>();

    let tail = repository.get(None, 2, None, None).await.unwrap();

    assert_eq!(tail.len(), 3);
    assert_eq!(tail[0].name, "g2");
}

#[tokio::test]
async fn update_replaces_the_matched_document() {
    let store = store();
    let repository = store.repository::<Gadget>();
    let mut stored = repository.add(gadget("before", 1)).await.unwrap();

    stored.name = "after".to_string();
    assert!(repository.update(&stored).await.unwrap());

    let found = repository
        .get_by_id(&stored.id.unwrap().to_hex())
        .await
        .unwrap();
    assert_eq!(found.name, "after");
}

#[tokio::test]
async fn update_of_a_missing_id_returns_false_and_inserts_nothing() {
    let store = store();
    let repository = store.repository::<Gadget>();

    let mut unsaved = gadget("ghost", 1);
    unsaved.id = Some(ObjectId::new());

    assert!(!repository.update(&unsaved).await.unwrap());
    assert_eq!(repository.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn update_requires_an_assigned_id() {
    let store = store();
    let repository = store.repository::<Gadget>();

    assert!(matches!(
        repository.update(&gadget("no-id", 1)).await,
        Err(DocPipeError::InvalidArgument(_))
    ));
    assert!(matches!(
        repository.delete(&gadget("no-id", 1)).await,
        Err(DocPipeError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn delete_by_id_of_a_missing_id_is_a_noop() {
    let store = store();
    seed(&store, 3).await;
    let repository = store.repository::<Gadget>();

    repository
        .delete_by_id(&ObjectId::new().to_hex())
        .await
        .unwrap();

    assert_eq!(repository.count(None).await.unwrap(), 3);
}

#[tokio::test]
async fn delete_removes_the_entity_by_identity() {
    let store = store();
    let repository = store.repository::<Gadget>();
    let stored = repository.add(gadget("victim", 1)).await.unwrap();

    repository.delete(&stored).await.unwrap();

    assert_eq!(repository.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_matching_and_delete_all_report_removed_counts() {
    let store = store();
    seed(&store, 6).await;
    let repository = store.repository::<Gadget>();

    let removed = repository
        .delete_matching(Filter::gte("size", 4))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repository.count(None).await.unwrap(), 4);

    let remaining = repository.delete_all().await.unwrap();
    assert_eq!(remaining, 4);
    assert_eq!(repository.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn count_and_exists_honor_filters() {
    let store = store();
    seed(&store, 5).await;
    let repository = store.repository::<Gadget>();

    assert_eq!(repository.count(None).await.unwrap(), 5);
    assert_eq!(
        repository.count(Some(Filter::lt("size", 2))).await.unwrap(),
        2
    );
    assert!(repository.exists(Filter::eq("name", "g3")).await.unwrap());
    assert!(!repository.exists(Filter::eq("name", "g9")).await.unwrap());
}

#[tokio::test]
async fn add_many_assigns_distinct_ids_in_order() {
    let store = store();
    let repository = store.repository::<Gadget>();

    let stored = repository
        .add_many(vec![gadget("a", 1), gadget("b", 2), gadget("c", 3)])
        .await
        .unwrap();

    assert_eq!(stored.len(), 3);
    let ids: Vec<ObjectId> = stored.iter().map(|gadget| gadget.id.unwrap()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|pair| pair[0] != pair[1]));

    let all = repository.get(None, 0, None, None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|gadget| gadget.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn update_many_replaces_each_entity_sequentially() {
    let store = store();
    let repository = store.repository::<Gadget>();
    let mut stored = repository
        .add_many(vec![gadget("a", 1), gadget("b", 2)])
        .await
        .unwrap();

    for gadget in &mut stored {
        gadget.size += 10;
    }
    repository.update_many(&stored).await.unwrap();

    let all = repository.get(None, 0, None, None).await.unwrap();
    let sizes: Vec<i64> = all.iter().map(|gadget| gadget.size).collect();
    assert_eq!(sizes, vec![11, 12]);
}
