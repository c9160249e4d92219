//! End-to-end cart scenarios.
//!
//! Drives `CartStore` over the HTTP catalog client and a file-backed slot,
//! the way the CLI runs it.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::Path;

use rocket_shoes_cart::{
    Cart, CartError, CartStore, DEFAULT_STORAGE_KEY, FailureKind, FileSlot, HttpCatalog, Notice,
    PersistenceSlot, ProductId, QueueNotifier, StoreConfig, UpdateProductAmount,
};
use rocket_shoes_integration_tests::StubCatalogServer;

type Store = CartStore<HttpCatalog, FileSlot, QueueNotifier>;

fn open(server: &StubCatalogServer, path: &Path, notifier: &QueueNotifier) -> Store {
    CartStore::new(
        StoreConfig::default(),
        HttpCatalog::new(&server.catalog_config()).unwrap(),
        FileSlot::new(path),
        notifier.clone(),
    )
}

fn persisted(path: &Path) -> Cart {
    let json = FileSlot::new(path).get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&json).unwrap()
}

fn amounts(cart: &Cart) -> Vec<(i32, u32)> {
    cart.iter().map(|p| (p.id.as_i32(), p.amount)).collect()
}

fn set(id: i32, amount: i64) -> UpdateProductAmount {
    UpdateProductAmount {
        product_id: ProductId::new(id),
        amount,
    }
}

struct Fixture {
    server: StubCatalogServer,
    _dir: tempfile::TempDir,
    path: std::path::PathBuf,
    notifier: QueueNotifier,
}

impl Fixture {
    async fn new() -> Self {
        let server = StubCatalogServer::start().await;
        server.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 10);
        server.add_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 139.9, 5);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        Self {
            server,
            _dir: dir,
            path,
            notifier: QueueNotifier::new(),
        }
    }

    fn store(&self) -> Store {
        open(&self.server, &self.path, &self.notifier)
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_add_to_empty_cart() {
    let fx = Fixture::new().await;
    let store = fx.store();

    store.add_product(ProductId::new(1)).await.unwrap();

    let cart = store.cart();
    assert_eq!(amounts(&cart), vec![(1, 1)]);
    assert_eq!(cart.items()[0].title(), Some("Tênis de Caminhada Leve Confortável"));
    assert!(cart.items()[0].image().unwrap().ends_with("tenis1.jpg"));
    assert_eq!(persisted(&fx.path), cart);
    assert!(fx.notifier.is_empty());
}

#[tokio::test]
async fn test_add_again_routes_through_update() {
    let fx = Fixture::new().await;
    fx.server.set_stock(1, 5);
    let store = fx.store();

    store.add_product(ProductId::new(1)).await.unwrap();
    let stock_hits = fx.server.stock_hits();
    store.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    assert_eq!(fx.server.stock_hits(), stock_hits + 1);
    assert_eq!(persisted(&fx.path), store.cart());
}

#[tokio::test]
async fn test_update_beyond_stock_is_rejected() {
    let fx = Fixture::new().await;
    fx.server.set_stock(1, 3);
    let store = fx.store();
    store.add_product(ProductId::new(1)).await.unwrap();
    store.update_product_amount(set(1, 2)).await.unwrap();

    let err = store.update_product_amount(set(1, 10)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::OutOfStock {
            requested: 10,
            available: 3,
            ..
        }
    ));
    assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    assert_eq!(amounts(&persisted(&fx.path)), vec![(1, 2)]);
    assert_eq!(fx.notifier.drain(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_remove_absent_product_is_rejected() {
    let fx = Fixture::new().await;
    let store = fx.store();
    store.add_product(ProductId::new(1)).await.unwrap();

    let err = store.remove_product(ProductId::new(2)).unwrap_err();

    assert_eq!(err.kind(), FailureKind::NotFound);
    assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    assert_eq!(fx.notifier.drain(), vec![Notice::RemoveFailed]);
}

#[tokio::test]
async fn test_remove_keeps_other_entries() {
    let fx = Fixture::new().await;
    let store = fx.store();
    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(2)).await.unwrap();
    store.update_product_amount(set(2, 3)).await.unwrap();

    store.remove_product(ProductId::new(1)).unwrap();

    assert_eq!(amounts(&store.cart()), vec![(2, 3)]);
    assert_eq!(persisted(&fx.path), store.cart());
}

// =============================================================================
// Persistence across sessions
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let fx = Fixture::new().await;
    {
        let store = fx.store();
        store.add_product(ProductId::new(2)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();
        store.update_product_amount(set(2, 4)).await.unwrap();
    }

    let reopened = fx.store();

    assert_eq!(amounts(&reopened.cart()), vec![(2, 4), (1, 1)]);
    assert_eq!(reopened.cart().total_units(), 5);
}

#[tokio::test]
async fn test_corrupt_storage_file_is_recovered() {
    let fx = Fixture::new().await;
    std::fs::write(&fx.path, "{not json").unwrap();
    let store = fx.store();
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    assert_eq!(persisted(&fx.path), store.cart());
    assert!(fx.notifier.is_empty());
    assert_eq!(amounts(&fx.store().cart()), vec![(1, 2)]);
}

#[tokio::test]
async fn test_add_product_with_sparse_display_fields() {
    let fx = Fixture::new().await;
    fx.server
        .set_product_body(3, serde_json::json!({ "id": 3, "title": "Tênis", "price": 99.9 }));
    fx.server.set_stock(3, 2);
    let store = fx.store();

    store.add_product(ProductId::new(3)).await.unwrap();

    let cart = fx.store().cart();
    assert_eq!(amounts(&cart), vec![(3, 1)]);
    assert_eq!(cart.items()[0].image(), None);
}

#[tokio::test]
async fn test_non_positive_update_writes_nothing() {
    let fx = Fixture::new().await;
    let store = fx.store();
    store.add_product(ProductId::new(1)).await.unwrap();
    let before = std::fs::read_to_string(&fx.path).unwrap();
    let stock_hits = fx.server.stock_hits();

    store.update_product_amount(set(1, 0)).await.unwrap();
    store.update_product_amount(set(1, -1)).await.unwrap();

    assert_eq!(std::fs::read_to_string(&fx.path).unwrap(), before);
    assert_eq!(fx.server.stock_hits(), stock_hits);
    assert!(fx.notifier.is_empty());
}

// =============================================================================
// Catalog failures
// =============================================================================

#[tokio::test]
async fn test_catalog_outage_leaves_cart_untouched() {
    let fx = Fixture::new().await;
    let store = fx.store();
    store.add_product(ProductId::new(1)).await.unwrap();
    fx.server.set_failing(true);

    let add = store.add_product(ProductId::new(2)).await.unwrap_err();
    let update = store.update_product_amount(set(1, 2)).await.unwrap_err();

    assert_eq!(add.kind(), FailureKind::Transport);
    assert_eq!(update.kind(), FailureKind::Transport);
    assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    assert_eq!(fx.notifier.drain(), vec![Notice::AddFailed, Notice::UpdateFailed]);
}

#[tokio::test]
async fn test_add_unknown_product_is_rejected() {
    let fx = Fixture::new().await;
    let store = fx.store();

    let err = store.add_product(ProductId::new(404)).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::NotFound);
    assert!(store.cart().is_empty());
    assert!(!fx.path.exists());
    assert_eq!(fx.notifier.drain(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_subscriber_follows_commits() {
    let fx = Fixture::new().await;
    let store = fx.store();
    let mut rx = store.subscribe();

    store.add_product(ProductId::new(1)).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(amounts(&rx.borrow_and_update()), vec![(1, 1)]);

    store.remove_product(ProductId::new(1)).unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_empty());
}
