//! Integration tests for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: [`StubCatalogServer`] serves the two
//! catalog endpoints from memory on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `http_catalog` - Status and body handling of the REST client
//! - `cart_scenarios` - The store end to end over HTTP and a file slot

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rocket_shoes_cart::CatalogConfig;
use serde_json::{Value, json};
use url::Url;

#[derive(Default)]
struct Catalog {
    products: HashMap<i32, Value>,
    stock: HashMap<i32, u32>,
    failing: bool,
}

#[derive(Clone, Default)]
struct Shared {
    catalog: Arc<Mutex<Catalog>>,
    product_hits: Arc<AtomicUsize>,
    stock_hits: Arc<AtomicUsize>,
}

impl Shared {
    fn with_catalog<T>(&self, f: impl FnOnce(&mut Catalog) -> T) -> T {
        f(&mut self.catalog.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// In-memory catalog API listening on `127.0.0.1`.
///
/// Serves `GET /products/{id}` and `GET /stock/{id}` the way the real API
/// does: JSON bodies, `404` with `{}` for unknown ids. The server task is
/// aborted when the value is dropped.
pub struct StubCatalogServer {
    base_url: Url,
    shared: Shared,
    task: tokio::task::JoinHandle<()>,
}

impl StubCatalogServer {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let shared = Shared::default();

        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub catalog");
        let addr = listener.local_addr().expect("stub catalog address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("stub catalog url");
        Self {
            base_url,
            shared,
            task,
        }
    }

    /// Add a product with the given stock level.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        self.shared.with_catalog(|c| {
            c.products.insert(
                id,
                json!({
                    "id": id,
                    "title": title,
                    "price": price,
                    "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
                }),
            );
            c.stock.insert(id, stock);
        });
    }

    /// Replace the raw body served for a product.
    pub fn set_product_body(&self, id: i32, body: Value) {
        self.shared.with_catalog(|c| {
            c.products.insert(id, body);
        });
    }

    /// Change a product's stock level.
    pub fn set_stock(&self, id: i32, amount: u32) {
        self.shared.with_catalog(|c| {
            c.stock.insert(id, amount);
        });
    }

    /// Make every request fail with `500` until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.shared.with_catalog(|c| c.failing = failing);
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.shared.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `GET /stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.shared.stock_hits.load(Ordering::SeqCst)
    }

    /// Base URL of the server.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Catalog configuration pointing at this server with a short timeout.
    #[must_use]
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            timeout: Duration::from_secs(5),
            ..CatalogConfig::new(self.base_url.clone())
        }
    }
}

impl Drop for StubCatalogServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn product(State(shared): State<Shared>, Path(id): Path<i32>) -> (StatusCode, Json<Value>) {
    shared.product_hits.fetch_add(1, Ordering::SeqCst);
    shared.with_catalog(|c| {
        if c.failing {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
        }
        c.products
            .get(&id)
            .map_or_else(|| (StatusCode::NOT_FOUND, Json(json!({}))), |p| (StatusCode::OK, Json(p.clone())))
    })
}

async fn stock(State(shared): State<Shared>, Path(id): Path<i32>) -> (StatusCode, Json<Value>) {
    shared.stock_hits.fetch_add(1, Ordering::SeqCst);
    shared.with_catalog(|c| {
        if c.failing {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
        }
        c.stock.get(&id).map_or_else(
            || (StatusCode::NOT_FOUND, Json(json!({}))),
            |amount| (StatusCode::OK, Json(json!({ "id": id, "amount": amount }))),
        )
    })
}
