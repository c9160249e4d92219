//! REST catalog client implementation.
//!
//! Uses `reqwest` for HTTP and caches product bodies with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use rocket_shoes_core::{Product, ProductId, Stock};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{CatalogClient, CatalogError};
use crate::config::CatalogConfig;

/// Body of `GET /stock/{id}`; only `amount` is required.
#[derive(Debug, Deserialize)]
struct StockBody {
    amount: u32,
}

/// Client for the catalog REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: String,
    products: Option<Cache<ProductId, Product>>,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// A zero `product_cache_ttl` disables product caching.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                products,
            }),
        })
    }

    /// GET `{base}/{resource}/{id}` and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, resource: &str, id: ProductId) -> Result<T, CatalogError> {
        let url = format!("{}/{resource}/{id}", self.inner.base_url);
        debug!(%url, "Catalog request");

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e.to_string())
        })
    }
}

impl CatalogClient for HttpCatalog {
    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Product cache hit");
            return Ok(product);
        }

        let product: Product = self.fetch("products", id).await?;
        if product.id != id {
            return Err(CatalogError::Parse(format!(
                "requested product {id}, catalog returned {}",
                product.id
            )));
        }

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let body: StockBody = self.fetch("stock", id).await?;
        Ok(Stock {
            id,
            amount: body.amount,
        })
    }
}
