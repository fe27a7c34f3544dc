//! Catalog reads.

use reqwest::Method;
use shopfront_core::{Product, ProductId};
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::{ApiClient, ApiError, Envelope};

const PRODUCTS_PATH: &str = "products";

/// Status reported for answers served from the cache.
const CACHED_STATUS: u16 = 200;

impl ApiClient {
    /// List every product in the catalog.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Envelope<Vec<Product>> {
        Envelope::from_result(
            self.fetch_products().await,
            "Products loaded.",
            "Could not load products.",
        )
    }

    /// Get a single product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn find_product(&self, id: ProductId) -> Envelope<Product> {
        Envelope::from_result(
            self.fetch_product(id).await,
            "Product loaded.",
            "Could not load product.",
        )
    }

    async fn fetch_products(&self) -> Result<(u16, Vec<Product>), ApiError> {
        let cache_key = "products".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok((CACHED_STATUS, products));
        }

        let request = self.request(Method::GET, PRODUCTS_PATH)?;
        let (status, products) = self.send_json::<Vec<Product>>(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok((status, products))
    }

    async fn fetch_product(&self, id: ProductId) -> Result<(u16, Product), ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok((CACHED_STATUS, *product));
        }

        let request = self.request(Method::GET, &format!("{PRODUCTS_PATH}/{id}"))?;
        let (status, product) = self.send_json::<Product>(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok((status, product))
    }
}
