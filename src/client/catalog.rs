//! Catalog API client implementation

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::models::{CategoryRecord, normalize_categories};
use super::{CatalogApi, ListParams, ListRoute, Product, ProductFormData, ProductPage, ProductPatch};
use crate::config::DelayConfig;
use crate::error::{ApiError, ConfigError, Result};

/// Transport timeout for every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest service error text carried into an error message
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the hosted catalog service
pub struct CatalogClient {
    http: HttpClient,
    base_url: Url,
    delay: DelayConfig,
}

impl CatalogClient {
    /// Create a new client against `base_url` (e.g. `https://dummyjson.com`)
    pub fn new(base_url: &str, delay: DelayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let base_url = Url::parse(base_url).map_err(|e| {
            ConfigError::Invalid(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!("Invalid API base URL '{}'", base_url)).into());
        }

        Ok(Self {
            http,
            base_url,
            delay,
        })
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::Invalid(format!("Invalid API base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a successful JSON body
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        debug!("{} -> {}", response.url(), status);

        if status.is_success() {
            let body = response.text().await.map_err(ApiError::from)?;
            return serde_json::from_str(&body).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse {} response: {}", resource, e))
                    .into()
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, &body, resource).into())
    }

    fn check_product(product: Product) -> Result<Product> {
        product.check().map_err(ApiError::InvalidResponse)?;
        Ok(product)
    }
}

/// Map a non-success status to an `ApiError`
fn error_for_status(status: StatusCode, body: &str, resource: &str) -> ApiError {
    let message = service_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(format!("{} ({})", resource, message))
    } else {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Prefer the service's `{"message": ...}` field, else the raw body
fn service_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(parsed.message);
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_products(&self, params: &ListParams) -> Result<ProductPage> {
        let url = match params.route() {
            ListRoute::All => self.endpoint(&["products"])?,
            ListRoute::Search(_) => self.endpoint(&["products", "search"])?,
            ListRoute::Category(category) => self.endpoint(&["products", "category", category])?,
        };

        let request = self
            .http
            .get(url)
            .query(&params.to_query_params(self.delay.read_ms));
        let page: ProductPage = self.execute(request, "product list").await?;

        for product in &page.products {
            product.check().map_err(ApiError::InvalidResponse)?;
        }
        Ok(page)
    }

    async fn get_product(&self, id: u64) -> Result<Product> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let request = self
            .http
            .get(url)
            .query(&[("delay", self.delay.detail_ms)]);

        let product: Product = self.execute(request, &format!("product {}", id)).await?;
        Self::check_product(product)
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["products", "categories"])?;
        let request = self
            .http
            .get(url)
            .query(&[("delay", self.delay.detail_ms)]);

        let records: Vec<CategoryRecord> = self.execute(request, "category list").await?;
        Ok(normalize_categories(records))
    }

    async fn create_product(&self, form: &ProductFormData) -> Result<Product> {
        form.validate()?;

        let url = self.endpoint(&["products", "add"])?;
        let request = self
            .http
            .post(url)
            .query(&[("delay", self.delay.write_ms)])
            .json(form);

        let product: Product = self.execute(request, "new product").await?;
        Self::check_product(product)
    }

    async fn update_product(&self, id: u64, patch: &ProductPatch) -> Result<Product> {
        patch.validate()?;

        let url = self.endpoint(&["products", &id.to_string()])?;
        let request = self
            .http
            .put(url)
            .query(&[("delay", self.delay.write_ms)])
            .json(patch);

        let product: Product = self.execute(request, &format!("product {}", id)).await?;
        Self::check_product(product)
    }

    async fn delete_product(&self, id: u64) -> Result<Product> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let request = self
            .http
            .delete(url)
            .query(&[("delay", self.delay.write_ms)]);

        // The service may echo extra fields (isDeleted, deletedOn); only the
        // product shape is kept.
        let product: Product = self.execute(request, &format!("product {}", id)).await?;
        Self::check_product(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> CatalogClient {
        CatalogClient::new(&server.url(), DelayConfig::uniform(0)).unwrap()
    }

    const PAGE_BODY: &str = r#"{
        "products": [
            {"id": 1, "title": "Essence Mascara", "description": "d", "category": "beauty",
             "price": 9.99, "stock": 5, "brand": "Essence", "thumbnail": "t", "rating": 4.9}
        ],
        "total": 25, "skip": 0, "limit": 10
    }"#;

    #[test]
    fn test_client_creation() {
        assert!(CatalogClient::new("https://dummyjson.com", DelayConfig::default()).is_ok());
        assert!(CatalogClient::new("not a url", DelayConfig::default()).is_err());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = CatalogClient::new("http://localhost/api/", DelayConfig::default()).unwrap();
        let url = client
            .endpoint(&["products", "category", "home decoration"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/api/products/category/home%20decoration"
        );
    }

    #[test]
    fn test_error_for_status_prefers_service_message() {
        let err = error_for_status(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Invalid price"}"#,
            "new product",
        );
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                message: "Invalid price".to_string()
            }
        );

        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "", "product list");
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: "Internal Server Error".to_string()
            }
        );

        let err = error_for_status(StatusCode::NOT_FOUND, "", "product 9");
        assert!(matches!(err, ApiError::NotFound(msg) if msg.contains("product 9")));
    }

    #[tokio::test]
    async fn test_list_products_plain() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "10".into()),
                Matcher::UrlEncoded("skip".into(), "0".into()),
                Matcher::UrlEncoded("delay".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let page = client_for(&server)
            .list_products(&ListParams::new(10))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.products[0].brand.as_deref(), Some("Essence"));
    }

    #[tokio::test]
    async fn test_list_products_search_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "mascara".into()),
                Matcher::UrlEncoded("skip".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let params = ListParams::new(10)
            .skip(10)
            .search("mascara")
            .category("ignored");
        client_for(&server).list_products(&params).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_products_category_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/category/laptops")
            .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
            .with_status(200)
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let params = ListParams::new(5).category("laptops");
        client_for(&server).list_products(&params).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_products_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"products": []}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .list_products(&ListParams::new(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/9999")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Product with id '9999' not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_product(9999).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::NotFound(msg)) if msg.contains("9999")));
    }

    #[tokio::test]
    async fn test_list_categories_objects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/categories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"slug": "beauty", "name": "Beauty", "url": "u"}, "laptops"]"#)
            .create_async()
            .await;

        let categories = client_for(&server).list_categories().await.unwrap();
        assert_eq!(categories, vec!["beauty", "laptops"]);
    }

    #[tokio::test]
    async fn test_create_product_rejects_invalid_form_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/products/add")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let form = ProductFormData {
            title: "Lamp".to_string(),
            description: "Bright".to_string(),
            category: "lighting".to_string(),
            price: -1.0,
            stock: 3,
            brand: None,
        };
        let err = client_for(&server).create_product(&form).await.unwrap_err();

        mock.assert_async().await;
        match err {
            Error::Validation(v) => assert!(v.message_for("price").is_some()),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_product_sends_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/products/add")
            .match_query(Matcher::UrlEncoded("delay".into(), "0".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "title": "Lamp",
                "price": 24.5,
                "stock": 3
            })))
            .with_status(201)
            .with_body(r#"{"id": 195, "title": "Lamp", "price": 24.5, "stock": 3}"#)
            .create_async()
            .await;

        let form = ProductFormData {
            title: "Lamp".to_string(),
            description: "Bright".to_string(),
            category: "lighting".to_string(),
            price: 24.5,
            stock: 3,
            brand: None,
        };
        let created = client_for(&server).create_product(&form).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, 195);
    }

    #[tokio::test]
    async fn test_update_product_sends_only_patch_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/products/7")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(serde_json::json!({ "price": 12.0 })))
            .with_status(200)
            .with_body(r#"{"id": 7, "title": "Mascara", "price": 12.0}"#)
            .create_async()
            .await;

        let patch = ProductPatch {
            price: Some(12.0),
            ..Default::default()
        };
        let updated = client_for(&server).update_product(7, &patch).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated.price, 12.0);
    }

    #[tokio::test]
    async fn test_delete_product_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/products/7")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = client_for(&server).delete_product(7).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Status { status: 503, ref message }) if message == "upstream unavailable"
        ));
    }

    #[tokio::test]
    async fn test_delete_product_rejects_negative_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/products/7")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"id": 7, "title": "Desk Lamp", "description": "", "category": "lighting",
                    "price": -1, "stock": 2, "isDeleted": true}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server).delete_product(7).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(msg)) if msg.contains("price")));
    }

    #[tokio::test]
    async fn test_network_error() {
        // Nothing listens on port 9 locally
        let client = CatalogClient::new("http://127.0.0.1:9", DelayConfig::uniform(0)).unwrap();
        let err = client.get_product(1).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Network(_))));
    }
}
