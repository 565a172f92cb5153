use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::credentials::{CredentialError, CredentialProvider, StaticToken, TokenFile};
use crate::catalog::{Executive, FulfillmentRequest, Member, Package, Product, Webinar};
use crate::storage::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),
}

pub const USERS: &str = "users";
pub const EXECUTIVES: &str = "executives";
pub const PRODUCTS: &str = "products";
pub const REQUESTS: &str = "requests";
pub const PACKAGES: &str = "packages";
pub const WEBINARS: &str = "webinars";

/// The backend answers either with a bare array or with `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CollectionResponse<T> {
    Bare(Vec<T>),
    Enveloped { data: Vec<T> },
}

impl<T> CollectionResponse<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            CollectionResponse::Bare(items) => items,
            CollectionResponse::Enveloped { data } => data,
        }
    }
}

/// Mongoose documents with virtuals enabled carry both `_id` and its string
/// copy `id`. Only `_id` is kept so each record has a single identifier.
fn drop_virtual_ids(payload: &mut Value) {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(envelope) => match envelope.get_mut("data") {
            Some(Value::Array(items)) => items,
            _ => return,
        },
        _ => return,
    };

    for item in items {
        if let Value::Object(fields) = item
            && fields.contains_key("_id")
        {
            fields.remove("id");
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<Member>, ApiError>;

    async fn fetch_executives(&self) -> Result<Vec<Executive>, ApiError>;

    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn fetch_requests(&self) -> Result<Vec<FulfillmentRequest>, ApiError>;

    async fn fetch_packages(&self) -> Result<Vec<Package>, ApiError>;

    async fn fetch_webinars(&self) -> Result<Vec<Webinar>, ApiError>;
}

pub struct PortalClient {
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    client: reqwest::Client,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Builds a client from the `[api]` config section. A token supplied
    /// through the environment takes precedence over the token file.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let credentials: Arc<dyn CredentialProvider> = match &config.token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(TokenFile::new(config.token_cache.clone())),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self::new(config.base_url.clone(), credentials).with_http_client(client))
    }

    fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource)
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, ApiError> {
        let token = self.credentials.bearer_token()?;
        let url = self.url_for(resource);

        tracing::info!("Fetching {} from {}", resource, url);

        let response = self.client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("Fetch {} response status: {}", resource, status);

        if status == 401 || status == 403 {
            tracing::error!("Authentication failed when fetching {}", resource);
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Resource not found: {}", url);
            return Err(ApiError::NotFound(resource.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Failed to fetch {}. Status: {}, Body: {}", resource, status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        let mut payload: Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::ParseError(format!("Invalid {} payload: {}", resource, e)))?;
        drop_virtual_ids(&mut payload);

        let collection: CollectionResponse<T> = serde_json::from_value(payload)
            .map_err(|e| ApiError::ParseError(format!("Invalid {} payload: {}", resource, e)))?;
        let items = collection.into_items();

        tracing::info!("Fetched {} {} successfully", items.len(), resource);
        Ok(items)
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn fetch_users(&self) -> Result<Vec<Member>, ApiError> {
        self.fetch_collection(USERS).await
    }

    async fn fetch_executives(&self) -> Result<Vec<Executive>, ApiError> {
        self.fetch_collection(EXECUTIVES).await
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.fetch_collection(PRODUCTS).await
    }

    async fn fetch_requests(&self) -> Result<Vec<FulfillmentRequest>, ApiError> {
        self.fetch_collection(REQUESTS).await
    }

    async fn fetch_packages(&self) -> Result<Vec<Package>, ApiError> {
        self.fetch_collection(PACKAGES).await
    }

    async fn fetch_webinars(&self) -> Result<Vec<Webinar>, ApiError> {
        self.fetch_collection(WEBINARS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoToken;

    impl CredentialProvider for NoToken {
        fn bearer_token(&self) -> Result<String, CredentialError> {
            Err(CredentialError::Missing)
        }
    }

    fn client_for(server: &MockServer) -> PortalClient {
        PortalClient::new(server.uri(), Arc::new(StaticToken::new("secret")))
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = PortalClient::new("http://localhost:5000/api/", Arc::new(StaticToken::new("t")));

        assert_eq!(client.url_for(USERS), "http://localhost:5000/api/users");
    }

    #[tokio::test]
    async fn fetches_bare_array_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packages"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "p1", "name": "Gold", "price": 4999},
                {"_id": "p2", "name": "Silver", "price": 1999, "isActive": false}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let packages = client_for(&server).fetch_packages().await.unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "Gold");
        assert!(!packages[1].is_active);
    }

    #[tokio::test]
    async fn fetches_enveloped_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    {"_id": "r1", "userId": "u1", "totalCoins": 100, "status": "PENDING"},
                    {"_id": "r2", "userId": "u2", "totalCoins": 50, "status": "DELIVERED"}
                ]
            })))
            .mount(&server)
            .await;

        let requests = client_for(&server).fetch_requests().await.unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].total_coins, 50);
    }

    #[tokio::test]
    async fn documents_with_both_id_fields_keep_object_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/webinars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {
                        "_id": "65f1",
                        "id": "65f1",
                        "title": "Weekly Market Review",
                        "date": "2025-03-14T18:00:00Z",
                        "packageId": null
                    }
                ]
            })))
            .mount(&server)
            .await;

        let webinars = client_for(&server).fetch_webinars().await.unwrap();

        assert_eq!(webinars.len(), 1);
        assert_eq!(webinars[0].id, "65f1");
        assert_eq!(webinars[0].package_id, None);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_users().await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_products().await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/executives"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_executives().await;

        match result {
            Err(ApiError::RequestError(message)) => {
                assert!(message.contains("500"));
                assert!(message.contains("database unavailable"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/webinars"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_webinars().await;

        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn missing_credentials_skip_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), Arc::new(NoToken));
        let result = client.fetch_users().await;

        assert!(matches!(result, Err(ApiError::Credentials(CredentialError::Missing))));
    }
}
