//! reqwest implementation of [`RemoteClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{Account, RemoteClient, RemoteError};
use crate::models::{
    CartLine, CatalogItem, ItemDraft, ItemId, ItemRecord, Role, Session, Shop, ShopId,
};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Timeout applied to every request unless overridden.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the marketplace JSON API.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
    user: Account,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: Account,
}

impl HttpRemoteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base_url(&base_url.into()),
            http,
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "remote request");

        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Adds a scheme when missing and drops any trailing slash.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Sends the request and turns non-success statuses into [`RemoteError`]s.
async fn execute(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request
        .send()
        .await
        .map_err(|e| RemoteError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error.or(body.message));
    tracing::debug!(status = status.as_u16(), ?message, "remote request failed");

    Err(RemoteError::from_status(status.as_u16(), message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, RemoteError> {
        let request = self
            .request(Method::POST, "/register", None)
            .json(&json!({ "email": email, "password": password, "role": role }));
        let body: RegisterResponse = decode(execute(request).await?).await?;
        Ok(body.user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let request = self
            .request(Method::POST, "/login", None)
            .json(&json!({ "email": email, "password": password }));
        let body: LoginResponse = decode(execute(request).await?).await?;

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RemoteError::Decode("login response carried no token".to_string()))?;

        Ok(Session::new(token, body.user.email, body.user.role))
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>, RemoteError> {
        let request = self.request(Method::GET, "/items", None);
        decode(execute(request).await?).await
    }

    async fn get_cart(&self, token: &str) -> Result<Vec<CartLine>, RemoteError> {
        let request = self.request(Method::GET, "/cart", Some(token));
        decode(execute(request).await?).await
    }

    async fn add_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let request = self
            .request(Method::POST, "/cart/items", Some(token))
            .json(&json!({ "item_id": item_id, "quantity": quantity }));
        execute(request).await?;
        Ok(())
    }

    async fn update_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let request = self
            .request(Method::PUT, &format!("/cart/items/{}", item_id), Some(token))
            .json(&json!({ "quantity": quantity }));
        execute(request).await?;
        Ok(())
    }

    async fn delete_cart_line(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError> {
        let request = self.request(Method::DELETE, &format!("/cart/items/{}", item_id), Some(token));
        execute(request).await?;
        Ok(())
    }

    async fn list_shops(&self, token: &str) -> Result<Vec<Shop>, RemoteError> {
        let request = self.request(Method::GET, "/shops", Some(token));
        decode(execute(request).await?).await
    }

    async fn create_shop(
        &self,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<Shop, RemoteError> {
        let request = self
            .request(Method::POST, "/shops", Some(token))
            .json(&json!({ "name": name, "description": description }));
        decode(execute(request).await?).await
    }

    async fn delete_shop(&self, token: &str, shop_id: ShopId) -> Result<(), RemoteError> {
        let request = self.request(Method::DELETE, &format!("/shops/{}", shop_id), Some(token));
        execute(request).await?;
        Ok(())
    }

    async fn list_shop_items(
        &self,
        token: &str,
        shop_id: ShopId,
    ) -> Result<Vec<ItemRecord>, RemoteError> {
        let request = self.request(Method::GET, &format!("/shops/{}/items", shop_id), Some(token));
        decode(execute(request).await?).await
    }

    async fn create_item(
        &self,
        token: &str,
        shop_id: ShopId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError> {
        let request = self
            .request(Method::POST, &format!("/shops/{}/items", shop_id), Some(token))
            .json(draft);
        decode(execute(request).await?).await
    }

    async fn update_item(
        &self,
        token: &str,
        item_id: ItemId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError> {
        let request = self
            .request(Method::PUT, &format!("/items/{}", item_id), Some(token))
            .json(draft);
        decode(execute(request).await?).await
    }

    async fn delete_item(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError> {
        let request = self.request(Method::DELETE, &format!("/items/{}", item_id), Some(token));
        execute(request).await?;
        Ok(())
    }
}
