use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        CatalogItem, ItemId, Order, OrderId, OrderStatus, StoreId, StoreProfile, UserId,
        UserSummary,
    },
    checkout::encode_component,
    error::{ApiError, ErrorCode},
    protocol::{
        CheckoutRequest, CheckoutResponse, DashboardView, ItemDraft, ItemField, ItemFilter,
        LoginRequest, MenuEntry, OrderStats, OrderStatusUpdate, PublicStorePage, RegisterRequest,
        SessionResponse, SettingsField, SettingsView, StoreField, UserDraft, UserField, UserStats,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    backend::StorefrontBackend,
    error::{ClientError, Result},
    session::SessionContext,
};

/// [`StorefrontBackend`] over the server's JSON API.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        // A trailing slash keeps a path prefix such as `/api` when joining.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        debug!(%method, %url, "storefront request");
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str, session: &SessionContext) -> Result<RequestBuilder> {
        Ok(self.request(method, path)?.bearer_auth(session.bearer()?))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, session: &SessionContext) -> Result<T> {
        read_json(self.authed(Method::GET, path, session)?.send().await?).await
    }

    async fn patch<B, T>(&self, path: &str, session: &SessionContext, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .authed(Method::PATCH, path, session)?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn post<B, T>(&self, path: &str, session: &SessionContext, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .authed(Method::POST, path, session)?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

/// Non-2xx responses become `ClientError::Api`, keeping the server's
/// `ApiError` body when there is one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        let code = match status.as_u16() {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            400 | 413 | 422 => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        };
        ApiError::new(code, if body.is_empty() { status.to_string() } else { body })
    });
    warn!(status = status.as_u16(), code = ?error.code, message = %error.message, "storefront request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        error,
    })
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    async fn login(&self, req: &LoginRequest) -> Result<SessionResponse> {
        let response = self.request(Method::POST, "/auth/login")?.json(req).send().await?;
        read_json(response).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse> {
        let response = self
            .request(Method::POST, "/auth/register")?
            .json(req)
            .send()
            .await?;
        read_json(response).await
    }

    async fn me(&self, session: &SessionContext) -> Result<UserSummary> {
        self.get("/auth/me", session).await
    }

    async fn menu(&self, session: &SessionContext) -> Result<Vec<MenuEntry>> {
        self.get("/menu", session).await
    }

    async fn dashboard(&self, session: &SessionContext) -> Result<DashboardView> {
        self.get("/dashboard", session).await
    }

    async fn settings(&self, session: &SessionContext) -> Result<SettingsView> {
        self.get("/settings", session).await
    }

    async fn update_settings(
        &self,
        session: &SessionContext,
        fields: &[SettingsField],
    ) -> Result<SettingsView> {
        self.patch("/settings", session, fields).await
    }

    async fn list_stores(&self, session: &SessionContext) -> Result<Vec<StoreProfile>> {
        self.get("/stores", session).await
    }

    async fn update_store(
        &self,
        session: &SessionContext,
        store_id: StoreId,
        fields: &[StoreField],
    ) -> Result<StoreProfile> {
        self.patch(&format!("/stores/{store_id}"), session, fields)
            .await
    }

    async fn list_users(&self, session: &SessionContext) -> Result<Vec<UserSummary>> {
        self.get("/users", session).await
    }

    async fn user_stats(&self, session: &SessionContext) -> Result<UserStats> {
        self.get("/users/stats", session).await
    }

    async fn create_user(&self, session: &SessionContext, draft: &UserDraft) -> Result<UserSummary> {
        self.post("/users", session, draft).await
    }

    async fn update_user(
        &self,
        session: &SessionContext,
        user_id: UserId,
        fields: &[UserField],
    ) -> Result<UserSummary> {
        self.patch(&format!("/users/{user_id}"), session, fields).await
    }

    async fn my_store(&self, session: &SessionContext) -> Result<StoreProfile> {
        self.get("/my/store", session).await
    }

    async fn update_my_store(
        &self,
        session: &SessionContext,
        fields: &[StoreField],
    ) -> Result<StoreProfile> {
        self.patch("/my/store", session, fields).await
    }

    async fn list_items(
        &self,
        session: &SessionContext,
        filter: &ItemFilter,
    ) -> Result<Vec<CatalogItem>> {
        let response = self
            .authed(Method::GET, "/my/items", session)?
            .query(filter)
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_item(&self, session: &SessionContext, draft: &ItemDraft) -> Result<CatalogItem> {
        self.post("/my/items", session, draft).await
    }

    async fn update_item(
        &self,
        session: &SessionContext,
        item_id: ItemId,
        fields: &[ItemField],
    ) -> Result<CatalogItem> {
        self.patch(&format!("/my/items/{item_id}"), session, fields)
            .await
    }

    async fn delete_item(&self, session: &SessionContext, item_id: ItemId) -> Result<()> {
        let response = self
            .authed(Method::DELETE, &format!("/my/items/{item_id}"), session)?
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        session: &SessionContext,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let mut request = self.authed(Method::GET, "/my/orders", session)?;
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        read_json(request.send().await?).await
    }

    async fn order_stats(&self, session: &SessionContext) -> Result<OrderStats> {
        self.get("/my/orders/stats", session).await
    }

    async fn set_order_status(
        &self,
        session: &SessionContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        self.patch(
            &format!("/my/orders/{order_id}/status"),
            session,
            &OrderStatusUpdate { status },
        )
        .await
    }

    async fn public_store(&self, slug: &str) -> Result<PublicStorePage> {
        let path = format!("/public/stores/{}", encode_component(slug));
        read_json(self.request(Method::GET, &path)?.send().await?).await
    }

    async fn checkout(&self, slug: &str, req: &CheckoutRequest) -> Result<CheckoutResponse> {
        let path = format!("/public/stores/{}/checkout", encode_component(slug));
        let response = self.request(Method::POST, &path)?.json(req).send().await?;
        read_json(response).await
    }
}
