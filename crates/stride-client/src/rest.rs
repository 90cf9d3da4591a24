//! REST implementation of [`Backend`] over reqwest.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{Backend, ProductFilter};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::wire::{
    normalize_products, Envelope, ErrorBody, Page, RawAccountVoucher, RawOrder, RawProduct,
    RawPromotion, RawReturnRecord, RawVoucherValidation,
};
use stride_core::checkout::CreateOrderRequest;
use stride_core::voucher::{AccountVoucher, VoucherValidation, VoucherValidationRequest};
use stride_core::{
    Order, OrderStatus, Product, ProductStatus, Promotion, PromotionStatus, ReturnRecord,
    ReturnRequest,
};

/// Storefront backend over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        debug!(path = %path, "GET");
        let request = self.authorize(self.client.get(self.url(path)).query(query));
        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        debug!(path = %path, "POST");
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    /// Unwraps the envelope on success; maps the status and `{message}` body
    /// on failure.
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(path = %path, status = status.as_u16(), "Backend rejected request");
            return Err(error_from_body(status, text));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        envelope.into_data(status.as_u16())
    }
}

/// Backend message when the body carries one, otherwise a per-status error.
fn error_from_body(status: StatusCode, text: String) -> ClientError {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
        return ClientError::Api {
            status: status.as_u16(),
            message: body.message,
        };
    }
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        StatusCode::NOT_FOUND => ClientError::NotFound(text),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(text),
        _ => ClientError::Internal(text),
    }
}

fn status_param<S: Serialize>(status: &S) -> Option<String> {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
}

fn filter_query(filter: &ProductFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", filter.page.to_string()),
        ("size", filter.size.to_string()),
    ];
    if let Some(status) = filter.status.as_ref().and_then(status_param::<ProductStatus>) {
        query.push(("status", status));
    }
    if let Some(category) = &filter.category_id {
        query.push(("categoryId", category.clone()));
    }
    query
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate {
    status: OrderStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelBody<'a> {
    reason: Option<&'a str>,
}

#[async_trait]
impl Backend for RestBackend {
    async fn list_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        let page: Page<RawProduct> = self.get("products", &filter_query(filter)).await?;
        normalize_products(page.into_items())
    }

    async fn search_products(
        &self,
        keyword: &str,
        filter: &ProductFilter,
    ) -> ClientResult<Vec<Product>> {
        let mut query = filter_query(filter);
        query.push(("keyword", keyword.to_string()));
        let page: Page<RawProduct> = self.get("products/search", &query).await?;
        normalize_products(page.into_items())
    }

    async fn list_promotions(&self, status: PromotionStatus) -> ClientResult<Vec<Promotion>> {
        let query: Vec<(&str, String)> = status_param(&status)
            .map(|s| vec![("status", s)])
            .unwrap_or_default();
        let page: Page<RawPromotion> = self.get("promotions", &query).await?;
        Ok(page
            .into_items()
            .into_iter()
            .map(RawPromotion::normalize)
            .collect())
    }

    async fn validate_voucher(
        &self,
        request: &VoucherValidationRequest,
    ) -> ClientResult<VoucherValidation> {
        let raw: RawVoucherValidation = self.post("vouchers/validate", request).await?;
        raw.normalize()
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        let raw: RawOrder = self.post("orders", request).await?;
        raw.normalize()
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let raw: RawOrder = self.get(&format!("orders/{}", order_id), &[]).await?;
        raw.normalize()
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        let raw: RawOrder = self
            .post(&format!("orders/{}/status", order_id), &StatusUpdate { status })
            .await?;
        raw.normalize()
    }

    async fn cancel_order(&self, order_id: &str, reason: Option<&str>) -> ClientResult<Order> {
        let raw: RawOrder = self
            .post(&format!("orders/{}/cancel", order_id), &CancelBody { reason })
            .await?;
        raw.normalize()
    }

    async fn list_returns(&self, account_id: &str) -> ClientResult<Vec<ReturnRecord>> {
        let page: Page<RawReturnRecord> = self
            .get("returns", &[("accountId", account_id.to_string())])
            .await?;
        page.into_items()
            .into_iter()
            .map(RawReturnRecord::normalize)
            .collect()
    }

    async fn create_return(&self, request: &ReturnRequest) -> ClientResult<ReturnRecord> {
        let raw: RawReturnRecord = self.post("returns", request).await?;
        raw.normalize()
    }

    async fn list_account_vouchers(&self, account_id: &str) -> ClientResult<Vec<AccountVoucher>> {
        let page: Page<RawAccountVoucher> = self
            .get("vouchers", &[("accountId", account_id.to_string())])
            .await?;
        page.into_items()
            .into_iter()
            .map(RawAccountVoucher::normalize)
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
