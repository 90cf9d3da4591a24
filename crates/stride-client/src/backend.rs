//! # Backend Trait
//!
//! The logical operations the POS needs from the storefront backend.
//!
//! ## Operations
//! ```text
//! ┌───────────────────────────┬─────────────────────────────────────────┐
//! │ Operation                 │ HTTP (RestBackend)                      │
//! ├───────────────────────────┼─────────────────────────────────────────┤
//! │ list_products             │ GET  products?status&categoryId&page    │
//! │ search_products           │ GET  products/search?keyword&...        │
//! │ list_promotions           │ GET  promotions?status=ACTIVE           │
//! │ validate_voucher          │ POST vouchers/validate                  │
//! │ create_order              │ POST orders                             │
//! │ get_order                 │ GET  orders/{id}                        │
//! │ update_order_status       │ POST orders/{id}/status                 │
//! │ cancel_order              │ POST orders/{id}/cancel                 │
//! │ list_returns              │ GET  returns?accountId                  │
//! │ create_return             │ POST returns                            │
//! │ list_account_vouchers     │ GET  vouchers?accountId                 │
//! └───────────────────────────┴─────────────────────────────────────────┘
//! ```
//!
//! Callers get normalized `stride-core` types back; payload shapes never
//! leak past this trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ClientResult;
use stride_core::checkout::CreateOrderRequest;
use stride_core::voucher::{AccountVoucher, VoucherValidation, VoucherValidationRequest};
use stride_core::{
    Order, OrderStatus, Product, ProductStatus, Promotion, PromotionStatus, ReturnRecord,
    ReturnRequest,
};

/// Filters for product listing and search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub category_id: Option<String>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            status: Some(ProductStatus::Active),
            category_id: None,
            page: 0,
            size: 50,
        }
    }
}

impl ProductFilter {
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// The storefront backend as the POS sees it.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>>;

    async fn search_products(
        &self,
        keyword: &str,
        filter: &ProductFilter,
    ) -> ClientResult<Vec<Product>>;

    async fn list_promotions(&self, status: PromotionStatus) -> ClientResult<Vec<Promotion>>;

    /// Validates a voucher code against an order value.
    async fn validate_voucher(
        &self,
        request: &VoucherValidationRequest,
    ) -> ClientResult<VoucherValidation>;

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order>;

    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;

    async fn update_order_status(&self, order_id: &str, status: OrderStatus)
        -> ClientResult<Order>;

    async fn cancel_order(&self, order_id: &str, reason: Option<&str>) -> ClientResult<Order>;

    async fn list_returns(&self, account_id: &str) -> ClientResult<Vec<ReturnRecord>>;

    async fn create_return(&self, request: &ReturnRequest) -> ClientResult<ReturnRecord>;

    async fn list_account_vouchers(&self, account_id: &str) -> ClientResult<Vec<AccountVoucher>>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn list_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        (**self).list_products(filter).await
    }

    async fn search_products(
        &self,
        keyword: &str,
        filter: &ProductFilter,
    ) -> ClientResult<Vec<Product>> {
        (**self).search_products(keyword, filter).await
    }

    async fn list_promotions(&self, status: PromotionStatus) -> ClientResult<Vec<Promotion>> {
        (**self).list_promotions(status).await
    }

    async fn validate_voucher(
        &self,
        request: &VoucherValidationRequest,
    ) -> ClientResult<VoucherValidation> {
        (**self).validate_voucher(request).await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        (**self).create_order(request).await
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        (**self).get_order(order_id).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        (**self).update_order_status(order_id, status).await
    }

    async fn cancel_order(&self, order_id: &str, reason: Option<&str>) -> ClientResult<Order> {
        (**self).cancel_order(order_id, reason).await
    }

    async fn list_returns(&self, account_id: &str) -> ClientResult<Vec<ReturnRecord>> {
        (**self).list_returns(account_id).await
    }

    async fn create_return(&self, request: &ReturnRequest) -> ClientResult<ReturnRecord> {
        (**self).create_return(request).await
    }

    async fn list_account_vouchers(&self, account_id: &str) -> ClientResult<Vec<AccountVoucher>> {
        (**self).list_account_vouchers(account_id).await
    }
}
