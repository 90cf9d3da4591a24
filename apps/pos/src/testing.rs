//! Test fixtures: an in-memory [`Backend`] and catalog builders.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use stride_client::{Backend, ClientError, ClientResult, ProductFilter};
use stride_core::checkout::CreateOrderRequest;
use stride_core::voucher::{
    AccountVoucher, VoucherTerms, VoucherValidation, VoucherValidationRequest,
};
use stride_core::{
    CartLine, DiscountType, Money, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
    Product, ProductStatus, Promotion, PromotionStatus, ReturnRecord, ReturnRequest,
    ReturnStatus, Variant, VariantAttribute,
};

/// Backend double that answers from memory and records every call.
#[derive(Default)]
pub(crate) struct FakeBackend {
    products: Vec<Product>,
    promotions: Vec<Promotion>,
    account_vouchers: Vec<AccountVoucher>,
    vouchers: Mutex<HashMap<String, VoucherTerms>>,
    order_rejection: Mutex<Option<String>>,
    order_gate: Mutex<Option<OrderGate>>,
    orders: Mutex<HashMap<String, Order>>,
    submitted: Mutex<Vec<CreateOrderRequest>>,
    returns: Mutex<Vec<ReturnRecord>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        FakeBackend::default()
    }

    pub(crate) fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub(crate) fn with_promotions(mut self, promotions: Vec<Promotion>) -> Self {
        self.promotions = promotions;
        self
    }

    pub(crate) fn with_voucher(self, terms: VoucherTerms) -> Self {
        self.vouchers
            .lock()
            .unwrap()
            .insert(terms.code.clone(), terms);
        self
    }

    pub(crate) fn with_account_vouchers(mut self, vouchers: Vec<AccountVoucher>) -> Self {
        self.account_vouchers = vouchers;
        self
    }

    pub(crate) fn with_order(self, order: Order) -> Self {
        self.orders.lock().unwrap().insert(order.id.clone(), order);
        self
    }

    /// Makes the next `create_order` calls fail with `message`.
    pub(crate) fn reject_orders(&self, message: &str) {
        *self.order_rejection.lock().unwrap() = Some(message.to_string());
    }

    /// Holds every later `create_order` until the gate is opened.
    pub(crate) fn hold_orders(&self) -> OrderGate {
        let gate = OrderGate::default();
        *self.order_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes a voucher code unknown from now on.
    pub(crate) fn revoke_voucher(&self, code: &str) {
        self.vouchers.lock().unwrap().remove(code);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(operation))
            .count()
    }

    pub(crate) fn submitted(&self) -> Vec<CreateOrderRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn order(&self, id: &str) -> Option<Order> {
        self.orders.lock().unwrap().get(id).cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(message: &str) -> ClientError {
        ClientError::Api {
            status: 400,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_products(&self, _filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        self.record("list_products".to_string());
        Ok(self.products.clone())
    }

    async fn search_products(
        &self,
        keyword: &str,
        _filter: &ProductFilter,
    ) -> ClientResult<Vec<Product>> {
        self.record(format!("search_products:{}", keyword));
        let keyword = keyword.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&keyword))
            .cloned()
            .collect())
    }

    async fn list_promotions(&self, _status: PromotionStatus) -> ClientResult<Vec<Promotion>> {
        self.record("list_promotions".to_string());
        Ok(self.promotions.clone())
    }

    async fn validate_voucher(
        &self,
        request: &VoucherValidationRequest,
    ) -> ClientResult<VoucherValidation> {
        self.record(format!("validate_voucher:{}", request.code));
        let terms = self
            .vouchers
            .lock()
            .unwrap()
            .get(&request.code)
            .cloned()
            .ok_or_else(|| Self::rejected("Mã giảm giá không hợp lệ"))?;

        if terms.min_order_value.is_some_and(|min| request.order_value < min) {
            return Err(Self::rejected("Đơn hàng chưa đạt giá trị tối thiểu"));
        }

        Ok(VoucherValidation {
            discount_amount: terms.discount_for(request.order_value),
            voucher: terms,
        })
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        self.record("create_order".to_string());
        let gate = self.order_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.open.notified().await;
        }
        if let Some(message) = self.order_rejection.lock().unwrap().clone() {
            return Err(Self::rejected(&message));
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        let n = submitted.len();

        let order = Order {
            id: format!("o-{}", n),
            code: format!("HD{:04}", n),
            status: OrderStatus::ChoXacNhan,
            payment_status: match request.payment_method {
                PaymentMethod::Cash => PaymentStatus::Paid,
                _ => PaymentStatus::Pending,
            },
            payment_method: request.payment_method,
            order_type: request.order_type,
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            subtotal: request.subtotal,
            discount: request.discount,
            total: request.total,
            items: request
                .items
                .iter()
                .map(|i| OrderItem {
                    variant_id: i.variant_id.clone(),
                    product_name: None,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
            created_at: Utc::now(),
        };
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.record(format!("get_order:{}", order_id));
        self.order(order_id)
            .ok_or_else(|| ClientError::NotFound(order_id.to_string()))
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        self.record(format!("update_order_status:{}", order_id));
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| ClientError::NotFound(order_id.to_string()))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn cancel_order(&self, order_id: &str, _reason: Option<&str>) -> ClientResult<Order> {
        self.record(format!("cancel_order:{}", order_id));
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| ClientError::NotFound(order_id.to_string()))?;
        order.status = OrderStatus::DaHuy;
        Ok(order.clone())
    }

    async fn list_returns(&self, account_id: &str) -> ClientResult<Vec<ReturnRecord>> {
        self.record(format!("list_returns:{}", account_id));
        Ok(self.returns.lock().unwrap().clone())
    }

    async fn create_return(&self, request: &ReturnRequest) -> ClientResult<ReturnRecord> {
        self.record(format!("create_return:{}", request.order_id));
        let mut returns = self.returns.lock().unwrap();
        let record = ReturnRecord {
            id: format!("r-{}", returns.len() + 1),
            order_id: request.order_id.clone(),
            status: ReturnStatus::Pending,
            reason: request.reason.clone(),
            items: request.items.clone(),
            created_at: Utc::now(),
        };
        returns.push(record.clone());
        Ok(record)
    }

    async fn list_account_vouchers(&self, account_id: &str) -> ClientResult<Vec<AccountVoucher>> {
        self.record(format!("list_account_vouchers:{}", account_id));
        Ok(self.account_vouchers.clone())
    }
}

/// Lets a test act while an order request is outstanding.
#[derive(Clone, Default)]
pub(crate) struct OrderGate {
    reached: Arc<Notify>,
    open: Arc<Notify>,
}

impl OrderGate {
    /// Resolves once a `create_order` call is waiting at the gate.
    pub(crate) async fn reached(&self) {
        self.reached.notified().await;
    }

    pub(crate) fn open(&self) {
        self.open.notify_one();
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Cart line in white / size 42.
pub(crate) fn line(
    product: &str,
    variant: &str,
    price: i64,
    quantity: u32,
    stock: u32,
) -> CartLine {
    CartLine {
        product_id: product.to_string(),
        variant_id: variant.to_string(),
        name: format!("Sneaker {}", product),
        price: Money::new(price),
        original_price: None,
        discount_percent: None,
        has_discount: false,
        quantity,
        stock,
        color_name: Some("Trắng".to_string()),
        color_code: Some("#FFFFFF".to_string()),
        size_name: Some("42".to_string()),
        size_code: None,
        image_url: None,
    }
}

/// Product with one variant per `(variant_id, price, stock)`.
pub(crate) fn product(id: &str, name: &str, variants: &[(&str, i64, u32)]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        code: None,
        brand: Some("Stride".to_string()),
        category: None,
        status: ProductStatus::Active,
        image_url: None,
        variants: variants
            .iter()
            .map(|(variant_id, price, stock)| Variant {
                id: variant_id.to_string(),
                product_id: id.to_string(),
                sku: None,
                price: Money::new(*price),
                stock: *stock,
                color: Some(VariantAttribute {
                    id: None,
                    name: "Đen".to_string(),
                    code: Some("#000000".to_string()),
                }),
                size: Some(VariantAttribute {
                    id: None,
                    name: "42".to_string(),
                    code: None,
                }),
                image_url: None,
            })
            .collect(),
    }
}

/// Open-ended active promotion.
pub(crate) fn promotion(
    id: &str,
    product_ids: &[&str],
    discount_type: DiscountType,
    value: i64,
) -> Promotion {
    Promotion {
        id: id.to_string(),
        name: format!("Khuyến mãi {}", id),
        status: PromotionStatus::Active,
        discount_type,
        value,
        product_ids: product_ids.iter().map(|p| p.to_string()).collect(),
        start_date: None,
        end_date: None,
    }
}

pub(crate) fn voucher(
    code: &str,
    discount_type: DiscountType,
    value: i64,
    max_discount: Option<i64>,
) -> VoucherTerms {
    VoucherTerms {
        id: format!("v-{}", code.to_lowercase()),
        code: code.to_string(),
        discount_type,
        value,
        max_discount: max_discount.map(Money::new),
        min_order_value: None,
    }
}

pub(crate) fn order(id: &str, status: OrderStatus, payment_status: PaymentStatus) -> Order {
    Order {
        id: id.to_string(),
        code: format!("HD-{}", id),
        status,
        payment_status,
        payment_method: PaymentMethod::BankTransfer,
        order_type: Default::default(),
        customer_name: None,
        customer_phone: None,
        subtotal: Money::new(1_000_000),
        discount: Money::zero(),
        total: Money::new(1_000_000),
        items: Vec::new(),
        created_at: Utc::now(),
    }
}
