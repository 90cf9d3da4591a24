//! # Wire Payloads
//!
//! The backend's product payloads are not uniform: one endpoint nests the
//! color as an object, another flattens it into `colorId`/`colorName`; stock
//! comes as `stock` or `quantity`; images as an array or a single URL. The
//! raw types below accept all of them, and [`RawProduct::normalize`] maps
//! them into one `stride-core` shape. Nothing past this module branches on
//! payload shape.
//!
//! ```text
//! { "color": { "id": 3, "name": "Trắng", "code": "#FFF" } } ─┐
//! { "colorId": 3, "colorName": "Trắng", "colorCode": "#FFF" } ├─► VariantAttribute
//! { "color": "Trắng" }                                       ─┘
//!
//! { "stock": 12 } | { "quantity": 12 }                       ───► stock: u32
//! { "images": ["a.jpg"] } | { "images": [{"url": ..}] }
//!   | { "imageUrl": "a.jpg" }                                ───► image_url
//! ```
//!
//! Orders, vouchers and returns go through the same id and number handling:
//! `"id": 12` and `"id": "12"` both become `"12"`, and `9500000.0` is read
//! as 9 500 000 đồng.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use stride_core::voucher::{AccountVoucher, VoucherTerms, VoucherValidation};
use stride_core::{
    DiscountType, Money, Order, OrderItem, OrderStatus, OrderType, PaymentMethod, PaymentStatus,
    Product, ProductStatus, Promotion, PromotionStatus, ReturnItem, ReturnRecord, ReturnStatus,
    Variant, VariantAttribute,
};

// =============================================================================
// Envelope
// =============================================================================

/// Either `{ success?, data, message? }` or the bare payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(default)]
        success: Option<bool>,
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    /// Unwraps the payload. `success: false` on a 2xx is still a rejection.
    pub fn into_data(self, status: u16) -> ClientResult<T> {
        match self {
            Envelope::Wrapped {
                success: Some(false),
                message,
                ..
            } => Err(ClientError::Api {
                status,
                message: message.unwrap_or_else(|| "Request was rejected".to_string()),
            }),
            Envelope::Wrapped { data, .. } => Ok(data),
            Envelope::Bare(data) => Ok(data),
        }
    }
}

/// A list that may come paginated (`{ content: [...] }`) or plain.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Plain(Vec<T>),
    Paged {
        #[serde(alias = "items", alias = "data")]
        content: Vec<T>,
    },
}

impl<T> Page<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Plain(items) => items,
            Page::Paged { content } => content,
        }
    }
}

/// Error body `{ message }`, sometimes under `error`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

// =============================================================================
// Scalars
// =============================================================================

/// Ids arrive as strings or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Numbers arrive as integers or floats (`4750000.0`).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
}

impl RawNumber {
    fn to_i64(self) -> i64 {
        match self {
            RawNumber::Int(n) => n,
            RawNumber::Float(f) => f.round() as i64,
        }
    }
}

/// A count such as a quantity. Negative or oversized counts are malformed.
fn count(value: RawNumber, what: &str) -> ClientResult<u32> {
    let n = value.to_i64();
    u32::try_from(n)
        .map_err(|_| ClientError::InvalidResponse(format!("{} has invalid count {}", what, n)))
}

/// An amount in đồng. Negative amounts are malformed.
fn amount(value: RawNumber, what: &str) -> ClientResult<Money> {
    let n = value.to_i64();
    if n < 0 {
        return Err(ClientError::InvalidResponse(format!(
            "{} has negative amount {}",
            what, n
        )));
    }
    Ok(Money::new(n))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Attributes and Images
// =============================================================================

/// A color or size, nested or as a bare label.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAttribute {
    Label(String),
    Object {
        #[serde(default)]
        id: Option<RawId>,
        #[serde(alias = "value", alias = "label")]
        name: String,
        #[serde(default, alias = "hexCode", alias = "hex")]
        code: Option<String>,
    },
}

impl RawAttribute {
    fn normalize(self) -> VariantAttribute {
        match self {
            RawAttribute::Label(name) => VariantAttribute {
                id: None,
                name,
                code: None,
            },
            RawAttribute::Object { id, name, code } => VariantAttribute {
                id: id.map(RawId::into_string),
                name,
                code,
            },
        }
    }
}

/// Picks the nested attribute, else builds one from the flat fields.
fn attribute(
    nested: Option<RawAttribute>,
    id: Option<RawId>,
    name: Option<String>,
    code: Option<String>,
) -> Option<VariantAttribute> {
    if let Some(nested) = nested {
        return Some(nested.normalize());
    }
    name.map(|name| VariantAttribute {
        id: id.map(RawId::into_string),
        name,
        code,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawImage {
    Url(String),
    Object {
        #[serde(alias = "imageUrl", alias = "src")]
        url: String,
    },
}

impl RawImage {
    fn into_url(self) -> String {
        match self {
            RawImage::Url(url) | RawImage::Object { url } => url,
        }
    }
}

fn first_image(images: Vec<RawImage>, single: Option<String>) -> Option<String> {
    images
        .into_iter()
        .next()
        .map(RawImage::into_url)
        .or(single)
        .filter(|url| !url.is_empty())
}

/// Brand/category as a name or `{ id, name }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Name(String),
    Object {
        #[serde(default)]
        id: Option<RawId>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawRef {
    fn into_name(self) -> Option<String> {
        match self {
            RawRef::Name(name) => Some(name),
            RawRef::Object { name, id } => name.or_else(|| id.map(RawId::into_string)),
        }
    }

    fn into_id(self) -> Option<String> {
        match self {
            RawRef::Name(id) => Some(id),
            RawRef::Object { id, .. } => id.map(RawId::into_string),
        }
    }
}

// =============================================================================
// Product / Variant
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub id: RawId,
    #[serde(default)]
    pub product_id: Option<RawId>,
    #[serde(default, alias = "code")]
    pub sku: Option<String>,
    pub price: RawNumber,
    #[serde(default)]
    pub stock: Option<RawNumber>,
    #[serde(default)]
    pub quantity: Option<RawNumber>,

    #[serde(default)]
    pub color: Option<RawAttribute>,
    #[serde(default)]
    pub color_id: Option<RawId>,
    #[serde(default)]
    pub color_name: Option<String>,
    #[serde(default)]
    pub color_code: Option<String>,

    #[serde(default)]
    pub size: Option<RawAttribute>,
    #[serde(default)]
    pub size_id: Option<RawId>,
    #[serde(default)]
    pub size_name: Option<String>,
    #[serde(default)]
    pub size_code: Option<String>,

    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
}

impl RawVariant {
    /// Maps into a [`Variant`] of `product_id`.
    ///
    /// Negative stock is read as zero; a negative price is a malformed payload.
    pub fn normalize(self, product_id: &str) -> ClientResult<Variant> {
        let id = self.id.into_string();
        let price = self.price.to_i64();
        if price < 0 {
            return Err(ClientError::InvalidResponse(format!(
                "variant {} has negative price {}",
                id, price
            )));
        }

        let stock = self
            .stock
            .or(self.quantity)
            .map(RawNumber::to_i64)
            .unwrap_or(0)
            .clamp(0, i64::from(u32::MAX)) as u32;

        Ok(Variant {
            product_id: self
                .product_id
                .map(RawId::into_string)
                .unwrap_or_else(|| product_id.to_string()),
            sku: self.sku,
            price: Money::new(price),
            stock,
            color: attribute(self.color, self.color_id, self.color_name, self.color_code),
            size: attribute(self.size, self.size_id, self.size_name, self.size_code),
            image_url: first_image(self.images, self.image_url),
            id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: RawId,
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(default, alias = "productCode")]
    pub code: Option<String>,
    #[serde(default)]
    pub brand: Option<RawRef>,
    #[serde(default)]
    pub category: Option<RawRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default, alias = "productDetails", alias = "details")]
    pub variants: Vec<RawVariant>,
}

impl RawProduct {
    /// Maps the payload into a [`Product`] with normalized variants.
    pub fn normalize(self) -> ClientResult<Product> {
        let id = self.id.into_string();
        let variants = self
            .variants
            .into_iter()
            .map(|v| v.normalize(&id))
            .collect::<ClientResult<Vec<_>>>()?;

        let status = match self.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("INACTIVE") => ProductStatus::Inactive,
            _ => ProductStatus::Active,
        };

        Ok(Product {
            name: self.name,
            code: self.code,
            brand: self.brand.and_then(RawRef::into_name),
            category: self.category.and_then(RawRef::into_name),
            status,
            image_url: first_image(self.images, self.image_url),
            variants,
            id,
        })
    }
}

/// Normalizes a whole listing, failing on the first malformed product.
pub fn normalize_products(raw: Vec<RawProduct>) -> ClientResult<Vec<Product>> {
    raw.into_iter().map(RawProduct::normalize).collect()
}

// =============================================================================
// Promotion
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPromotion {
    pub id: RawId,
    #[serde(default, alias = "promotionName")]
    pub name: Option<String>,
    pub status: PromotionStatus,
    #[serde(alias = "type")]
    pub discount_type: DiscountType,
    #[serde(alias = "discountValue")]
    pub value: RawNumber,
    #[serde(default)]
    pub product_ids: Vec<RawId>,
    #[serde(default)]
    pub products: Vec<RawRef>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RawPromotion {
    /// Maps into a [`Promotion`], merging `productIds` and `products[].id`.
    ///
    /// An unparseable date is read as an open bound.
    pub fn normalize(self) -> Promotion {
        let mut product_ids: Vec<String> =
            self.product_ids.into_iter().map(RawId::into_string).collect();
        product_ids.extend(self.products.into_iter().filter_map(RawRef::into_id));

        let id = self.id.into_string();
        Promotion {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            status: self.status,
            discount_type: self.discount_type,
            value: self.value.to_i64(),
            product_ids,
            start_date: self.start_date.as_deref().and_then(parse_date),
            end_date: self.end_date.as_deref().and_then(parse_date),
        }
    }
}

// =============================================================================
// Voucher
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVoucherTerms {
    pub id: RawId,
    pub code: String,
    #[serde(alias = "type")]
    pub discount_type: DiscountType,
    #[serde(alias = "discountValue")]
    pub value: RawNumber,
    #[serde(default, alias = "maxDiscountValue")]
    pub max_discount: Option<RawNumber>,
    #[serde(default, alias = "minOrderAmount")]
    pub min_order_value: Option<RawNumber>,
}

impl RawVoucherTerms {
    pub fn normalize(self) -> ClientResult<VoucherTerms> {
        let what = format!("voucher {}", self.code);
        Ok(VoucherTerms {
            id: self.id.into_string(),
            discount_type: self.discount_type,
            value: self.value.to_i64(),
            max_discount: self.max_discount.map(|m| amount(m, &what)).transpose()?,
            min_order_value: self.min_order_value.map(|m| amount(m, &what)).transpose()?,
            code: self.code,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVoucherValidation {
    pub voucher: RawVoucherTerms,
    #[serde(alias = "discount")]
    pub discount_amount: RawNumber,
}

impl RawVoucherValidation {
    pub fn normalize(self) -> ClientResult<VoucherValidation> {
        let voucher = self.voucher.normalize()?;
        let discount_amount = amount(self.discount_amount, &format!("voucher {}", voucher.code))?;
        Ok(VoucherValidation {
            voucher,
            discount_amount,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountVoucher {
    #[serde(flatten)]
    pub terms: RawVoucherTerms,
    #[serde(default, alias = "voucherName")]
    pub name: Option<String>,
    #[serde(default)]
    pub remaining_uses: Option<RawNumber>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RawAccountVoucher {
    /// A missing name falls back to the code. An unparseable end date is
    /// read as no expiry.
    pub fn normalize(self) -> ClientResult<AccountVoucher> {
        let terms = self.terms.normalize()?;
        let remaining_uses = self
            .remaining_uses
            .map(|n| count(n, &format!("voucher {}", terms.code)))
            .transpose()?;
        Ok(AccountVoucher {
            name: self.name.unwrap_or_else(|| terms.code.clone()),
            remaining_uses,
            end_date: self.end_date.as_deref().and_then(parse_date),
            terms,
        })
    }
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderItem {
    #[serde(alias = "productDetailId")]
    pub variant_id: RawId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: RawNumber,
    pub price: RawNumber,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: RawId,
    #[serde(alias = "orderCode")]
    pub code: RawId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub subtotal: RawNumber,
    #[serde(default)]
    pub discount: Option<RawNumber>,
    pub total: RawNumber,
    #[serde(default, alias = "orderDetails")]
    pub items: Vec<RawOrderItem>,
    pub created_at: String,
}

impl RawOrder {
    /// Maps into an [`Order`]. A missing discount is zero.
    pub fn normalize(self) -> ClientResult<Order> {
        let id = self.id.into_string();
        let what = format!("order {}", id);

        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderItem {
                    variant_id: item.variant_id.into_string(),
                    product_name: item.product_name,
                    quantity: count(item.quantity, &what)?,
                    price: amount(item.price, &what)?,
                })
            })
            .collect::<ClientResult<Vec<_>>>()?;

        let created_at = parse_date(&self.created_at).ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "{} has unreadable createdAt {}",
                what, self.created_at
            ))
        })?;

        Ok(Order {
            code: self.code.into_string(),
            status: self.status,
            payment_status: self.payment_status,
            payment_method: self.payment_method,
            order_type: self.order_type,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            subtotal: amount(self.subtotal, &what)?,
            discount: match self.discount {
                Some(d) => amount(d, &what)?,
                None => Money::zero(),
            },
            total: amount(self.total, &what)?,
            items,
            created_at,
            id,
        })
    }
}

// =============================================================================
// Returns
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReturnItem {
    #[serde(alias = "productDetailId")]
    pub variant_id: RawId,
    pub quantity: RawNumber,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReturnRecord {
    pub id: RawId,
    pub order_id: RawId,
    pub status: ReturnStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub items: Vec<RawReturnItem>,
    pub created_at: String,
}

impl RawReturnRecord {
    pub fn normalize(self) -> ClientResult<ReturnRecord> {
        let id = self.id.into_string();
        let what = format!("return {}", id);

        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(ReturnItem {
                    variant_id: item.variant_id.into_string(),
                    quantity: count(item.quantity, &what)?,
                })
            })
            .collect::<ClientResult<Vec<_>>>()?;

        let created_at = parse_date(&self.created_at).ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "{} has unreadable createdAt {}",
                what, self.created_at
            ))
        })?;

        Ok(ReturnRecord {
            order_id: self.order_id.into_string(),
            status: self.status,
            reason: self.reason,
            items,
            created_at,
            id,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
