//! # Catalog Commands
//!
//! Product grid on the left of the POS screen: products and running
//! promotions from the backend, priced per variant.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Load                                         │
//! │                                                                         │
//! │  keyword? ──► GET products/search ──┐                                  │
//! │  none     ──► GET products ─────────┤                                  │
//! │                                     ├──► Catalog ──► entries()         │
//! │  GET promotions?status=ACTIVE ──────┘        │      (one per variant)  │
//! │                                              ▼                          │
//! │                              add_catalog_variant(product, variant)     │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                         CartLine at the effective price ──► cart       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use stride_client::{Backend, ProductFilter};
use stride_core::pricing::{active_promotions, effective_price, EffectivePrice};
use stride_core::validation::{validate_quantity, validate_search_query};
use stride_core::{CartLine, Money, Product, Promotion, PromotionStatus, Variant};

use super::cart::{add_to_cart, CartView};
use crate::error::ApiError;
use crate::state::SessionState;

/// One sellable variant as the grid shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub product_id: String,
    pub variant_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub image_url: Option<String>,
    pub base_price: Money,
    pub pricing: EffectivePrice,
    pub stock: u32,
    pub in_stock: bool,
}

/// Products and promotions fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub products: Vec<Product>,
    /// Promotions that were running at `loaded_at`, in backend order.
    pub promotions: Vec<Promotion>,
    pub loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, promotions: &[Promotion], now: DateTime<Utc>) -> Self {
        Catalog {
            products,
            promotions: active_promotions(promotions, now),
            loaded_at: now,
        }
    }

    /// Effective price of a variant. First matching promotion wins.
    pub fn price_of(&self, product: &Product, variant: &Variant) -> EffectivePrice {
        effective_price(variant.price, &product.id, &self.promotions)
    }

    pub fn find(&self, product_id: &str, variant_id: &str) -> Option<(&Product, &Variant)> {
        let product = self.products.iter().find(|p| p.id == product_id)?;
        let variant = product.variant(variant_id)?;
        Some((product, variant))
    }

    /// One entry per variant, products in backend order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.products
            .iter()
            .flat_map(|product| {
                product.variants.iter().map(move |variant| CatalogEntry {
                    product_id: product.id.clone(),
                    variant_id: variant.id.clone(),
                    name: product.name.clone(),
                    brand: product.brand.clone(),
                    sku: variant.sku.clone(),
                    color: variant.color.as_ref().map(|c| c.name.clone()),
                    size: variant.size.as_ref().map(|s| s.name.clone()),
                    image_url: variant
                        .image_url
                        .clone()
                        .or_else(|| product.image_url.clone()),
                    base_price: variant.price,
                    pricing: self.price_of(product, variant),
                    stock: variant.stock,
                    in_stock: variant.stock > 0,
                })
            })
            .collect()
    }
}

/// Fetches products (listing or keyword search) and running promotions.
///
/// An empty or blank keyword returns the regular listing.
pub async fn load_catalog<B: Backend + ?Sized>(
    backend: &B,
    filter: &ProductFilter,
    keyword: Option<&str>,
) -> Result<Catalog, ApiError> {
    let keyword = keyword.map(validate_search_query).transpose()?;
    debug!(keyword = ?keyword, page = filter.page, "load_catalog command");

    let products = match keyword.as_deref() {
        Some(q) if !q.is_empty() => backend.search_products(q, filter).await?,
        _ => backend.list_products(filter).await?,
    };
    let promotions = backend.list_promotions(PromotionStatus::Active).await?;

    let catalog = Catalog::new(products, &promotions, Utc::now());
    info!(
        products = catalog.products.len(),
        promotions = catalog.promotions.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Adds a catalog variant to the current cart at its effective price.
///
/// ## Errors
/// - `VALIDATION_ERROR`: quantity not in `1..=9999`
/// - `NOT_FOUND`: the variant is not in `catalog`
/// - `INSUFFICIENT_STOCK`: more than the variant's stock
pub async fn add_catalog_variant(
    session: &SessionState,
    catalog: &Catalog,
    product_id: &str,
    variant_id: &str,
    quantity: i64,
) -> Result<CartView, ApiError> {
    let quantity = validate_quantity(quantity)?;

    let (product, variant) = catalog
        .find(product_id, variant_id)
        .ok_or_else(|| ApiError::not_found("Variant", variant_id))?;

    let pricing = catalog.price_of(product, variant);
    let line = CartLine::from_variant(product, variant, &pricing, quantity);
    add_to_cart(session, line).await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{product, promotion, FakeBackend};
    use chrono::Duration;
    use stride_core::DiscountType;

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_products(vec![
                product("p1", "Air Runner", &[("v1", 2_000_000, 3), ("v2", 2_000_000, 0)]),
                product("p2", "Court Classic", &[("v3", 1_500_000, 10)]),
            ])
            .with_promotions(vec![
                promotion("km1", &["p1"], DiscountType::Percentage, 20),
                promotion("km2", &["p1"], DiscountType::FixedAmount, 900_000),
            ])
    }

    #[tokio::test]
    async fn test_entries_carry_effective_prices() {
        let backend = backend();
        let catalog = load_catalog(&backend, &ProductFilter::default(), None)
            .await
            .unwrap();

        let entries = catalog.entries();
        assert_eq!(entries.len(), 3);

        // First matching promotion wins: 20% rather than 900.000
        let runner = &entries[0];
        assert_eq!(runner.pricing.price, Money::new(1_600_000));
        assert_eq!(runner.pricing.original_price, Some(Money::new(2_000_000)));
        assert_eq!(runner.pricing.discount_percent, Some(20));
        assert!(runner.in_stock);
        assert!(!entries[1].in_stock);

        let court = &entries[2];
        assert_eq!(court.pricing.price, Money::new(1_500_000));
        assert!(!court.pricing.has_discount);

        assert_eq!(backend.calls(), vec!["list_products", "list_promotions"]);
    }

    #[tokio::test]
    async fn test_keyword_uses_search() {
        let backend = backend();
        let catalog = load_catalog(&backend, &ProductFilter::default(), Some("  court "))
            .await
            .unwrap();

        assert_eq!(catalog.products.len(), 1);
        assert_eq!(backend.call_count("search_products"), 1);

        // Blank keyword falls back to the listing
        load_catalog(&backend, &ProductFilter::default(), Some("  "))
            .await
            .unwrap();
        assert_eq!(backend.call_count("list_products"), 1);
    }

    #[test]
    fn test_expired_promotions_dropped() {
        let now = Utc::now();
        let mut expired = promotion("km-old", &["p2"], DiscountType::Percentage, 50);
        expired.end_date = Some(now - Duration::days(1));

        let catalog = Catalog::new(
            vec![product("p2", "Court Classic", &[("v3", 1_500_000, 10)])],
            &[expired],
            now,
        );
        assert!(catalog.promotions.is_empty());
        assert_eq!(catalog.entries()[0].pricing.price, Money::new(1_500_000));
    }

    #[tokio::test]
    async fn test_add_catalog_variant() {
        let backend = backend();
        let catalog = load_catalog(&backend, &ProductFilter::default(), None)
            .await
            .unwrap();
        let session = SessionState::new();

        let view = add_catalog_variant(&session, &catalog, "p1", "v1", 2)
            .await
            .unwrap();
        let line = &view.lines[0];
        assert_eq!(line.price, Money::new(1_600_000));
        assert_eq!(line.original_price, Some(Money::new(2_000_000)));
        assert!(line.has_discount);
        assert_eq!(line.stock, 3);
        assert_eq!(view.totals.subtotal, Money::new(3_200_000));

        let err = add_catalog_variant(&session, &catalog, "p1", "v1", 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = add_catalog_variant(&session, &catalog, "p1", "v2", 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = add_catalog_variant(&session, &catalog, "p1", "v9", 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = add_catalog_variant(&session, &catalog, "p2", "v3", 0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
