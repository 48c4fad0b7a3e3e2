//! Cart route handlers.
//!
//! Each handler builds a [`CartStore`] over the visitor's session, so the
//! session cookie is the only cart identity.

use std::collections::BTreeMap;

use axum::{Json, extract::Path, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;
use yarn_core::{CartItem, CartItemId, CurrencyCode, Price, ProductDescriptor};

use crate::error::{AppError, Result};
use crate::services::{CartStore, KeyValueStorage, SessionStorage};

/// Most garments accepted on one line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Highest unit price accepted, in the currency's standard unit.
const MAX_UNIT_PRICE: i64 = 1_000_000;

/// Cart as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    /// Priced lines only, in the storefront currency. Absent if the sum
    /// cannot be represented.
    pub subtotal: Option<Price>,
    pub subtotal_display: Option<String>,
}

impl<S: KeyValueStorage> From<&CartStore<S>> for CartView {
    fn from(cart: &CartStore<S>) -> Self {
        let subtotal = cart.subtotal(CurrencyCode::default());
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            subtotal,
            subtotal_display: subtotal.as_ref().map(Price::display),
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// Client-chosen line id. Generated when absent.
    pub id: Option<String>,
    pub sector: String,
    pub garment_type: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: Option<Price>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl AddItemRequest {
    /// Validate and turn the request into a line item.
    fn into_item(self) -> Result<CartItem> {
        if !(1..=MAX_LINE_QUANTITY).contains(&self.quantity) {
            return Err(AppError::BadRequest(format!(
                "quantity must be between 1 and {MAX_LINE_QUANTITY}"
            )));
        }
        let price_in_range =
            |p: &Price| p.amount > Decimal::ZERO && p.amount <= Decimal::from(MAX_UNIT_PRICE);
        if !self.unit_price.as_ref().is_none_or(price_in_range) {
            return Err(AppError::BadRequest(format!(
                "unit_price must be positive and at most {MAX_UNIT_PRICE}"
            )));
        }
        for (field, value) in [
            ("sector", &self.sector),
            ("garment_type", &self.garment_type),
            ("size", &self.size),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
        }

        let id = match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => CartItemId::new(id),
            _ => CartItemId::new(Uuid::new_v4().to_string()),
        };

        let mut item = CartItem::new(
            id,
            ProductDescriptor {
                sector: self.sector,
                garment_type: self.garment_type,
                size: self.size,
                quantity: self.quantity,
            },
        );
        item.unit_price = self.unit_price;
        item.metadata = self.metadata;
        Ok(item)
    }
}

/// Load the visitor's cart.
pub(crate) async fn load_cart(session: Session) -> CartStore<SessionStorage> {
    CartStore::load(SessionStorage::new(session)).await
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = load_cart(session).await;
    Json(CartView::from(&cart))
}

/// Add an item.
#[instrument(skip(session, request))]
pub async fn add_item(
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let item = request.into_item()?;

    let mut cart = load_cart(session).await;
    cart.add_item(item).await;

    Ok((StatusCode::CREATED, Json(CartView::from(&cart))))
}

/// Remove an item by id. Removing an absent id succeeds.
#[instrument(skip(session))]
pub async fn remove_item(session: Session, Path(id): Path<String>) -> Json<CartView> {
    let mut cart = load_cart(session).await;
    if !cart.remove_item(&CartItemId::new(id)).await {
        tracing::debug!("Cart item not present, nothing removed");
    }
    Json(CartView::from(&cart))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> StatusCode {
    let mut cart = CartStore::new(SessionStorage::new(session));
    cart.clear().await;
    StatusCode::NO_CONTENT
}
