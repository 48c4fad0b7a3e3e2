//! Checkout.
//!
//! Turns the session cart into an order record in the document store:
//! generate an id, write the order, clear the cart, then send the
//! confirmation email in the background.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use yarn_core::{Email, OrderId, OrderStatus};

use super::cart::load_cart;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequestId;
use crate::models::{Customer, Order};
use crate::state::AppState;

/// Longest accepted free-text field.
const MAX_FIELD_LEN: usize = 500;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub notes: Option<String>,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub item_count: u32,
}

/// Trim an optional field, treating blank as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CheckoutRequest {
    /// Validate the customer details.
    fn into_parts(self) -> Result<(Customer, Option<String>)> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }

        let email = Email::parse(&self.email)
            .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

        let customer = Customer {
            name,
            email,
            phone: optional(self.phone),
            organization: optional(self.organization),
        };
        let notes = optional(self.notes);

        let too_long = [
            Some(&customer.name),
            customer.phone.as_ref(),
            customer.organization.as_ref(),
            notes.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|v| v.len() > MAX_FIELD_LEN);
        if too_long {
            return Err(AppError::BadRequest(format!(
                "fields are limited to {MAX_FIELD_LEN} characters"
            )));
        }

        Ok((customer, notes))
    }
}

/// Place an order from the session cart.
///
/// The cart is only cleared once the order is stored, so a failed write
/// leaves it intact for a retry.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let (customer, notes) = request.into_parts()?;

    let mut cart = load_cart(session).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let order_id = state.order_ids().generate().await;
    let mut order = Order::new(order_id, customer, cart.items().to_vec());
    order.notes = notes;

    state.backend().create_order(&order).await?;
    cart.clear().await;

    tracing::info!(order_id = %order.order_id, lines = order.items.len(), "Order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(
            &[
                ("order_id", order.order_id.as_str()),
                ("request_id", request_id.0.as_str()),
            ][..],
        ),
    );

    let response = CheckoutResponse {
        order_id: order.order_id.clone(),
        status: order.status,
        item_count: order.garment_count(),
    };

    if let Some(email) = state.email().cloned() {
        tokio::spawn(async move {
            if let Err(e) = email.send_order_confirmation(&order).await {
                tracing::error!(
                    order_id = %order.order_id,
                    error = %e,
                    "Failed to send order confirmation"
                );
            }
        });
    } else {
        tracing::info!(order_id = %order.order_id, "Email not configured, skipping confirmation");
    }

    Ok((StatusCode::CREATED, Json(response)))
}
