//! Order tracking.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use yarn_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::models::Order;
use crate::state::AppState;

/// What a customer sees when tracking an order. Contact details are left
/// out since anyone holding the id can look it up.
#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub is_final: bool,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for TrackingView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            status: order.status,
            is_final: order.status.is_final(),
            item_count: order.garment_count(),
            created_at: order.created_at,
        }
    }
}

/// Look up an order by its public id.
///
/// Malformed ids are rejected before any backend call.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<TrackingView>> {
    let order_id = OrderId::parse(&raw_id)
        .map_err(|e| AppError::BadRequest(format!("invalid order id: {e}")))?;

    let order = state
        .backend()
        .find_order(&order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(Json(TrackingView::from(&order)))
}
