//! Orders resource handlers.
//!
//! Thin pass-through over [`OrderService`](crate::services::OrderService):
//! parameters are checked here, everything else is the repository's job.
//! Failures are reported with the `{Code, Details, Message}` fault body.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::AppState;
use crate::config::{
    CODE_BAD_REQUEST, CODE_INTERNAL, CODE_NO_CONTENT, CODE_SUCCESS, MIN_ORDER_STAFF_ID,
};
use crate::infra::Order;
use crate::services::OrderFilter;
use crate::types::{Fault, PageRequest, Success};

const DETAILS_GET: &str = "Order Controller - Get Operation";
const DETAILS_POST: &str = "Order Controller - POST Operation";
const DETAILS_PUT: &str = "Order Controller - Update Operation";
const DETAILS_DELETE: &str = "Order Controller - Delete Operation";

const MSG_EMPTY_PARAMETERS: &str = "Resource received empty parameters.";
const MSG_INCOMPLETE_PARAMETERS: &str = "Resource received incomplete parameters.";

/// Code returned when a write arrives without a readable body
const CODE_MISSING_BODY: &str = "1002";

/// Paging parameters for `GET /orders/paged`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub descending: bool,
}

impl PageQuery {
    fn request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page_number),
            self.page_size.unwrap_or(defaults.page_size),
        )
    }
}

/// Create orders routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order).put(update_order))
        .route("/paged", get(list_orders_paged))
        .route("/count", get(count_orders))
        .route("/:id", get(get_order).delete(delete_order))
}

fn bad_request(details: &str, code: &str, message: &str) -> Response {
    Fault::new(code, details, message).with_status(StatusCode::BAD_REQUEST)
}

fn internal_error(details: &str, message: String) -> Response {
    Fault::new(CODE_INTERNAL, details, message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

fn no_content(details: &str, message: &str) -> Response {
    Fault::new(CODE_NO_CONTENT, details, message).with_status(StatusCode::NO_CONTENT)
}

/// List orders, optionally filtered by customer, store or status
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Response {
    match state.order_service.list_orders(filter).await {
        Ok(orders) if orders.is_empty() => no_content(DETAILS_GET, "No orders saved on db."),
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Listing orders failed");
            state.fault_mapping.respond(e.to_string())
        }
    }
}

/// One page of orders by order date
pub async fn list_orders_paged(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
    Query(paging): Query<PageQuery>,
) -> Response {
    let request = paging.request();
    match state
        .order_service
        .list_orders_paged(filter, request, paging.descending)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Paging orders failed");
            state.fault_mapping.respond(e.to_string())
        }
    }
}

pub async fn count_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Response {
    match state.order_service.count_orders(filter).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "count": count }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Counting orders failed");
            state.fault_mapping.respond(e.to_string())
        }
    }
}

/// Get one order by id
pub async fn get_order(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    if id <= 0 {
        return bad_request(DETAILS_GET, CODE_BAD_REQUEST, MSG_EMPTY_PARAMETERS);
    }

    match state.order_service.get_order(id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => no_content(DETAILS_GET, "No order with id saved on db."),
        Err(e) => internal_error(DETAILS_GET, e.to_string()),
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Option<Json<Order>>,
) -> Response {
    let Some(Json(order)) = payload else {
        return bad_request(DETAILS_POST, CODE_MISSING_BODY, MSG_EMPTY_PARAMETERS);
    };
    if order.staff_id <= MIN_ORDER_STAFF_ID {
        return bad_request(DETAILS_POST, CODE_BAD_REQUEST, MSG_INCOMPLETE_PARAMETERS);
    }

    match state.order_service.create_order(order).await {
        Ok(_) => Success::new(CODE_SUCCESS, DETAILS_POST, "New order added successfully.")
            .into_response(),
        Err(e) => internal_error(DETAILS_POST, e.to_string()),
    }
}

pub async fn update_order(
    State(state): State<AppState>,
    payload: Option<Json<Order>>,
) -> Response {
    let Some(Json(order)) = payload else {
        return bad_request(DETAILS_PUT, CODE_BAD_REQUEST, MSG_EMPTY_PARAMETERS);
    };
    if order.order_id <= 0 {
        return bad_request(DETAILS_PUT, CODE_BAD_REQUEST, MSG_EMPTY_PARAMETERS);
    }
    if order.staff_id <= MIN_ORDER_STAFF_ID {
        return bad_request(DETAILS_PUT, CODE_BAD_REQUEST, MSG_INCOMPLETE_PARAMETERS);
    }

    match state.order_service.update_order(order).await {
        Ok(()) => Success::new(CODE_SUCCESS, DETAILS_PUT, "Order updated successfully.")
            .into_response(),
        Err(e) => internal_error(DETAILS_PUT, e.to_string()),
    }
}

pub async fn delete_order(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    if id <= 0 {
        return bad_request(DETAILS_DELETE, CODE_BAD_REQUEST, MSG_EMPTY_PARAMETERS);
    }

    match state.order_service.delete_order(id).await {
        Ok(true) => Success::new(CODE_SUCCESS, DETAILS_DELETE, "Order deleted successfully.")
            .into_response(),
        Ok(false) => no_content(DETAILS_DELETE, "No order with id saved on db."),
        Err(e) => internal_error(DETAILS_DELETE, e.to_string()),
    }
}
