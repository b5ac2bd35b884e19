//! Integration tests for the orders endpoints.
//!
//! These tests use a mock order service to drive the router without a
//! database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use mockall::mock;
use mockall::predicate::eq;
use tower::ServiceExt;

use rest_data_access::api::{create_router, AppState};
use rest_data_access::errors::{AppError, AppResult, ValidationFailure};
use rest_data_access::infra::Order;
use rest_data_access::services::{OrderFilter, OrderService};
use rest_data_access::types::{FaultMapping, Page, PageRequest};

// =============================================================================
// Mock service and request helpers
// =============================================================================

mock! {
    Orders {}

    #[async_trait]
    impl OrderService for Orders {
        async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>>;
        async fn list_orders_paged(
            &self,
            filter: OrderFilter,
            page: PageRequest,
            newest_first: bool,
        ) -> AppResult<Page<Order>>;
        async fn count_orders(&self, filter: OrderFilter) -> AppResult<u64>;
        async fn get_order(&self, id: i32) -> AppResult<Option<Order>>;
        async fn create_order(&self, order: Order) -> AppResult<Order>;
        async fn update_order(&self, order: Order) -> AppResult<()>;
        async fn delete_order(&self, id: i32) -> AppResult<bool>;
    }
}

fn order(order_id: i32, staff_id: i32) -> Order {
    Order {
        order_id,
        customer_id: Some(7),
        order_status: 1,
        order_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        required_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
        shipped_date: None,
        store_id: 1,
        staff_id,
    }
}

fn app(mock: MockOrders, mapping: FaultMapping) -> Router {
    create_router(AppState::new(Arc::new(mock), mapping))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, body: &Order) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_returns_orders() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders()
        .with(eq(OrderFilter::default()))
        .returning(|_| Ok(vec![order(1, 3), order(2, 3)]));

    let (status, body) = send(app(mock, FaultMapping::default()), get("/orders")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn list_passes_filter_through() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders()
        .with(eq(OrderFilter {
            customer_id: None,
            store_id: Some(2),
            order_status: Some(4),
        }))
        .returning(|_| Ok(vec![order(9, 3)]));

    let (status, _) = send(
        app(mock, FaultMapping::default()),
        get("/orders?store_id=2&order_status=4"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_list_is_no_content() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders().returning(|_| Ok(vec![]));

    let (status, _) = send(app(mock, FaultMapping::default()), get("/orders")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn list_failure_uses_configured_mapping() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders()
        .returning(|_| Err(AppError::internal("store unreachable")));

    let (status, body) = send(app(mock, FaultMapping::NotFound), get("/orders")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["Code"], "E4004");
    assert_eq!(body["Details"], "Catch - NotFound");
}

#[tokio::test]
async fn list_failure_defaults_to_conflict() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders()
        .returning(|_| Err(AppError::internal("store unreachable")));

    let (status, body) = send(app(mock, FaultMapping::default()), get("/orders")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["Code"], "E4009");
}

// =============================================================================
// Paging and counting
// =============================================================================

#[tokio::test]
async fn paged_reads_query_parameters() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders_paged()
        .with(eq(OrderFilter::default()), eq(PageRequest::new(2, 5)), eq(true))
        .returning(|_, request, _| {
            let window = request.window(5, 12);
            Ok(Page::new(vec![order(6, 3)], window, 12))
        });

    let (status, body) = send(
        app(mock, FaultMapping::default()),
        get("/orders/paged?page=2&page_size=5&descending=true"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_row_count"], 12);
    assert_eq!(body["page_number"], 2);
}

#[tokio::test]
async fn paged_defaults_when_parameters_missing() {
    let mut mock = MockOrders::new();
    mock.expect_list_orders_paged()
        .with(eq(OrderFilter::default()), eq(PageRequest::default()), eq(false))
        .returning(|_, request, _| {
            let window = request.window(20, 0);
            Ok(Page::new(vec![], window, 0))
        });

    let (status, _) = send(app(mock, FaultMapping::default()), get("/orders/paged")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn count_returns_number() {
    let mut mock = MockOrders::new();
    mock.expect_count_orders().returning(|_| Ok(25));

    let (status, body) = send(app(mock, FaultMapping::default()), get("/orders/count")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 25);
}

// =============================================================================
// Single order
// =============================================================================

#[tokio::test]
async fn get_rejects_non_positive_id_without_calling_service() {
    let mock = MockOrders::new();

    let (status, body) = send(app(mock, FaultMapping::default()), get("/orders/0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Code"], "E4000");
}

#[tokio::test]
async fn get_missing_order_is_no_content() {
    let mut mock = MockOrders::new();
    mock.expect_get_order().with(eq(42)).returning(|_| Ok(None));

    let (status, _) = send(app(mock, FaultMapping::default()), get("/orders/42")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn get_failure_is_internal_error() {
    let mut mock = MockOrders::new();
    mock.expect_get_order()
        .returning(|_| Err(AppError::internal("store unreachable")));

    let (status, body) = send(app(mock, FaultMapping::BadRequest), get("/orders/3")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["Code"], "E5000");
}

#[tokio::test]
async fn get_found_order() {
    let mut mock = MockOrders::new();
    mock.expect_get_order()
        .with(eq(3))
        .returning(|id| Ok(Some(order(id, 4))));

    let (status, body) = send(app(mock, FaultMapping::default()), get("/orders/3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_id"], 3);
    assert_eq!(body["order_date"], "2024-03-01");
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn create_rejects_low_staff_id() {
    let mock = MockOrders::new();

    let (status, body) = send(
        app(mock, FaultMapping::default()),
        json_request("POST", &order(0, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Code"], "E4000");
    assert_eq!(body["Details"], "Order Controller - POST Operation");
}

#[tokio::test]
async fn create_without_body_is_bad_request() {
    let mock = MockOrders::new();
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(mock, FaultMapping::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Code"], "1002");
}

#[tokio::test]
async fn create_success() {
    let mut mock = MockOrders::new();
    mock.expect_create_order()
        .withf(|o| o.staff_id == 2)
        .times(1)
        .returning(|mut o| {
            o.order_id = 11;
            Ok(o)
        });

    let (status, body) = send(
        app(mock, FaultMapping::default()),
        json_request("POST", &order(0, 2)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Code"], "E2000");
    assert_eq!(body["Message"], "New order added successfully.");
}

#[tokio::test]
async fn create_validation_failure_is_internal_error_with_message() {
    let mut mock = MockOrders::new();
    mock.expect_create_order().returning(|_| {
        Err(AppError::Validation(ValidationFailure::single(
            "order_status",
            "must be between 1 and 4",
        )))
    });

    let (status, body) = send(
        app(mock, FaultMapping::default()),
        json_request("POST", &order(0, 2)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["Message"], "order_status: must be between 1 and 4");
}

#[tokio::test]
async fn update_rejects_missing_id() {
    let mock = MockOrders::new();

    let (status, _) = send(
        app(mock, FaultMapping::default()),
        json_request("PUT", &order(0, 3)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_success() {
    let mut mock = MockOrders::new();
    mock.expect_update_order()
        .withf(|o| o.order_id == 5)
        .returning(|_| Ok(()));

    let (status, body) = send(
        app(mock, FaultMapping::default()),
        json_request("PUT", &order(5, 3)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Details"], "Order Controller - Update Operation");
}

#[tokio::test]
async fn delete_missing_order_is_no_content() {
    let mut mock = MockOrders::new();
    mock.expect_delete_order().with(eq(8)).returning(|_| Ok(false));

    let request = Request::builder()
        .method("DELETE")
        .uri("/orders/8")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(mock, FaultMapping::default()), request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_success() {
    let mut mock = MockOrders::new();
    mock.expect_delete_order().with(eq(8)).returning(|_| Ok(true));

    let request = Request::builder()
        .method("DELETE")
        .uri("/orders/8")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(mock, FaultMapping::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Code"], "E2000");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_without_database_is_healthy() {
    let mock = MockOrders::new();

    let (status, body) = send(app(mock, FaultMapping::default()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
