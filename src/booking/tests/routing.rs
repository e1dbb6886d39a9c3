use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::booking::repository::BookingRepository;
use crate::booking::router::{
    self, booking_router, AvailabilityQuery, CancelBody, ConfirmBody, QuoteBody,
};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn availability_endpoint_reports_free_slip() {
    let harness = harness();
    let app = booking_router(harness.service.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/slips/slip-a1/availability?check_in=2025-06-10&check_out=2025-06-12")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["available"], Value::Bool(true));
    assert_eq!(body["slip_id"], "slip-a1");
}

#[tokio::test]
async fn availability_endpoint_rejects_inverted_range() {
    let harness = harness();

    let response = router::availability_handler(
        State(harness.service.clone()),
        Path("slip-a1".to_string()),
        Query(AvailabilityQuery {
            check_in: date(2025, 6, 12),
            check_out: date(2025, 6, 10),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "check-out date must be after check-in date");
}

#[tokio::test]
async fn availability_endpoint_returns_not_found_for_unknown_slip() {
    let harness = harness();

    let response = router::availability_handler(
        State(harness.service.clone()),
        Path("slip-missing".to_string()),
        Query(AvailabilityQuery {
            check_in: date(2025, 6, 10),
            check_out: date(2025, 6, 12),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_endpoint_rejects_past_check_in() {
    let harness = harness();

    let response = router::quote_handler(
        State(harness.service.clone()),
        axum::Json(QuoteBody {
            request: renter_request(date(2025, 5, 20), date(2025, 5, 22)),
            today: Some(today()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "check-in date cannot be in the past");
}

#[tokio::test]
async fn create_endpoint_returns_created_with_quote() {
    let harness = harness();

    let response = router::create_handler(
        State(harness.service.clone()),
        axum::Json(QuoteBody {
            request: renter_request(date(2025, 6, 22), date(2025, 6, 24)),
            today: Some(today()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["quote"]["final_total"], "120");
    assert!(body["client_secret"].is_string());
}

#[tokio::test]
async fn create_endpoint_returns_conflict_for_taken_range() {
    let harness = harness();
    harness
        .service
        .create_booking(homeowner_request(date(2025, 6, 10), date(2025, 6, 15)), today())
        .expect("homeowner booking confirms");

    let response = router::create_handler(
        State(harness.service.clone()),
        axum::Json(QuoteBody {
            request: renter_request(date(2025, 6, 12), date(2025, 6, 16)),
            today: Some(today()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn confirm_endpoint_surfaces_reconciliation_inconsistency() {
    let harness = harness();

    let response = router::confirm_handler(
        State(harness.service.clone()),
        axum::Json(ConfirmBody {
            payment_reference: "pi_ghost_000001".to_string(),
            payment_date: Some(date(2025, 6, 5)),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn confirm_endpoint_confirms_pending_renter_booking() {
    let harness = harness();
    let created = harness
        .service
        .create_booking(renter_request(date(2025, 6, 22), date(2025, 6, 24)), today())
        .expect("renter booking accepted");
    let reference = harness
        .store
        .fetch(&created.booking.booking_id)
        .expect("fetch succeeds")
        .expect("record present")
        .payment_reference
        .expect("reference assigned");

    let response = router::confirm_handler(
        State(harness.service.clone()),
        axum::Json(ConfirmBody {
            payment_reference: reference.0,
            payment_date: Some(date(2025, 6, 5)),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["payment_status"], "paid");
}

#[tokio::test]
async fn cancel_endpoint_rejects_already_cancelled_booking() {
    let harness = harness();
    let created = harness
        .service
        .create_booking(homeowner_request(date(2025, 6, 20), date(2025, 6, 22)), today())
        .expect("homeowner booking confirms");
    harness
        .service
        .cancel_booking(&created.booking.booking_id, date(2025, 6, 10), "storm")
        .expect("first cancellation succeeds");

    let response = router::cancel_handler(
        State(harness.service.clone()),
        Path(created.booking.booking_id.0.clone()),
        axum::Json(CancelBody {
            reason: "storm again".to_string(),
            cancellation_date: Some(date(2025, 6, 11)),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn approve_endpoint_returns_not_found_for_unknown_booking() {
    let harness = harness();

    let response =
        router::approve_handler(State(harness.service.clone()), Path("bk-missing".to_string()))
            .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_router_cancels_with_refund_breakdown() {
    let harness = harness();
    let created = harness
        .service
        .create_booking(renter_request(date(2025, 6, 20), date(2025, 6, 22)), today())
        .expect("renter booking accepted");
    let reference = harness
        .store
        .fetch(&created.booking.booking_id)
        .expect("fetch succeeds")
        .expect("record present")
        .payment_reference
        .expect("reference assigned");
    harness
        .service
        .confirm_payment(&reference, date(2025, 6, 5))
        .expect("payment confirms");

    let app = booking_router(harness.service.clone());
    let payload = serde_json::json!({
        "reason": "trip cut short",
        "cancellation_date": "2025-06-15",
    });
    let uri = format!("/api/v1/bookings/{}/cancel", created.booking.booking_id.0);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["refund_amount"], "60.00");
    assert_eq!(body["cancellation_fee"], "60.00");
    assert_eq!(body["payment_status"], "partially_refunded");
}

#[tokio::test]
async fn handlers_are_generic_over_the_service_stack() {
    // Compile-time shape check: the router builds for any trait stack.
    let harness = harness();
    let _app: axum::Router = booking_router(Arc::clone(&harness.service));
}
