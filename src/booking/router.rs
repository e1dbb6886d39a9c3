use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{BookingId, BookingRequest, PaymentReference, SlipId, StayRange};
use super::eligibility::EligibilityError;
use super::payments::{PaymentError, PaymentGateway};
use super::repository::{BookingRepository, NotificationPublisher, RepositoryError};
use super::service::{BookingService, BookingServiceError};

/// Router builder exposing the booking engine's HTTP surface.
pub fn booking_router<R, G, N>(service: Arc<BookingService<R, G, N>>) -> Router
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/slips/:slip_id/availability",
            get(availability_handler::<R, G, N>),
        )
        .route("/api/v1/bookings/quote", post(quote_handler::<R, G, N>))
        .route("/api/v1/bookings", post(create_handler::<R, G, N>))
        .route(
            "/api/v1/payments/confirm",
            post(confirm_handler::<R, G, N>),
        )
        .route(
            "/api/v1/bookings/:booking_id/cancel",
            post(cancel_handler::<R, G, N>),
        )
        .route(
            "/api/v1/bookings/:booking_id/approve",
            post(approve_handler::<R, G, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteBody {
    #[serde(flatten)]
    pub request: BookingRequest,
    /// Evaluation date override; defaults to the server's local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmBody {
    pub payment_reference: String,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelBody {
    pub reason: String,
    #[serde(default)]
    pub cancellation_date: Option<NaiveDate>,
}

pub(crate) async fn availability_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    Path(slip_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let slip_id = SlipId(slip_id);
    let range = StayRange::new(query.check_in, query.check_out);
    // An inverted range overlaps nothing and would read as available.
    if range.nights() <= 0 {
        return error_response(BookingServiceError::Validation(
            EligibilityError::CheckOutNotAfterCheckIn,
        ));
    }
    match service.check_availability(&slip_id, &range) {
        Ok(available) => {
            let payload = json!({
                "slip_id": slip_id.0,
                "check_in": query.check_in,
                "check_out": query.check_out,
                "available": available,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn quote_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    axum::Json(body): axum::Json<QuoteBody>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let today = body.today.unwrap_or_else(|| Local::now().date_naive());
    match service.validate_and_price(&body.request, today) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote.rounded())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    axum::Json(body): axum::Json<QuoteBody>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let today = body.today.unwrap_or_else(|| Local::now().date_naive());
    match service.create_booking(body.request, today) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn confirm_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    axum::Json(body): axum::Json<ConfirmBody>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let payment_date = body.payment_date.unwrap_or_else(|| Local::now().date_naive());
    let reference = PaymentReference(body.payment_reference);
    match service.confirm_payment(&reference, payment_date) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn cancel_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    Path(booking_id): Path<String>,
    axum::Json(body): axum::Json<CancelBody>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let cancelled_on = body
        .cancellation_date
        .unwrap_or_else(|| Local::now().date_naive());
    let id = BookingId(booking_id);
    match service.cancel_booking(&id, cancelled_on, &body.reason) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<R, G, N>(
    State(service): State<Arc<BookingService<R, G, N>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    R: BookingRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationPublisher + 'static,
{
    let id = BookingId(booking_id);
    match service.approve_booking(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Map service failures onto the wire contract. Every branch returns
/// `{"error": ...}` with the taxonomy's status code.
pub(crate) fn error_response(err: BookingServiceError) -> Response {
    let status = match &err {
        BookingServiceError::Validation(_) | BookingServiceError::MissingCancellationReason => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BookingServiceError::Conflict | BookingServiceError::InvalidState(_) => {
            StatusCode::CONFLICT
        }
        BookingServiceError::Payment(payment) => match payment {
            PaymentError::NonPositiveAmount | PaymentError::BelowMinimumCharge { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PaymentError::Rejected(_) => StatusCode::PAYMENT_REQUIRED,
            PaymentError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
        BookingServiceError::ReconciliationInconsistency { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        BookingServiceError::Repository(repository) => match repository {
            RepositoryError::NotFound => StatusCode::NOT_FOUND,
            RepositoryError::Conflict
            | RepositoryError::VersionConflict
            | RepositoryError::IllegalState => StatusCode::CONFLICT,
            RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
