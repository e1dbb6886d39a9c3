use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dockside::booking::{
    booking_router, BookingService, InMemoryBookingStore, NotificationPublisher, SandboxGateway,
    SlipId, SlipSnapshot, StayRange, UserClass,
};
use dockside::booking::{pricing, Notice, NotificationError};
use dockside::config::AppConfig;
use dockside::error::AppError;
use dockside::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Dockside Booking Engine",
    about = "Run the dock-slip booking engine or price a stay from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price a candidate stay without creating anything
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Check-in date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    check_in: NaiveDate,
    /// Check-out date (YYYY-MM-DD, exclusive)
    #[arg(long, value_parser = parse_date)]
    check_out: NaiveDate,
    /// Nightly rate in dollars, e.g. 60 or 59.50
    #[arg(long, value_parser = parse_rate)]
    nightly_rate: Decimal,
    /// Who is booking: renter or homeowner
    #[arg(long, value_parser = parse_user_class, default_value = "renter")]
    user_class: UserClass,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Quote(args) => run_quote(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_rate(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|err| format!("invalid nightly rate '{raw}': {err}"))
}

fn parse_user_class(raw: &str) -> Result<UserClass, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "renter" => Ok(UserClass::Renter),
        "homeowner" => Ok(UserClass::Homeowner),
        other => Err(format!("unknown user class '{other}' (expected renter or homeowner)")),
    }
}

/// Logs outbound notices instead of delivering them; the real email adapter
/// lives outside this crate.
struct LoggingNotifier;

impl NotificationPublisher for LoggingNotifier {
    fn send(&self, notice: Notice) -> Result<(), NotificationError> {
        info!(
            kind = notice.kind.label(),
            recipient = %notice.recipient,
            subject = %notice.subject,
            "notice dispatched"
        );
        Ok(())
    }
}

fn demo_slips() -> Vec<SlipSnapshot> {
    vec![
        SlipSnapshot {
            id: SlipId("slip-a1".to_string()),
            name: "Slip A1".to_string(),
            max_length_ft: 30,
            width_ft: 12,
            depth_ft: 6,
            nightly_rate: Decimal::from(60),
            amenities: vec!["Water".to_string(), "Power".to_string()],
            description: "Protected slip near the fuel dock".to_string(),
            etiquette: None,
            image_keys: Vec::new(),
        },
        SlipSnapshot {
            id: SlipId("slip-b2".to_string()),
            name: "Slip B2".to_string(),
            max_length_ft: 40,
            width_ft: 14,
            depth_ft: 8,
            nightly_rate: Decimal::from(85),
            amenities: vec!["Water".to_string(), "Power".to_string(), "Pump-out".to_string()],
            description: "Deep-water slip on the outer pier".to_string(),
            etiquette: None,
            image_keys: Vec::new(),
        },
    ]
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(InMemoryBookingStore::with_slips(demo_slips()));
    let gateway = Arc::new(SandboxGateway::new());
    let notifier = Arc::new(LoggingNotifier);
    let service = Arc::new(BookingService::new(
        store,
        gateway,
        notifier,
        config.payment.clone(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(booking_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dock-slip booking engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let range = StayRange::new(args.check_in, args.check_out);
    if range.nights() <= 0 {
        return Err(AppError::Quote(
            "check-out date must be after check-in date".to_string(),
        ));
    }

    let quote = match args.user_class {
        UserClass::Homeowner => pricing::Quote::complimentary(range.nights()),
        UserClass::Renter => pricing::quote(&range, args.nightly_rate, args.user_class),
    };
    let quote = quote.rounded();

    println!("Stay quote");
    println!(
        "Dates: {} -> {} ({} night{})",
        args.check_in,
        args.check_out,
        quote.nights,
        if quote.nights == 1 { "" } else { "s" }
    );
    println!("User class: {}", args.user_class.label());
    println!("Base total: ${}", quote.base_total);
    if quote.has_discount() {
        println!("Long-stay discount: -${}", quote.discount);
    }
    println!("Final total: ${}", quote.final_total);

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
