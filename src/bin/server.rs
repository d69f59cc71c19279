use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cutlist::solver::Solver;
use cutlist::types::{
    BillingConfig, LayoutOptions, LayoutResult, PartSpec, StockSheetSpec,
    deserialize_u32_from_number,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    parts: Vec<PartSpec>,
    stock: Vec<StockSheetSpec>,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    kerf_mm: u32,
    #[serde(default = "default_true")]
    allow_rotation: bool,
    #[serde(default)]
    single_sheet_only: bool,
    #[serde(default)]
    billing: BillingConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct OptimizeResponse {
    #[serde(flatten)]
    result: LayoutResult,
    sheet_count: usize,
    waste_percent: f64,
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let options = LayoutOptions {
        kerf_mm: req.kerf_mm,
        allow_rotation: req.allow_rotation,
        single_sheet_only: req.single_sheet_only,
        billing: req.billing,
    };

    let solver = Solver::new(req.parts, req.stock, options);
    let result = solver
        .solve()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let sheet_count = result.sheet_count();
    let waste_percent = result.total_waste_percent();
    Ok(Json(OptimizeResponse {
        result,
        sheet_count,
        waste_percent,
    }))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
