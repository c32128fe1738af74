use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use imposition::layout::compute_items_per_sheet;
use imposition::margins::MarginConfig;
use imposition::resolver::{DEFAULT_TOP_N, Resolver};
use imposition::store::InMemoryStore;
use imposition::types::{
    LayoutResult, MaterialCandidate, PrintableArea, ResolveOutcome, ResolveSpecs, SheetSizeSpec,
    TrimSize,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct LayoutRequest {
    trim: TrimSize,
    #[serde(default)]
    sheet: Option<SheetSizeSpec>,
    #[serde(default)]
    printable: Option<PrintableArea>,
    #[serde(default)]
    margins: Option<MarginConfig>,
}

#[derive(Deserialize, Serialize)]
struct ResolveRequest {
    #[serde(flatten)]
    specs: ResolveSpecs,
    materials: Vec<MaterialCandidate>,
    #[serde(default)]
    margins: Option<MarginConfig>,
    #[serde(default = "default_top_n")]
    top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

async fn layout(
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResult>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /layout"
    );

    let printable = req
        .printable
        .or_else(|| req.sheet.map(|s| s.dimensions()))
        .ok_or((
            StatusCode::BAD_REQUEST,
            "either printable or sheet is required".to_string(),
        ))?;
    if printable.width <= 0.0 || printable.height <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "sheet dimensions must be positive".to_string(),
        ));
    }

    let margins = req.margins.unwrap_or_default();
    let result = compute_items_per_sheet(req.trim, printable, &margins)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(result))
}

async fn resolve(
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveOutcome>, (StatusCode, String)> {
    tracing::info!(
        material_count = req.materials.len(),
        body = serde_json::to_string(&req.specs).unwrap_or_default(),
        "POST /resolve"
    );

    if req.specs.quantity == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "quantity must be non-zero".to_string(),
        ));
    }

    let store = InMemoryStore::new(req.materials);
    let margins = req.margins.unwrap_or_default();
    let resolver = Resolver::new(&store, None, margins);
    let outcome = resolver
        .resolve(None, &req.specs, req.top_n)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(outcome))
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
        .route("/layout", post(layout))
        .route("/resolve", post(resolve))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
