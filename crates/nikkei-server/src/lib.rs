//! HTTP server assembly for the Nikkei registry.
//!
//! Mounts the JSON API from `nikkei-api` under `/api/v1`, adds the health and
//! ping endpoints, and wraps everything in request tracing and CORS.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, header},
  routing::get,
};
use nikkei_core::store::RegistryStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `nikkei.toml` and
/// `NIKKEI_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Browser origins allowed to call the API with credentials.
  pub allowed_origins: Vec<String>,
}

/// Layer an optional config file under the environment, on top of defaults.
pub fn load_config(
  file: impl Into<PathBuf>,
) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 8080)?
    .set_default("store_path", "nikkei.db")?
    .set_default(
      "allowed_origins",
      vec!["http://localhost:3000", "http://localhost:3001"],
    )?
    .add_source(config::File::from(file.into()).required(false))
    .add_source(
      config::Environment::with_prefix("NIKKEI")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins"),
    )
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: RegistryStore + 'static,
{
  let api = nikkei_api::api_router(store)
    .route("/health", get(health))
    .route("/ping", get(ping));

  Router::new()
    .nest("/api/v1", api)
    .layer(TraceLayer::new_for_http())
    .layer(cors_layer(&config.allowed_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  let origins: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_credentials(true)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([
      header::ORIGIN,
      header::CONTENT_LENGTH,
      header::CONTENT_TYPE,
      header::AUTHORIZATION,
    ])
}

// ─── Health ───────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
  Json(json!({
    "status":  "ok",
    "message": "Nikkei registry API running",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

async fn ping() -> Json<Value> { Json(json!({ "message": "pong" })) }

// ─── Integration tests ────────────────────────────────────────────────────────
