//! HTTP surface.
//!
//! ## Endpoints (all `GET`, all JSON)
//! - `/data` - every listing
//! - `/filter?term=` - listings whose city contains `term`
//! - `/cities`, `/areas?city=` - distinct cities / areas of a city
//! - `/average_price?city=`, `/area_summary?city=` - price statistics
//! - `/bhk_distribution?city=`, `/city_leaderboard` - counts
//! - `/top_expensive?n=`, `/price_range?min=&max=` - price-ordered / price-bounded listings
//! - `/random_property` - one listing at random
//! - `/search_description?q=` - listings whose description contains `q`

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::data::{aggregate, filter};
use crate::error::QueryError;
use crate::state::AppState;

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TermParams {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct CityParams {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    #[serde(default = "default_top_n")]
    pub n: i64,
}

fn default_top_n() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_max_price")]
    pub max: f64,
}

fn default_max_price() -> f64 {
    1e9
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/data", get(data))
        .route("/filter", get(filter_data))
        .route("/cities", get(cities))
        .route("/areas", get(areas))
        .route("/average_price", get(average_price))
        .route("/bhk_distribution", get(bhk_distribution))
        .route("/top_expensive", get(top_expensive))
        .route("/price_range", get(price_range))
        .route("/city_leaderboard", get(city_leaderboard))
        .route("/area_summary", get(area_summary))
        .route("/random_property", get(random_property))
        .route("/search_description", get(search_description))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

type JsonResult = Result<Json<Value>, QueryError>;

fn to_json<T: Serialize>(value: T) -> Result<Value, QueryError> {
    Ok(serde_json::to_value(value)?)
}

// ============================================================================
// Handlers
// ============================================================================

async fn data(State(state): State<AppState>) -> JsonResult {
    state.with_table(|t| to_json(filter::all(t))).await.map(Json)
}

async fn filter_data(State(state): State<AppState>, Query(p): Query<TermParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(filter::filter_by_city_term(t, &p.term)))
        .await
        .map(Json)
}

async fn cities(State(state): State<AppState>) -> JsonResult {
    state.with_table(|t| to_json(aggregate::list_cities(t))).await.map(Json)
}

async fn areas(State(state): State<AppState>, Query(p): Query<CityParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(aggregate::list_areas(t, &p.city)))
        .await
        .map(Json)
}

async fn average_price(State(state): State<AppState>, Query(p): Query<CityParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(aggregate::average_price(t, &p.city)))
        .await
        .map(Json)
}

async fn bhk_distribution(
    State(state): State<AppState>,
    Query(p): Query<CityParams>,
) -> JsonResult {
    state
        .with_table(move |t| to_json(aggregate::bhk_distribution(t, &p.city)))
        .await
        .map(Json)
}

async fn top_expensive(State(state): State<AppState>, Query(p): Query<TopParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(aggregate::top_expensive(t, p.n)))
        .await
        .map(Json)
}

async fn price_range(State(state): State<AppState>, Query(p): Query<RangeParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(filter::price_range(t, p.min, p.max)))
        .await
        .map(Json)
}

async fn city_leaderboard(State(state): State<AppState>) -> JsonResult {
    state
        .with_table(|t| to_json(aggregate::city_leaderboard(t)))
        .await
        .map(Json)
}

async fn area_summary(State(state): State<AppState>, Query(p): Query<CityParams>) -> JsonResult {
    state
        .with_table(move |t| to_json(aggregate::area_summary(t, &p.city)))
        .await
        .map(Json)
}

async fn random_property(State(state): State<AppState>) -> JsonResult {
    state
        .with_table(|t| {
            let mut rng = rand::thread_rng();
            to_json(aggregate::random_property(t, &mut rng)?)
        })
        .await
        .map(Json)
}

async fn search_description(
    State(state): State<AppState>,
    Query(p): Query<SearchParams>,
) -> JsonResult {
    state
        .with_table(move |t| to_json(filter::search_description(t, &p.q)?))
        .await
        .map(Json)
}

// ============================================================================
// Errors
// ============================================================================

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = match &self {
            QueryError::MissingColumn(_) => StatusCode::BAD_REQUEST,
            QueryError::DataSource(_) | QueryError::EmptyDataset | QueryError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            log::error!("request failed: {self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
