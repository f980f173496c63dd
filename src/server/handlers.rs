use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::batch::parse_manual_pairs;
use crate::location::PlaceInfo;
use crate::pair::{PairInput, PairRecord};
use crate::zone::{MetroRange, Zone, METRO_RANGES, SPECIAL_STATES};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Query parameters ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PairQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl PairQuery {
    fn codes(&self) -> Result<(String, String), ApiError> {
        let from = self.from.as_deref().unwrap_or("").trim();
        let to = self.to.as_deref().unwrap_or("").trim();
        if from.is_empty() || to.is_empty() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Provide both 'from' and 'to' parameters",
            ));
        }
        Ok((from.to_string(), to.to_string()))
    }
}

/// Run a blocking pipeline call off the async workers.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> T + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {}", e)))
}

// ─── GET /api/pair ───────────────────────────────────────────────

pub async fn pair(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PairQuery>,
) -> Result<Json<PairRecord>, ApiError> {
    let start = Instant::now();
    let (from, to) = params.codes()?;

    let result = blocking(&state, move |s| s.processor.process_pair(&from, &to)).await?;

    info!(
        "GET /api/pair from={} to={} -> {} ({:.1}ms)",
        result.from,
        result.to,
        result.zone,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(result.record()))
}

// ─── GET /api/zone ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct ZoneResponse {
    pub from: String,
    pub to: String,
    pub from_place: PlaceInfo,
    pub to_place: PlaceInfo,
    pub zone: Zone,
}

pub async fn zone_only(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PairQuery>,
) -> Result<Json<ZoneResponse>, ApiError> {
    let start = Instant::now();
    let (from, to) = params.codes()?;

    let z = blocking(&state, move |s| s.processor.zone_only(&from, &to)).await?;

    info!(
        "GET /api/zone from={} to={} -> {} ({:.1}ms)",
        z.from,
        z.to,
        z.zone,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(ZoneResponse {
        from: z.from.to_string(),
        to: z.to.to_string(),
        from_place: z.from_place,
        to_place: z.to_place,
        zone: z.zone,
    }))
}

// ─── POST /api/pairs ─────────────────────────────────────────────

/// Either structured rows or the free-text "from,to" form.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum BatchRequest {
    Rows(Vec<PairInput>),
    Text { pairs: String },
}

impl BatchRequest {
    fn into_pairs(self) -> Vec<PairInput> {
        match self {
            Self::Rows(rows) => rows,
            Self::Text { pairs } => parse_manual_pairs(&pairs),
        }
    }
}

pub async fn batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<Vec<PairRecord>>, ApiError> {
    let start = Instant::now();
    let Json(req) = body.map_err(|e| api_error(e.status(), e.body_text()))?;
    let pairs = req.into_pairs();
    if pairs.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No pairs supplied"));
    }
    let count = pairs.len();

    let results = blocking(&state, move |s| s.processor.process_batch(&pairs)).await?;

    info!(
        "POST /api/pairs -> {} pairs ({:.1}ms)",
        count,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(results.iter().map(|r| r.record()).collect()))
}

// ─── Static tables ───────────────────────────────────────────────

pub async fn metro_ranges() -> Json<&'static [MetroRange]> {
    Json(METRO_RANGES)
}

pub async fn special_states() -> Json<&'static [&'static str]> {
    Json(SPECIAL_STATES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::tests::stub_processor;

    fn state() -> Arc<AppState> {
        Arc::new(AppState { processor: stub_processor() })
    }

    fn query(from: Option<&str>, to: Option<&str>) -> Query<PairQuery> {
        Query(PairQuery {
            from: from.map(String::from),
            to: to.map(String::from),
        })
    }

    #[tokio::test]
    async fn test_pair_endpoint() {
        let Json(rec) = pair(State(state()), query(Some("110001"), Some("400001")))
            .await
            .unwrap();
        assert_eq!(rec.zone, Zone::Metro);
        assert_eq!(rec.from_city, "Connaught Place");
    }

    #[tokio::test]
    async fn test_pair_missing_param() {
        let err = pair(State(state()), query(Some("110001"), None)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zone_endpoint() {
        let Json(z) = zone_only(State(state()), query(Some("413001"), Some("431001")))
            .await
            .unwrap();
        assert_eq!(z.zone, Zone::Regional);
        assert_eq!(z.from_place.state, "Maharashtra");
    }

    #[tokio::test]
    async fn test_batch_text_and_rows() {
        let req: BatchRequest = serde_json::from_str(r#"{"pairs": "110001,110001\n302001,781001"}"#).unwrap();
        let Json(out) = batch(State(state()), Ok(Json(req))).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].zone, Zone::Local);
        assert_eq!(out[1].zone, Zone::Special);

        let req: BatchRequest =
            serde_json::from_str(r#"[{"from_pincode": "110001", "to_pincode": "400001"}]"#).unwrap();
        let Json(out) = batch(State(state()), Ok(Json(req))).await.unwrap();
        assert_eq!(out[0].zone, Zone::Metro);
    }

    #[tokio::test]
    async fn test_batch_numeric_codes() {
        let req: BatchRequest =
            serde_json::from_str(r#"[{"from_pincode": 110001, "to_pincode": 110055}]"#).unwrap();
        let Json(out) = batch(State(state()), Ok(Json(req))).await.unwrap();
        assert_eq!(out[0].from, "110001");
        assert_eq!(out[0].zone, Zone::Metro);
    }

    #[tokio::test]
    async fn test_batch_bad_body_is_json_error() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = crate::server::build_router(stub_processor());
        let req = Request::post("/api/pairs")
            .header("content-type", "application/json")
            .body(Body::from(r#"[{"from_pincode": true}]"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["code"], 422);
        assert!(v["error"].is_string());
    }

    #[tokio::test]
    async fn test_batch_empty_rejected() {
        let req = BatchRequest::Text { pairs: "no pairs here".into() };
        let err = batch(State(state()), Ok(Json(req))).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_static_tables() {
        let Json(ranges) = metro_ranges().await;
        assert_eq!(ranges.len(), 9);
        let Json(states) = special_states().await;
        assert!(states.contains(&"assam"));
    }
}
