use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use fitlife_core::{FeatureMapper, PlanPrediction, RawQuery, RequestShape, SchemeDescriptor};
use fitlife_similarity::{PointQuery, RecommendResponse, DEFAULT_MODEL_ID};
use fitlife_storage::{PlanService, RecommenderService};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

pub const DEFAULT_TOP_N: i64 = 5;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub plan: Arc<PlanService>,
    pub recommender: Arc<RecommenderService>,
    /// Append error text to 500 responses
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(plan: Arc<PlanService>, recommender: Arc<RecommenderService>) -> Self {
        Self {
            plan,
            recommender,
            expose_errors: false,
        }
    }

    pub fn with_exposed_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemeSummary {
    series: i64,
    reps: String,
    rest: String,
    note: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanMetadata {
    model_version: String,
    focus_id: String,
    scheme_id: String,
    focus_boost: Vec<String>,
    priority_ids: Vec<String>,
}

/// Plan prediction as returned by `/predict`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    focus_id: String,
    scheme_id: String,
    series_count: i64,
    reps_descriptor: String,
    rest_descriptor: String,
    note: String,
    focus_plan: Vec<Vec<String>>,
    scheme: SchemeSummary,
    scheme_meta: SchemeDescriptor,
    blocks: Vec<fitlife_core::PlanBlock>,
    metadata: PlanMetadata,
}

impl PredictResponse {
    pub fn new(plan: PlanPrediction, version: &str) -> Self {
        Self {
            scheme: SchemeSummary {
                series: plan.series_count,
                reps: plan.reps_descriptor.clone(),
                rest: plan.rest_descriptor.clone(),
                note: plan.note.clone(),
            },
            metadata: PlanMetadata {
                model_version: version.to_string(),
                focus_id: plan.focus_id.clone(),
                scheme_id: plan.scheme_id.clone(),
                focus_boost: vec![plan.scheme_id.clone()],
                priority_ids: Vec::new(),
            },
            focus_id: plan.focus_id,
            scheme_id: plan.scheme_id,
            series_count: plan.series_count,
            reps_descriptor: plan.reps_descriptor,
            rest_descriptor: plan.rest_descriptor,
            note: plan.note,
            focus_plan: plan.focus_plan,
            scheme_meta: plan.scheme_meta,
            blocks: plan.blocks,
        }
    }
}

/// Similarity request; every field is optional.
///
/// `experience` and `minutes` take precedence over `experienceLevel` and
/// `minutesAvailable` when both spellings are sent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub sex: Option<String>,
    pub age: Option<i64>,
    pub experience: Option<String>,
    pub experience_level: Option<String>,
    pub minutes: Option<i64>,
    pub minutes_available: Option<i64>,
    pub goal: Option<String>,
    pub top_n: Option<i64>,
}

impl RecommendRequest {
    pub fn into_query(self) -> (PointQuery, i64) {
        let defaults = PointQuery::default();
        let query = PointQuery {
            sex: self.sex.unwrap_or(defaults.sex),
            age: self.age.unwrap_or(defaults.age),
            experience_level: self
                .experience
                .or(self.experience_level)
                .unwrap_or(defaults.experience_level),
            minutes_available: self
                .minutes
                .or(self.minutes_available)
                .unwrap_or(defaults.minutes_available),
            goal: self.goal.unwrap_or(defaults.goal),
        };
        (query, self.top_n.unwrap_or(DEFAULT_TOP_N))
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: AppState, host: String, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/predict", web::post().to(predict))
        .route("/recommend", web::post().to(recommend));
}

fn internal_error(op: &str, err: impl Display, expose: bool) -> HttpResponse {
    tracing::error!(op, error = %err, "request failed");
    let mut body = serde_json::json!({ "error": format!("internal error in {op}") });
    if expose {
        body["detail"] = serde_json::Value::String(err.to_string());
    }
    HttpResponse::InternalServerError().json(body)
}

async fn index(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "version": state.plan.version(),
        "services": ["predict", "recommend"],
    })))
}

async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let info = state.plan.info();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": state.plan.version(),
        "knnPresent": state.recommender.is_present(),
        "knnLoaded": state.recommender.is_loaded(),
        "checksum": info.map(|i| i.checksum.clone()),
        "loadedAt": info.map(|i| i.loaded_at.to_rfc3339()),
    })))
}

async fn predict(
    state: web::Data<AppState>,
    req: web::Json<RawQuery>,
) -> ActixResult<HttpResponse> {
    let shape = RequestShape::from(req.into_inner());
    let resolution = FeatureMapper::resolve(&shape);
    let recovered = resolution.recovered_fields();
    if !recovered.is_empty() {
        tracing::info!(fields = ?recovered, "substituted defaults for unusable fields");
    }

    match state.plan.predict(&resolution.features) {
        Ok(plan) => {
            tracing::info!(
                dialect = shape.kind(),
                features = ?resolution.features.as_array(),
                focus_id = %plan.focus_id,
                scheme_id = %plan.scheme_id,
                "plan predicted"
            );
            Ok(HttpResponse::Ok().json(PredictResponse::new(plan, state.plan.version())))
        }
        Err(e) => Ok(internal_error("predict", e, state.expose_errors)),
    }
}

async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let (query, top_n) = req.into_inner().into_query();

    // the first call may read the artifact from disk
    let service = state.recommender.clone();
    let loaded = web::block(move || service.get()).await;

    let recommender = match loaded {
        Ok(Ok(recommender)) => recommender,
        Ok(Err(reason)) => {
            return Ok(HttpResponse::Ok().json(RecommendResponse::degraded(DEFAULT_MODEL_ID, reason)))
        }
        Err(e) => return Ok(internal_error("recommend", e, state.expose_errors)),
    };

    match recommender.recommend(&query, top_n) {
        Ok(response) => {
            tracing::debug!(top_n, results = response.meta.result_count, "recommended routines");
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(internal_error("recommend", e, state.expose_errors)),
    }
}
