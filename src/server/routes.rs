use axum::{
    extract::{Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::record::AnimalRecord;
use crate::rescue::{self, RescueCategory};
use crate::server::AppState;
use crate::view::RecordView;

#[derive(Deserialize)]
pub struct AnimalParams {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(e: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() }))
}

/// One rescue preset as served to clients. `All` carries no constraints.
#[derive(Serialize)]
pub struct CategoryInfo {
    pub category: RescueCategory,
    pub label: &'static str,
    pub breeds: Vec<&'static str>,
    pub sex: Option<&'static str>,
    pub min_age_weeks: Option<f64>,
    pub max_age_weeks: Option<f64>,
}

pub async fn list_categories() -> Json<Vec<CategoryInfo>> {
    let categories = RescueCategory::all()
        .iter()
        .map(|category| {
            let profile = rescue::profile(*category);
            CategoryInfo {
                category: *category,
                label: category.label(),
                breeds: profile.map(|p| p.breeds.to_vec()).unwrap_or_default(),
                sex: profile.map(|p| p.sex),
                min_age_weeks: profile.map(|p| p.min_age_weeks),
                max_age_weeks: profile.map(|p| p.max_age_weeks),
            }
        })
        .collect();

    Json(categories)
}

pub async fn list_animals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnimalParams>,
) -> Result<Json<RecordView>, ApiError> {
    let category: RescueCategory = params
        .category
        .as_deref()
        .unwrap_or("All")
        .parse()
        .map_err(bad_request)?;

    let records = state
        .shelter
        .lock()
        .await
        .read_category(category)
        .map_err(bad_request)?;

    let mut view = RecordView::from_records(records);
    if let Some(limit) = params.limit {
        view.truncate(limit);
    }
    Ok(Json(view))
}

pub async fn create_animal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let record = AnimalRecord::try_from(body).map_err(bad_request)?;
    let acknowledged = state.shelter.lock().await.create(&record).map_err(bad_request)?;

    let status = if acknowledged { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(serde_json::json!({ "acknowledged": acknowledged }))))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let records = state.shelter.lock().await.count();
    Json(serde_json::json!({ "records": records }))
}
