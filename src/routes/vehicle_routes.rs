//! Public catalog routes

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::VehicleController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{ListVehiclesParams, VehiclePageResponse};
use crate::models::{VehicleId, VehicleRecord};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
}

/// Path ids are parsed by hand so a malformed id is reported like an unknown one
pub(crate) fn parse_vehicle_id(raw: &str) -> AppResult<VehicleId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("Vehicle with id '{}' not found", raw)))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<ListVehiclesParams>,
) -> Json<VehiclePageResponse> {
    let controller = VehicleController::new(state.vehicles.clone());
    let page = controller.list(&params.to_query()).await;
    Json(page.into())
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleRecord>>, AppError> {
    let id = parse_vehicle_id(&id)?;
    let controller = VehicleController::new(state.vehicles.clone());
    let vehicle = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
