//! Administrative catalog routes
//!
//! Create and update take `multipart/form-data`: file parts named `images`
//! become uploads, every other part is read as a text field.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::debug;

use crate::controllers::VehicleController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    AdminVehicleListResponse, DeleteImageRequest, DeleteVehicleResponse, VehicleForm,
};
use crate::models::{ImageUpload, VehicleRecord};
use crate::routes::vehicle_routes::parse_vehicle_id;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

const IMAGES_FIELD: &str = "images";

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_all_vehicles).post(create_vehicle))
        .route("/vehicles/:id", delete(delete_vehicle).put(update_vehicle))
        .route("/vehicles/:id/images", delete(delete_vehicle_image))
        .route("/reload", post(reload_catalog))
}

async fn list_all_vehicles(State(state): State<AppState>) -> Json<AdminVehicleListResponse> {
    let controller = VehicleController::new(state.vehicles.clone());
    let data = controller.list_all().await;
    Json(AdminVehicleListResponse {
        success: true,
        count: data.len(),
        data,
    })
}

async fn reload_catalog(
    State(state): State<AppState>,
) -> Result<Json<AdminVehicleListResponse>, AppError> {
    let controller = VehicleController::new(state.vehicles.clone());
    let data = controller.reload().await?;
    Ok(Json(AdminVehicleListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

async fn create_vehicle(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<VehicleRecord>>), AppError> {
    let (form, uploads) = read_vehicle_form(multipart).await?;
    let controller = VehicleController::new(state.vehicles.clone());
    let response = controller.create(form, uploads).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<VehicleRecord>>, AppError> {
    let id = parse_vehicle_id(&id)?;
    let (form, uploads) = read_vehicle_form(multipart).await?;
    let controller = VehicleController::new(state.vehicles.clone());
    let response = controller.update(id, form, uploads).await?;
    Ok(Json(response))
}

async fn delete_vehicle_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DeleteImageRequest>,
) -> Result<Json<ApiResponse<VehicleRecord>>, AppError> {
    let id = parse_vehicle_id(&id)?;
    let controller = VehicleController::new(state.vehicles.clone());
    let response = controller.delete_image(id, request.image_path).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteVehicleResponse>, AppError> {
    let id = parse_vehicle_id(&id)?;
    let controller = VehicleController::new(state.vehicles.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn read_vehicle_form(mut multipart: Multipart) -> AppResult<(VehicleForm, Vec<ImageUpload>)> {
    let mut form = VehicleForm::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGES_FIELD {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            debug!("📎 Received image part '{}' ({} bytes)", original_name, bytes.len());
            uploads.push(ImageUpload::new(original_name, content_type.as_deref(), bytes.to_vec()));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set(&name, value);
        }
    }

    Ok((form, uploads))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
