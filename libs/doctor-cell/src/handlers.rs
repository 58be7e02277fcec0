use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::parse_uuid_param;
use shared_utils::AppState;

use crate::models::{
    AvailableSlotsQuery, AvailableSlotsResponse,
    CreateAvailabilityRequest, UpdateAvailabilityRequest,
};
use crate::services::{AvailabilityService, SlotService};

fn ensure_doctor_self(user: &User, doctor_id: &str, action: &str) -> Result<(), AppError> {
    if user.id != doctor_id {
        return Err(AppError::Forbidden(format!("Not authorized to {} availability for this doctor", action)));
    }
    Ok(())
}

// ==============================================================================
// PUBLIC SLOT LOOKUP
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots_public(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query.date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("date is required".to_string()))?;

    let slot_service = SlotService::new(&state.repositories);
    let slots = slot_service.get_available_slots(&doctor_id, &date).await?;

    Ok(Json(json!(AvailableSlotsResponse {
        doctor_id,
        date,
        slots,
    })))
}

// ==============================================================================
// AVAILABILITY HANDLERS (Doctor Configuration)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state.repositories);

    let availability = availability_service.get_doctor_availability(&doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "availability": availability,
        "total": availability.len()
    })))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    ensure_doctor_self(&user, &doctor_id, "create")?;

    let availability_service = AvailabilityService::new(&state.repositories);
    let availability = availability_service.create_availability(&doctor_id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(availability))))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, availability_id)): Path<(String, String)>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_doctor_self(&user, &doctor_id, "update")?;
    let availability_id = parse_uuid_param(&availability_id, "availability_id")?;

    let availability_service = AvailabilityService::new(&state.repositories);
    let updated = availability_service.update_availability(availability_id, &user.id, request).await?;

    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, availability_id)): Path<(String, String)>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    ensure_doctor_self(&user, &doctor_id, "delete")?;
    let availability_id = parse_uuid_param(&availability_id, "availability_id")?;

    let availability_service = AvailabilityService::new(&state.repositories);
    availability_service.delete_availability(availability_id, &user.id).await?;

    Ok(Json(json!({ "success": true })))
}
