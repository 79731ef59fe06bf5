//! Student CSV sidecar route handlers
//!
//! An independent data path from the card store: append-only rows in a plain
//! delimited file, read back with header-derived field names.

use crate::error::{validation_error, ApiResult};
use crate::models::{CreateStudentRequest, SuccessResponse};
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;
use validator::Validate;

const MISSING_FIELDS: &str = "Faltan campos obligatorios: Nombre, Apellido, Calificacion";

/// Read every student row from the CSV file
pub async fn get_students_csv(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<Vec<Map<String, Value>>>>> {
    let rows = state.students.read_all().await?;

    Ok(Json(SuccessResponse::with_data(
        "Datos del CSV obtenidos correctamente",
        rows,
    )))
}

/// Append one student row to the CSV file
///
/// The three required fields are checked before anything touches the file, so
/// a 400 never leaves a partial write behind.
pub async fn create_student_csv(
    State(state): State<SharedState>,
    Json(payload): Json<CreateStudentRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<CreateStudentRequest>>)> {
    payload
        .validate()
        .map_err(|_| validation_error(MISSING_FIELDS))?;

    state.students.append_row(&payload.to_csv_line()).await?;
    info!("Student row appended to CSV");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Alumno agregado correctamente al CSV",
            payload,
        )),
    ))
}
