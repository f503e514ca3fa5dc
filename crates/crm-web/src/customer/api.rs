use super::{service, validation, Customer};
use crate::{
    error::{ApiError, ErrorKind},
    AppState,
};
use axum::{body::Bytes, extract::State, http::StatusCode, Json};

pub const INVALID_INPUT: &str = "Invalid input";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// `POST /api/customers`
///
/// Malformed JSON is treated like any other unexpected failure and answered
/// with a generic 500; only schema violations produce a 400.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let input: serde_json::Value = serde_json::from_slice(&body).map_err(|err| {
        ApiError::internal(format!("parsing request body: {err}"))
            .with_message(INTERNAL_SERVER_ERROR)
    })?;
    let customer = validation::validate(&input).map_err(|errors| {
        ApiError::new(ErrorKind::BadRequest)
            .with_message(INVALID_INPUT)
            .with_meta("errors", &errors)
            .with_log(errors)
    })?;
    let created = service::create_customer(app_state.customers.as_ref(), customer)
        .await
        .map_err(|err| {
            ApiError::internal(format!("create customer failed: {err}"))
                .with_message(INTERNAL_SERVER_ERROR)
        })?;
    tracing::info!(customer_id = created.id, "customer created");
    Ok((StatusCode::CREATED, Json(created)))
}
