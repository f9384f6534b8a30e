use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, middleware::rate_limit_middleware},
    app_error::{AppError, AppResult},
    domain::entities::waitlist_entry::EntrySource,
    use_cases::intake::{DeliverabilityReport, IntakeOutcome, Rejection},
};

/// Only the submission endpoints count against the per-IP limit.
pub fn router(app_state: &AppState) -> Router<AppState> {
    let submissions = Router::new()
        .route("/verify-and-save", post(join_waitlist))
        .route("/join-waitlist", post(join_waitlist))
        .route("/save-google-email", post(save_google_email))
        .route("/verify-email", post(verify_email))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(submissions)
        .route("/waitlist-count", get(waitlist_count))
}

#[derive(Deserialize)]
struct EmailPayload {
    email: String,
}

#[derive(Serialize)]
struct JoinResponse {
    success: bool,
    exists: bool,
    message: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    success: bool,
    #[serde(flatten)]
    report: DeliverabilityReport,
}

#[derive(Serialize)]
struct CountResponse {
    success: bool,
    count: i64,
}

/// Missing body, wrong content type or a non-string `email` all get the same
/// answer as a malformed address.
fn parse_payload(payload: Result<Json<EmailPayload>, JsonRejection>) -> AppResult<EmailPayload> {
    payload.map(|Json(p)| p).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unparseable email payload");
        AppError::from(Rejection::InvalidEmail)
    })
}

async fn join_waitlist(
    State(app_state): State<AppState>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> AppResult<Json<JoinResponse>> {
    let payload = parse_payload(payload)?;
    let outcome = app_state
        .intake_use_cases
        .submit(&payload.email, EntrySource::Form)
        .await?;
    respond(outcome, &app_state.config.product_name)
}

async fn save_google_email(
    State(app_state): State<AppState>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> AppResult<Json<JoinResponse>> {
    let payload = parse_payload(payload)?;
    let outcome = app_state
        .intake_use_cases
        .submit(&payload.email, EntrySource::Google)
        .await?;
    respond(outcome, &app_state.config.product_name)
}

async fn verify_email(
    State(app_state): State<AppState>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> AppResult<Json<VerifyResponse>> {
    let payload = parse_payload(payload)?;
    let report = app_state
        .intake_use_cases
        .check_deliverability(&payload.email)
        .await?;
    Ok(Json(VerifyResponse {
        success: true,
        report,
    }))
}

async fn waitlist_count(State(app_state): State<AppState>) -> AppResult<Json<CountResponse>> {
    let count = app_state.intake_use_cases.count().await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

fn respond(outcome: IntakeOutcome, product_name: &str) -> AppResult<Json<JoinResponse>> {
    match outcome {
        IntakeOutcome::Created(_) => Ok(Json(JoinResponse {
            success: true,
            exists: false,
            message: format!(
                "Welcome to {product_name}! You have successfully joined the waitlist."
            ),
        })),
        IntakeOutcome::AlreadyExists => Ok(Json(JoinResponse {
            success: true,
            exists: true,
            message: "You're already on the waitlist. Stay tuned!".to_string(),
        })),
        IntakeOutcome::Rejected(rejection) => Err(rejection.into()),
    }
}
