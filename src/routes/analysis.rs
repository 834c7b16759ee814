use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::models::api::{AnalysisStateResponse, CancelResponse, StartAnalysisBody};
use crate::routes::{api_error, ApiError};
use crate::services::poller::{PollerError, PollerState, StartOptions};

/// POST /api/v1/analysis/{client_id} — start an analysis and poll it in the background.
pub async fn start_analysis(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    body: Option<Json<StartAnalysisBody>>,
) -> Result<(StatusCode, Json<AnalysisStateResponse>), ApiError> {
    let Json(body) = body.unwrap_or_default();
    let options = StartOptions {
        force_restart: body.force_reanalyze,
    };

    state
        .analyses
        .start(&client_id, options)
        .await
        .map_err(|e| match e {
            PollerError::StartRejected(message) => api_error(StatusCode::BAD_GATEWAY, message),
            PollerError::AlreadyPolling(_) => api_error(StatusCode::CONFLICT, e.to_string()),
            PollerError::Backend(_) => api_error(StatusCode::BAD_GATEWAY, e.to_string()),
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalysisStateResponse {
            client_id: client_id.clone(),
            poller: PollerState::Polling { job_key: client_id },
            analysis: None,
            last_outcome: None,
        }),
    ))
}

/// GET /api/v1/analysis/{client_id} — poller state and latest snapshot.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<AnalysisStateResponse>, ApiError> {
    let poller = state
        .analyses
        .get(&client_id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("No analysis started for {client_id}")))?;

    Ok(Json(AnalysisStateResponse {
        client_id,
        poller: poller.state().await,
        analysis: poller.latest(),
        last_outcome: poller.last_outcome(),
    }))
}

/// DELETE /api/v1/analysis/{client_id} — stop polling.
pub async fn cancel_analysis(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Json<CancelResponse> {
    let cancelled = state.analyses.cancel(&client_id).await;
    Json(CancelResponse {
        client_id,
        cancelled,
    })
}
