use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::api::{RankRequest, RankResponse, SelectionAction, SelectionRequest, SelectionResponse};
use crate::routes::{api_error, ApiError};
use crate::services::ranking::{filter_keywords, ranked_view};
use crate::services::selection::KeywordSelection;

fn invalid(report: garde::Report) -> ApiError {
    api_error(StatusCode::UNPROCESSABLE_ENTITY, report.to_string())
}

/// POST /api/v1/keywords/rank — filtered, sorted and scored candidate view.
pub async fn rank_keywords(Json(request): Json<RankRequest>) -> Result<Json<RankResponse>, ApiError> {
    request.validate().map_err(invalid)?;

    let keywords = ranked_view(&request.candidates, &request.context(), &request.query(), request.sort);
    Ok(Json(RankResponse {
        total: request.candidates.len(),
        keywords,
    }))
}

/// POST /api/v1/keywords/selection — apply one action to a caller-owned selection.
pub async fn apply_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    request.validate().map_err(invalid)?;

    let max_selections = request.max_selections.unwrap_or(state.max_selections);
    let mut selection = KeywordSelection::with_initial(request.selected.iter().cloned(), max_selections);
    let ctx = request.context();
    let filtered = filter_keywords(&request.candidates, &ctx, &request.query());

    let mut toggle = None;
    match &request.action {
        SelectionAction::Toggle { keyword } => {
            let target = request
                .candidates
                .iter()
                .chain(request.selected.iter())
                .find(|k| &k.keyword == keyword)
                .ok_or_else(|| {
                    api_error(StatusCode::UNPROCESSABLE_ENTITY, format!("Unknown keyword: {keyword}"))
                })?;
            toggle = Some(selection.toggle(target));
        }
        SelectionAction::AutoSelectRelevant => selection.auto_select_relevant(&filtered, &ctx),
        SelectionAction::HighVolumeLowDifficulty => selection.select_high_volume_low_difficulty(&filtered),
        SelectionAction::Clear => selection.clear(),
    }

    Ok(Json(SelectionResponse {
        primary: selection.primary().cloned(),
        secondary: selection.secondary().to_vec(),
        max_selections: selection.max_selections(),
        is_full: selection.is_full(),
        selected: selection.into_keywords(),
        toggle,
    }))
}
