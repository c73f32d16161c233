use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use notably::analytics::{summarize, AnalyticsSummary};

async fn analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let notes = state.notes.all_for_user(&user).await?;
    Ok(Json(summarize(&notes)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/analytics", get(analytics))
        .with_state(state)
}
