use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use notably::{
    models::note::{Note, NoteDraft, NoteSummary},
    notes::{ListQuery, Page},
};

async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<NoteSummary>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.notes.list(&user, &query).await?))
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    draft: Result<Json<NoteDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(draft) = draft?;
    let note = state.notes.create(&user, draft).await?;
    tracing::info!(note_id = note.id, %user, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

async fn show_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.get(&user, id).await?))
}

async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<u64>,
    draft: Result<Json<NoteDraft>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(draft) = draft?;
    Ok(Json(state.notes.update(&user, id, draft).await?))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.notes.delete(&user, id).await?;
    tracing::info!(note_id = id, %user, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/:id",
            get(show_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}
