use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use typeb_core::config::Config;
use typeb_core::family::{self, Family};
use typeb_core::TypebError;

#[derive(serde::Deserialize)]
pub struct CreateFamilyBody {
    pub id: String,
    pub name: String,
    pub creator_id: String,
    pub creator_name: String,
}

/// POST /api/families: create a family; the creator becomes a parent.
pub async fn create_family(
    State(app): State<AppState>,
    Json(body): Json<CreateFamilyBody>,
) -> Result<Json<Family>, AppError> {
    let root = app.root.clone();
    let created = tokio::task::spawn_blocking(move || {
        family::create(&root, &body.id, body.name, &body.creator_id, body.creator_name)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(created))
}

/// GET /api/families: list all families.
pub async fn list_families(
    State(app): State<AppState>,
) -> Result<Json<Vec<Family>>, AppError> {
    let root = app.root.clone();
    let families = tokio::task::spawn_blocking(move || Family::list(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(families))
}

/// GET /api/families/:id: fetch a single family.
pub async fn get_family(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Family>, AppError> {
    let root = app.root.clone();
    let found = tokio::task::spawn_blocking(move || Family::load(&root, &id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(found))
}

#[derive(serde::Deserialize)]
pub struct JoinBody {
    pub invite_code: String,
    pub user_id: String,
    pub user_name: String,
}

/// POST /api/families/join: join via invite code, subject to the plan's
/// member limit.
pub async fn join_family(
    State(app): State<AppState>,
    Json(body): Json<JoinBody>,
) -> Result<Json<Family>, AppError> {
    let root = app.root.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        family::join(
            &root,
            &body.invite_code,
            &body.user_id,
            body.user_name,
            &config,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(joined))
}

#[derive(serde::Deserialize)]
pub struct MemberBody {
    pub user_id: String,
}

/// POST /api/families/:id/promote: make a member a parent.
pub async fn promote_member(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MemberBody>,
) -> Result<Json<Family>, AppError> {
    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || {
        Ok::<_, TypebError>(family::promote(&root, &id, &body.user_id)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(updated))
}

/// POST /api/families/:id/remove: remove a member (last parent is kept).
pub async fn remove_member(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MemberBody>,
) -> Result<Json<Family>, AppError> {
    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || {
        Ok::<_, TypebError>(family::remove_member(&root, &id, &body.user_id)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(updated))
}
