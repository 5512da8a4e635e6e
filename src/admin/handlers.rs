use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::User, session::AdminUser},
    error::ApiResult,
    expenses::repo::Expense,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/expenses", get(list_expenses))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/reset", delete(reset_system))
}

#[derive(Debug, Serialize)]
pub struct AdminActionResponse {
    pub success: bool,
    pub message: String,
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<User>>> {
    // password hashes are skipped at serialization
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state, _admin))]
pub async fn list_expenses(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<Expense>>> {
    let expenses = Expense::list_all(&state.db).await?;
    Ok(Json(expenses))
}

/// Deletes the user, then their expenses. The two steps are sequential and
/// not transactional; a crash in between leaves orphaned expense rows.
#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AdminActionResponse>> {
    let users_removed = User::delete_by_id(&state.db, id).await?;
    let expenses_removed = Expense::clear_for_user(&state.db, id).await?;

    info!(
        admin = %admin.id,
        target = %id,
        users_removed,
        expenses_removed,
        "user deleted"
    );

    // success even when the id matched nothing
    Ok(Json(AdminActionResponse {
        success: true,
        message: "User deleted".into(),
    }))
}

/// Removes every non-admin user and every expense. Irreversible.
#[instrument(skip(state, admin))]
pub async fn reset_system(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<AdminActionResponse>> {
    let users_removed = User::delete_non_admins(&state.db).await?;
    let expenses_removed = Expense::delete_all(&state.db).await?;

    warn!(
        admin = %admin.id,
        users_removed,
        expenses_removed,
        "system reset"
    );

    Ok(Json(AdminActionResponse {
        success: true,
        message: "System reset complete".into(),
    }))
}
