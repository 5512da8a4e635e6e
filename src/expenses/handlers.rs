use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::session::SessionUser,
    error::{ApiError, ApiResult},
    expenses::{
        dto::{CreateExpenseRequest, MessageResponse},
        repo::{Expense, NewExpense},
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        // :id doubles as the user id for GET, per the original API shape
        .route("/expenses/:id", get(list_expenses).delete(delete_expense))
        .route("/expenses", post(create_expense))
        .route("/expenses/clear/:id", delete(clear_expenses))
}

/// The acting identity always comes from the session; a client-supplied
/// user id is only ever cross-checked against it.
fn require_owner(session_user: Uuid, claimed: Uuid) -> Result<(), ApiError> {
    if session_user != claimed {
        warn!(%session_user, %claimed, "expense access across users denied");
        return Err(ApiError::Unauthorized(
            "Cannot access another user's expenses".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    SessionUser(session_user): SessionUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Expense>>> {
    require_owner(session_user, user_id)?;

    let expenses = Expense::list_by_user(&state.db, user_id).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    SessionUser(session_user): SessionUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<Json<Expense>> {
    require_owner(session_user, payload.user_id)?;
    payload.validate()?;

    let expense = Expense::create(
        &state.db,
        NewExpense {
            user_id: payload.user_id,
            amount: payload.amount,
            category: &payload.category,
            description: &payload.description,
            date: payload.date,
            input_method: payload.input_method,
        },
    )
    .await?;

    info!(expense_id = %expense.id, user_id = %expense.user_id, "expense recorded");
    Ok(Json(expense))
}

/// Deletion is idempotent: 200 whether or not a row was removed. The delete
/// is scoped to the session user, so a foreign id removes nothing.
#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    SessionUser(session_user): SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = Expense::delete_owned(&state.db, id, session_user).await?;
    if removed == 0 {
        debug!(expense_id = %id, user_id = %session_user, "delete matched nothing");
    }

    Ok(Json(MessageResponse {
        message: "Deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn clear_expenses(
    State(state): State<AppState>,
    SessionUser(session_user): SessionUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_owner(session_user, user_id)?;

    let removed = Expense::clear_for_user(&state.db, user_id).await?;
    info!(%user_id, removed, "expenses cleared");

    Ok(Json(MessageResponse {
        message: "All expenses cleared".into(),
    }))
}
