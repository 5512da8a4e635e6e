use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// How the expense entered the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "input_method", rename_all = "lowercase")]
pub enum InputMethod {
    #[default]
    Manual,
    Quick,
    Voice,
    Receipt,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    /// Calendar date the expense is booked on, distinct from `created_at`.
    pub date: Date,
    pub input_method: InputMethod,
    pub created_at: OffsetDateTime,
}

pub struct NewExpense<'a> {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub category: &'a str,
    pub description: &'a str,
    pub date: Date,
    pub input_method: InputMethod,
}

impl Expense {
    /// All expenses owned by `user_id`, newest-created-first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, amount, category, description, date, input_method, created_at
            FROM expenses
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, new: NewExpense<'_>) -> anyhow::Result<Expense> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (id, user_id, amount, category, description, date, input_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, amount, category, description, date, input_method, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.amount)
        .bind(new.category)
        .bind(new.description)
        .bind(new.date)
        .bind(new.input_method)
        .fetch_one(db)
        .await?;
        Ok(expense)
    }

    /// Delete an expense only if `user_id` owns it. Returns rows removed.
    pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every expense owned by `user_id`. Returns rows removed.
    pub async fn clear_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Every expense across all users, newest-created-first.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, amount, category, description, date, input_method, created_at
            FROM expenses
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn delete_all(db: &PgPool) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM expenses").execute(db).await?;
        Ok(result.rows_affected())
    }
}
