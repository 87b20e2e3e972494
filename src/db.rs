use anyhow::{Context, Result};
use bcrypt::{hash, DEFAULT_COST};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::auth::Role;

pub type DbPool = Pool<Postgres>;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sentiment: String,
    pub message: String,
}

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    Ok(pool)
}

// ============================================================================
// Users
// ============================================================================

pub async fn create_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User> {
    let password_hash = hash(password, DEFAULT_COST)?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, password_hash, role
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn verify_password(user: &User, password: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, &user.password_hash)?)
}

/// Insert the configured admin account if no admin exists yet.
/// Runs once at auth-service startup.
pub async fn seed_admin(pool: &DbPool, username: &str, email: &str, password: &str) -> Result<()> {
    let admin_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .context("Failed to count admin users")?;

    if admin_count > 0 {
        tracing::info!("Admin user already exists, skipping seed");
        return Ok(());
    }

    create_user(pool, username, email, password, Role::Admin)
        .await
        .context("Failed to seed admin user")?;

    tracing::info!(username = %username, "Admin user seeded");
    Ok(())
}

// ============================================================================
// Feedback
// ============================================================================

pub async fn insert_feedback(
    pool: &DbPool,
    user_id: &Uuid,
    sentiment: &str,
    message: &str,
) -> Result<Feedback> {
    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedbacks (user_id, sentiment, message)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, sentiment, message
        "#,
    )
    .bind(user_id)
    .bind(sentiment)
    .bind(message)
    .fetch_one(pool)
    .await?;

    Ok(feedback)
}

pub async fn list_feedback(pool: &DbPool) -> Result<Vec<Feedback>> {
    let feedbacks = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, user_id, sentiment, message
        FROM feedbacks
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(feedbacks)
}

pub async fn get_feedback_by_id(pool: &DbPool, id: &Uuid) -> Result<Option<Feedback>> {
    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, user_id, sentiment, message
        FROM feedbacks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(feedback)
}

/// Case-insensitive substring match on sentiment.
pub async fn search_feedback(pool: &DbPool, query: &str) -> Result<Vec<Feedback>> {
    let feedbacks = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, user_id, sentiment, message
        FROM feedbacks
        WHERE sentiment ILIKE $1
        "#,
    )
    .bind(format!("%{}%", query))
    .fetch_all(pool)
    .await?;

    Ok(feedbacks)
}

/// Returns true when a row was actually deleted.
pub async fn delete_feedback(pool: &DbPool, id: &Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
