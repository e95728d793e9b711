use sqlx::SqlitePool;
use time::{Date, OffsetDateTime};

/// User record in the database. `password_hash` is present iff the account
/// uses local password sign-in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub provider: String,
    pub points: i64,
    pub streak: i64,
    pub last_complete_date: Option<Date>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by normalized email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, provider, points, streak,
                   last_complete_date, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, provider, points, streak,
                   last_complete_date, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a local-provider user with a hashed password.
    pub async fn create(
        db: &SqlitePool,
        name: &str,
        email: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, provider, created_at)
            VALUES (?, ?, ?, 'local', ?)
            RETURNING id, email, name, password_hash, provider, points, streak,
                      last_complete_date, created_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
