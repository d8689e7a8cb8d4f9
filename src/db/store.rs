//! Row-level access to the `trees` and `admin_users` tables.
//!
//! The store knows nothing about view shapes, fallbacks or images; it only
//! moves rows in and out.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{AdminUser, NewTreeRow, TreeRow};

/// Row store for all catalog data.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== TREE ROWS ====================

    /// List all tree rows in insertion order.
    pub async fn list_tree_rows(&self) -> Result<Vec<TreeRow>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, scientific_name, family, common_name_english, common_name_malayalam,
                      native_range, location, description, image_url, added_date
               FROM trees ORDER BY rowid"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tree_row_from).collect())
    }

    /// Get a tree row by ID.
    pub async fn get_tree_row(&self, id: &str) -> Result<Option<TreeRow>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, scientific_name, family, common_name_english, common_name_malayalam,
                      native_range, location, description, image_url, added_date
               FROM trees WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(tree_row_from))
    }

    /// Insert a tree row; the store assigns `id` and `added_date`.
    pub async fn insert_tree_row(&self, new_row: &NewTreeRow) -> Result<TreeRow, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(
            r#"INSERT INTO trees (
                id, scientific_name, family, common_name_english, common_name_malayalam,
                native_range, location, description, image_url, added_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, scientific_name, family, common_name_english, common_name_malayalam,
                      native_range, location, description, image_url, added_date"#,
        )
        .bind(&id)
        .bind(&new_row.scientific_name)
        .bind(&new_row.family)
        .bind(&new_row.common_name_english)
        .bind(&new_row.common_name_malayalam)
        .bind(&new_row.native_range)
        .bind(&new_row.location)
        .bind(&new_row.description)
        .bind(&new_row.image_url)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(tree_row_from(&row))
    }

    /// Delete a tree row. Returns whether a row was removed.
    pub async fn delete_tree_row(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM trees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Point a tree row at a new image. Returns the updated row, if any.
    pub async fn update_tree_image(
        &self,
        id: &str,
        image_url: Option<&str>,
    ) -> Result<Option<TreeRow>, AppError> {
        let row = sqlx::query(
            r#"UPDATE trees SET image_url = ? WHERE id = ?
               RETURNING id, scientific_name, family, common_name_english, common_name_malayalam,
                         native_range, location, description, image_url, added_date"#,
        )
        .bind(image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(tree_row_from))
    }

    // ==================== ADMIN USERS ====================

    /// Find an admin account by exact username.
    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, AppError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM admin_users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| AdminUser {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }))
    }

    /// Create an admin account, or reset the password of an existing one.
    pub async fn upsert_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUser, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO admin_users (id, username, password_hash, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash"#,
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_admin(username)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Admin {} vanished after upsert", username)))
    }
}

fn tree_row_from(row: &sqlx::sqlite::SqliteRow) -> TreeRow {
    TreeRow {
        id: row.get("id"),
        scientific_name: row.get("scientific_name"),
        family: row.get("family"),
        common_name_english: row.get("common_name_english"),
        common_name_malayalam: row.get("common_name_malayalam"),
        native_range: row.get("native_range"),
        location: row.get("location"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        added_date: row.get("added_date"),
    }
}
