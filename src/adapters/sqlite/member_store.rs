//! SQLite implementation of the MemberStore.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::MemberRecord;
use crate::domain::ports::MemberStore;

use super::{parse_datetime, parse_xp};

#[derive(Clone)]
pub struct SqliteMemberStore {
    pool: SqlitePool,
}

impl SqliteMemberStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Create the member with zero XP, or refresh its display name.
///
/// Without a name a new row is named after its id and an existing row keeps
/// its current name.
pub(crate) async fn upsert_member(
    conn: &mut SqliteConnection,
    member_id: &str,
    display_name: Option<&str>,
) -> DomainResult<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"INSERT INTO members (member_id, display_name, total_xp, created_at, updated_at)
           VALUES (?, COALESCE(?, ?), 0, ?, ?)
           ON CONFLICT(member_id) DO UPDATE SET
               display_name = COALESCE(?, members.display_name),
               updated_at = excluded.updated_at"#,
    )
    .bind(member_id)
    .bind(display_name)
    .bind(member_id)
    .bind(&now)
    .bind(&now)
    .bind(display_name)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add XP to an existing member and return the new total.
///
/// The read-modify-write happens inside SQLite, so concurrent increments for
/// the same member are serialized by the database write lock.
pub(crate) async fn increment_xp(
    conn: &mut SqliteConnection,
    member_id: &str,
    xp: u32,
) -> DomainResult<u64> {
    let new_total: Option<i64> = sqlx::query_scalar(
        r#"UPDATE members SET total_xp = total_xp + ?, updated_at = ?
           WHERE member_id = ?
           RETURNING total_xp"#,
    )
    .bind(i64::from(xp))
    .bind(Utc::now().to_rfc3339())
    .bind(member_id)
    .fetch_optional(&mut *conn)
    .await?;

    let new_total = new_total.ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;
    parse_xp(new_total)
}

#[async_trait]
impl MemberStore for SqliteMemberStore {
    async fn get(&self, member_id: &str) -> DomainResult<Option<MemberRecord>> {
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT member_id, display_name, total_xp, created_at, updated_at FROM members WHERE member_id = ?",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn sync_profile(&self, member_id: &str, display_name: &str) -> DomainResult<MemberRecord> {
        let mut conn = self.pool.acquire().await?;
        upsert_member(&mut *conn, member_id, Some(display_name)).await?;
        drop(conn);

        self.get(member_id)
            .await?
            .ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))
    }

    async fn list_by_xp(&self, limit: Option<usize>) -> DomainResult<Vec<MemberRecord>> {
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"SELECT member_id, display_name, total_xp, created_at, updated_at FROM members
               ORDER BY total_xp DESC, display_name ASC, member_id ASC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn repair_total_xp(&self, member_id: &str) -> DomainResult<u64> {
        let repaired: Option<i64> = sqlx::query_scalar(
            r#"UPDATE members SET
                   total_xp = (SELECT COALESCE(SUM(xp_earned), 0) FROM completions
                               WHERE completions.member_id = members.member_id),
                   updated_at = ?
               WHERE member_id = ?
               RETURNING total_xp"#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        let repaired = repaired.ok_or_else(|| DomainError::MemberNotFound(member_id.to_string()))?;
        parse_xp(repaired)
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    member_id: String,
    display_name: String,
    total_xp: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MemberRow> for MemberRecord {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(MemberRecord {
            member_id: row.member_id,
            display_name: row.display_name,
            total_xp: parse_xp(row.total_xp)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
