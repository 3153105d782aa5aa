use sqlx::SqlitePool;
use tvarr_core::QualityGroup;

use crate::DbError;

type QualityGroupRow = (i64, String, String, bool);

fn group_from_row(r: QualityGroupRow) -> Result<QualityGroup, DbError> {
    let qualities = QualityGroup::parse_qualities_csv(&r.2)
        .map_err(|e| DbError::Corrupt(format!("quality group {}: {e}", r.1)))?;
    Ok(QualityGroup {
        id: r.0,
        name: r.1,
        qualities,
        is_default: r.3,
    })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<QualityGroup>, DbError> {
    let rows: Vec<QualityGroupRow> =
        sqlx::query_as("SELECT id, name, qualities, is_default FROM quality_group ORDER BY id")
            .fetch_all(pool)
            .await?;
    rows.into_iter().map(group_from_row).collect()
}

/// Group assigned to shows that don't name one.
pub async fn get_default(pool: &SqlitePool) -> Result<Option<QualityGroup>, DbError> {
    let row: Option<QualityGroupRow> = sqlx::query_as(
        "SELECT id, name, qualities, is_default FROM quality_group \
         WHERE is_default = 1 ORDER BY id LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    row.map(group_from_row).transpose()
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<QualityGroup>, DbError> {
    let row: Option<QualityGroupRow> =
        sqlx::query_as("SELECT id, name, qualities, is_default FROM quality_group WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(group_from_row).transpose()
}
