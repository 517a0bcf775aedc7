// ==========================================
// 接送预订系统 - 媒体仓储
// ==========================================
// 职责: 已上传图片目录的查询与登记
// ==========================================

use crate::domain::media::Photo;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct MediaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MediaRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        // best-effort: do not fail app startup for a missing table; errors will surface when using it.
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("photos ensure failed: {}", e);
        }
        repo
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS photos (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              filename TEXT NOT NULL,
              original_path TEXT,
              optimized_path TEXT,
              upload_date TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// 按上传时间倒序列出全部图片
    pub fn list_all(&self) -> RepositoryResult<Vec<Photo>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, filename, original_path, optimized_path, upload_date
            FROM photos
            ORDER BY upload_date DESC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 登记一张已优化的图片
    pub fn insert(&self, filename: &str, optimized_path: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO photos (filename, optimized_path) VALUES (?1, ?2)",
            params![filename, optimized_path],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn map_row(row: &Row) -> SqliteResult<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_path: row.get(2)?,
        optimized_path: row.get(3)?,
        upload_date: row.get(4)?,
    })
}
