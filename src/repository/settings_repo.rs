// ==========================================
// 接送预订系统 - 设置记录仓储
// ==========================================
// 职责: 设置记录的整行读写（Record Store）
// 红线: 不含草稿/发布协议逻辑，协议由 SettingsApi 负责
// ==========================================

use crate::domain::settings::{HistoryEntry, SettingRecord, SETTING_TS_FORMAT};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// 设置记录仓储
///
/// 每个逻辑设置键一行；调用方总是整行读-改-写，
/// put 为整行替换语义。
pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        // best-effort: do not fail app startup for a missing table; errors will surface when using it.
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("settings ensure failed: {}", e);
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
            CREATE TABLE IF NOT EXISTS settings (
              key TEXT PRIMARY KEY,
              value TEXT,
              draft_value TEXT,
              history TEXT,
              updated_at TEXT,
              published_at TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// 按键读取一条记录
    pub fn get(&self, key: &str) -> RepositoryResult<Option<SettingRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT key, value, draft_value, history, updated_at, published_at
            FROM settings
            WHERE key = ?1
            "#,
        )?;

        match stmt.query_row(params![key], |row| map_row(row)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按键读取；不存在时返回空壳记录
    ///
    /// 首次写入前没有显式“创建”步骤，调用方拿空壳改完再 put 即可。
    pub fn get_or_default(&self, key: &str) -> RepositoryResult<SettingRecord> {
        Ok(self.get(key)?.unwrap_or_else(|| SettingRecord::empty(key)))
    }

    /// 整行替换写入（不存在则插入）
    pub fn put(&self, record: &SettingRecord) -> RepositoryResult<()> {
        let value_text = encode_json_column(record.value.as_ref())?;
        let draft_text = encode_json_column(record.draft_value.as_ref())?;
        let history_text = serde_json::to_string(&record.history)
            .map_err(|e| RepositoryError::InternalError(format!("历史序列化失败: {}", e)))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value, draft_value, history, updated_at, published_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(key) DO UPDATE SET
              value = excluded.value,
              draft_value = excluded.draft_value,
              history = excluded.history,
              updated_at = excluded.updated_at,
              published_at = excluded.published_at
            "#,
            params![
                record.key,
                value_text,
                draft_text,
                history_text,
                record
                    .updated_at
                    .map(|t| t.format(SETTING_TS_FORMAT).to_string()),
                record
                    .published_at
                    .map(|t| t.format(SETTING_TS_FORMAT).to_string()),
            ],
        )?;

        Ok(())
    }

    /// 读取全部记录（聚合设置接口用）
    pub fn list_all(&self) -> RepositoryResult<Vec<SettingRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT key, value, draft_value, history, updated_at, published_at
            FROM settings
            ORDER BY key
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn encode_json_column(value: Option<&Value>) -> RepositoryResult<Option<String>> {
    match value {
        Some(v) => serde_json::to_string(v)
            .map(Some)
            .map_err(|e| RepositoryError::InternalError(format!("设置值序列化失败: {}", e))),
        None => Ok(None),
    }
}

fn map_row(row: &Row) -> SqliteResult<SettingRecord> {
    let key: String = row.get(0)?;
    let value_text: Option<String> = row.get(1)?;
    let draft_text: Option<String> = row.get(2)?;
    let history_text: Option<String> = row.get(3)?;
    let updated_at_text: Option<String> = row.get(4)?;
    let published_at_text: Option<String> = row.get(5)?;

    Ok(SettingRecord {
        value: decode_json_column(&key, "value", value_text),
        draft_value: decode_json_column(&key, "draft_value", draft_text),
        history: decode_history(&key, history_text),
        updated_at: parse_ts(updated_at_text),
        published_at: parse_ts(published_at_text),
        key,
    })
}

/// 解码不透明 JSON 列
///
/// 解码失败的列按“缺失”处理：读取路径不能因为一条脏数据而整体失败。
fn decode_json_column(key: &str, column: &str, raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("设置 {} 的 {} 列无法解析，按缺失处理: {}", key, column, e);
            None
        }
    }
}

/// 解码历史列；无法解析时按空历史处理
fn decode_history(key: &str, raw: Option<String>) -> Vec<HistoryEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("设置 {} 的 history 列无法解析，按空历史处理: {}", key, e);
            Vec::new()
        }
    }
}

fn parse_ts(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(&s, SETTING_TS_FORMAT).ok())
}
