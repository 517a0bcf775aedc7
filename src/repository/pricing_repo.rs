// ==========================================
// 接送预订系统 - 价格规则仓储
// ==========================================
// 职责: 价格规则的查询与更新
// ==========================================

use crate::domain::pricing::{PricingRule, PricingRuleUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct PricingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PricingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        // best-effort: do not fail app startup for a missing table; errors will surface when using it.
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("pricing_rules ensure failed: {}", e);
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
            CREATE TABLE IF NOT EXISTS pricing_rules (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              min_pax INTEGER NOT NULL,
              max_pax INTEGER NOT NULL,
              vehicle_name TEXT NOT NULL,
              vehicle_image TEXT,
              one_way_price REAL NOT NULL,
              return_price REAL NOT NULL,
              vehicle_features TEXT,
              detail_link TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// 按乘客数下限升序列出全部规则
    pub fn list_all(&self) -> RepositoryResult<Vec<PricingRule>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, min_pax, max_pax, vehicle_name, vehicle_image,
                   one_way_price, return_price, vehicle_features, detail_link
            FROM pricing_rules
            ORDER BY min_pax ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 全字段更新一条规则
    pub fn update(&self, id: i64, update: &PricingRuleUpdate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE pricing_rules
            SET min_pax = ?1, max_pax = ?2, vehicle_name = ?3,
                one_way_price = ?4, return_price = ?5, vehicle_features = ?6
            WHERE id = ?7
            "#,
            params![
                update.min_pax,
                update.max_pax,
                update.vehicle_name,
                update.one_way_price,
                update.return_price,
                update.vehicle_features,
                id,
            ],
        )?;
        Ok(rows)
    }

    /// 插入一条规则（种子数据/测试用）
    pub fn insert(&self, rule: &PricingRule) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pricing_rules (
              min_pax, max_pax, vehicle_name, vehicle_image,
              one_way_price, return_price, vehicle_features, detail_link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                rule.min_pax,
                rule.max_pax,
                rule.vehicle_name,
                rule.vehicle_image,
                rule.one_way_price,
                rule.return_price,
                rule.vehicle_features,
                rule.detail_link,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn map_row(row: &Row) -> SqliteResult<PricingRule> {
    Ok(PricingRule {
        id: row.get(0)?,
        min_pax: row.get(1)?,
        max_pax: row.get(2)?,
        vehicle_name: row.get(3)?,
        vehicle_image: row.get(4)?,
        one_way_price: row.get(5)?,
        return_price: row.get(6)?,
        vehicle_features: row.get(7)?,
        detail_link: row.get(8)?,
    })
}
