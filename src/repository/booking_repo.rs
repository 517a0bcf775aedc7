// ==========================================
// 接送预订系统 - 预订仓储
// ==========================================
// 职责: 预订的增删改查、归档与回收站
// ==========================================

use crate::domain::booking::{Booking, BookingFilter, BookingUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row, ToSql};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct BookingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        // best-effort: do not fail app startup for a missing table; errors will surface when using it.
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("bookings ensure failed: {}", e);
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
            CREATE TABLE IF NOT EXISTS bookings (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              customer_name TEXT NOT NULL,
              email TEXT NOT NULL,
              phone TEXT,
              pickup_location TEXT NOT NULL,
              dropoff_location TEXT NOT NULL,
              flight_time TEXT,
              pickup_time TEXT NOT NULL,
              is_return INTEGER NOT NULL DEFAULT 0,
              status TEXT NOT NULL DEFAULT 'pending',
              hotel_name TEXT,
              flight_number TEXT,
              note TEXT,
              passenger_count INTEGER NOT NULL DEFAULT 1,
              price TEXT NOT NULL DEFAULT '0',
              payment_status TEXT NOT NULL DEFAULT 'Pending'
                CHECK(payment_status IN ('Pending', 'Paid', 'Failed')),
              driver_name TEXT,
              driver_phone TEXT,
              is_archived INTEGER NOT NULL DEFAULT 0,
              deleted_at TEXT,
              created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
            "#,
        )?;

        // 旧库迁移列：重复添加会报 duplicate column，忽略即可
        for (name, col_type) in [
            ("driver_name", "TEXT"),
            ("driver_phone", "TEXT"),
            ("is_archived", "INTEGER DEFAULT 0"),
            ("deleted_at", "TEXT"),
        ] {
            let _ = conn.execute(
                &format!("ALTER TABLE bookings ADD COLUMN {} {}", name, col_type),
                [],
            );
        }

        Ok(())
    }

    /// 插入一条预订，返回自增 id
    pub fn insert(&self, booking: &Booking) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO bookings (
              customer_name, email, phone, pickup_location, dropoff_location,
              flight_time, pickup_time, is_return, status, hotel_name,
              flight_number, note, passenger_count, price, payment_status
            ) VALUES (
              ?1, ?2, ?3, ?4, ?5,
              ?6, ?7, ?8, ?9, ?10,
              ?11, ?12, ?13, ?14, ?15
            )
            "#,
            params![
                booking.customer_name,
                booking.email,
                booking.phone,
                booking.pickup_location,
                booking.dropoff_location,
                booking.flight_time,
                booking.pickup_time,
                if booking.is_return { 1 } else { 0 },
                booking.status,
                booking.hotel_name,
                booking.flight_number,
                booking.note,
                booking.passenger_count,
                booking.price,
                booking.payment_status,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookings WHERE id = ?1",
            SELECT_COLUMNS
        ))?;

        match stmt.query_row(params![id], |row| map_row(row)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按过滤器列出预订，创建时间倒序
    pub fn list(&self, filter: BookingFilter) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;

        let mut sql = format!("SELECT {} FROM bookings WHERE 1=1", SELECT_COLUMNS);
        match filter {
            BookingFilter::Trash => sql.push_str(" AND deleted_at IS NOT NULL"),
            BookingFilter::Archived => {
                sql.push_str(" AND deleted_at IS NULL AND is_archived = 1")
            }
            BookingFilter::Active => {
                sql.push_str(" AND deleted_at IS NULL AND (is_archived = 0 OR is_archived IS NULL)")
            }
            BookingFilter::All => sql.push_str(" AND deleted_at IS NULL"),
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 部分更新：只生成出现字段的 SET 子句
    pub fn update_fields(&self, id: i64, update: &BookingUpdate) -> RepositoryResult<usize> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref status) = update.status {
            sets.push("status = ?");
            values.push(Box::new(status.clone()));
        }
        if let Some(ref note) = update.note {
            sets.push("note = ?");
            values.push(Box::new(note.clone()));
        }
        if let Some(ref price) = update.price {
            sets.push("price = ?");
            values.push(Box::new(price.clone()));
        }
        if let Some(ref payment_status) = update.payment_status {
            sets.push("payment_status = ?");
            values.push(Box::new(payment_status.clone()));
        }
        if let Some(is_archived) = update.is_archived {
            sets.push("is_archived = ?");
            values.push(Box::new(if is_archived { 1i64 } else { 0i64 }));
        }
        if let Some(ref driver_name) = update.driver_name {
            sets.push("driver_name = ?");
            values.push(Box::new(driver_name.clone()));
        }
        if let Some(ref driver_phone) = update.driver_phone {
            sets.push("driver_phone = ?");
            values.push(Box::new(driver_phone.clone()));
        }

        if sets.is_empty() {
            return Ok(0);
        }

        values.push(Box::new(id));
        let sql = format!("UPDATE bookings SET {} WHERE id = ?", sets.join(", "));

        let conn = self.get_conn()?;
        let params = rusqlite::params_from_iter(values.iter().map(|v| v.as_ref()));
        let rows = conn.execute(&sql, params)?;
        Ok(rows)
    }

    /// 软删除（移入回收站）
    pub fn trash(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE bookings SET deleted_at = datetime('now') WHERE id = ?1",
            params![id],
        )?;
        Ok(rows)
    }

    /// 从回收站恢复
    pub fn restore(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE bookings SET deleted_at = NULL WHERE id = ?1",
            params![id],
        )?;
        Ok(rows)
    }

    /// 物理删除
    pub fn force_delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// 清空归档区
    pub fn empty_archive(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM bookings WHERE is_archived = 1", [])?;
        Ok(rows)
    }
}

const SELECT_COLUMNS: &str = "id, customer_name, email, phone, pickup_location, dropoff_location, \
     flight_time, pickup_time, is_return, status, hotel_name, flight_number, note, \
     passenger_count, price, payment_status, driver_name, driver_phone, is_archived, \
     deleted_at, created_at";

fn map_row(row: &Row) -> SqliteResult<Booking> {
    let is_return_int: i64 = row.get(8)?;
    let is_archived_int: Option<i64> = row.get(18)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        pickup_location: row.get(4)?,
        dropoff_location: row.get(5)?,
        flight_time: row.get(6)?,
        pickup_time: row.get(7)?,
        is_return: is_return_int != 0,
        status: row.get(9)?,
        hotel_name: row.get(10)?,
        flight_number: row.get(11)?,
        note: row.get(12)?,
        passenger_count: row.get(13)?,
        price: row.get(14)?,
        payment_status: row.get(15)?,
        driver_name: row.get(16)?,
        driver_phone: row.get(17)?,
        is_archived: is_archived_int.unwrap_or(0) != 0,
        deleted_at: row.get(19)?,
        created_at: row.get(20)?,
    })
}
