// ==========================================
// 产能损失决策系统 - 损失事件数据仓储
// ==========================================
// 职责: loss_event 表读写; 为引擎提供历史损失查询
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::loss_event::{HistoricalLossRecord, LossEvent};
use crate::domain::shift::SlotKey;
use crate::domain::types::ShiftCode;
use crate::engine::accessors::LossHistoryAccessor;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT event_id, affect_date, affect_shift, production_line, part_number,
           lost_quantity, remaining_repair_hours, created_at
    FROM loss_event
"#;

// ==========================================
// LossEventRepository - 损失事件仓储
// ==========================================
pub struct LossEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LossEventRepository {
    /// 创建新的 LossEventRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 记录一条损失事件
    ///
    /// # 返回
    /// - Ok(HistoricalLossRecord): 带 event_id 与创建时间的已存记录
    /// - Err(ValidationError): 事件字段非法
    pub fn insert(&self, event: &LossEvent) -> RepositoryResult<HistoricalLossRecord> {
        event.validate().map_err(RepositoryError::ValidationError)?;

        let record = HistoricalLossRecord {
            event_id: Uuid::new_v4().to_string(),
            date: event.date,
            shift: event.shift,
            line: event.line.clone(),
            part_number: Some(event.part_number.clone()),
            lost_quantity: event.lost_quantity,
            remaining_repair_hours: event.remaining_repair_hours,
            created_at: Utc::now().naive_utc(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO loss_event (
                event_id, affect_date, affect_shift, production_line, part_number,
                lost_quantity, remaining_repair_hours, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.event_id,
                record.date.format("%Y-%m-%d").to_string(),
                record.shift.to_string(),
                record.line,
                record.part_number,
                record.lost_quantity,
                record.remaining_repair_hours,
                record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        tracing::info!(
            event_id = %record.event_id,
            line = %record.line,
            slot = %record.slot_key(),
            lost_quantity = record.lost_quantity,
            "损失事件已记录"
        );
        Ok(record)
    }

    /// 按 event_id 查询
    pub fn find_by_id(&self, event_id: &str) -> RepositoryResult<Option<HistoricalLossRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE event_id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![event_id], map_row)
            .optional()?;
        Ok(record)
    }

    /// 查询某产线某日的全部损失事件 (按班次、创建时间排序)
    pub fn list_by_line_and_date(
        &self,
        line: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<HistoricalLossRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE production_line = ?1 AND affect_date = ?2 ORDER BY affect_shift, created_at",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![line.trim(), date.format("%Y-%m-%d").to_string()], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 全部损失事件, 供构建内存快照
    pub fn list_all(&self) -> RepositoryResult<Vec<HistoricalLossRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} ORDER BY affect_date, affect_shift, created_at",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 删除损失事件
    ///
    /// 关联的决策审计保留, event_id 置空
    pub fn delete(&self, event_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM loss_event WHERE event_id = ?1", params![event_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "LossEvent".to_string(),
                id: event_id.to_string(),
            });
        }
        Ok(())
    }

    /// 指定产线、指定班次的损失合计
    ///
    /// # 返回
    /// - Ok(Some(qty)): 至少一条记录, 多条时合计
    /// - Ok(None): 无记录
    pub fn sum_loss(&self, line: &str, slot: &SlotKey) -> RepositoryResult<Option<f64>> {
        let conn = self.get_conn()?;
        let (count, total): (i64, Option<f64>) = conn.query_row(
            r#"
            SELECT COUNT(*), SUM(lost_quantity)
            FROM loss_event
            WHERE production_line = ?1 AND affect_date = ?2 AND affect_shift = ?3
            "#,
            params![
                line.trim(),
                slot.date.format("%Y-%m-%d").to_string(),
                slot.shift.to_string()
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if count == 0 {
            return Ok(None);
        }
        Ok(Some(total.unwrap_or(0.0)))
    }
}

impl LossHistoryAccessor for LossEventRepository {
    fn loss_for(&self, line: &str, slot: &SlotKey) -> EngineResult<Option<f64>> {
        self.sum_loss(line, slot)
            .map_err(|e| EngineError::History(e.to_string()))
    }
}

fn map_row(row: &Row) -> SqliteResult<HistoricalLossRecord> {
    let date_str: String = row.get(1)?;
    let shift_str: String = row.get(2)?;
    let created_at_str: String = row.get(7)?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let shift = ShiftCode::parse(&shift_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("未知班次代码: {}", shift_str).into(),
        )
    })?;
    let created_at =
        NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(HistoricalLossRecord {
        event_id: row.get(0)?,
        date,
        shift,
        line: row.get(3)?,
        part_number: row.get(4)?,
        lost_quantity: row.get(5)?,
        remaining_repair_hours: row.get(6)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn repo() -> LossEventRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        LossEventRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let repo = repo();
        let saved = repo
            .insert(&LossEvent::new(d(1), ShiftCode::T2, " F16 ", "200723400", 400.0, 1.5))
            .unwrap();
        let found = repo.find_by_id(&saved.event_id).unwrap().unwrap();
        assert_eq!(found.line, "F16");
        assert_eq!(found.shift, ShiftCode::T2);
        assert_eq!(found.lost_quantity, 400.0);
        assert_eq!(found.part_number.as_deref(), Some("200723400"));
    }

    #[test]
    fn test_insert_rejects_invalid_event() {
        let repo = repo();
        let result = repo.insert(&LossEvent::new(d(1), ShiftCode::T2, "F16", "", 1.0, 0.0));
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }

    #[test]
    fn test_loss_for_sums_same_slot_exact_match() {
        let repo = repo();
        repo.insert(&LossEvent::new(d(1), ShiftCode::T1, "F16", "A", 300.0, 0.0)).unwrap();
        repo.insert(&LossEvent::new(d(1), ShiftCode::T1, "F16", "B", 200.0, 0.0)).unwrap();
        repo.insert(&LossEvent::new(d(1), ShiftCode::T1, "F17", "A", 900.0, 0.0)).unwrap();

        let slot = SlotKey::new(d(1), ShiftCode::T1);
        assert_eq!(repo.loss_for("F16", &slot).unwrap(), Some(500.0));
        assert_eq!(repo.loss_for("F17", &slot).unwrap(), Some(900.0));
        assert_eq!(repo.loss_for("F16", &SlotKey::new(d(1), ShiftCode::T2)).unwrap(), None);
    }

    #[test]
    fn test_list_and_delete() {
        let repo = repo();
        let a = repo.insert(&LossEvent::new(d(1), ShiftCode::T3, "F16", "A", 1.0, 0.0)).unwrap();
        repo.insert(&LossEvent::new(d(1), ShiftCode::T1, "F16", "A", 2.0, 0.0)).unwrap();
        repo.insert(&LossEvent::new(d(2), ShiftCode::T1, "F16", "A", 3.0, 0.0)).unwrap();

        let listed = repo.list_by_line_and_date("F16", d(1)).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].shift, ShiftCode::T1);
        assert_eq!(repo.list_all().unwrap().len(), 3);

        repo.delete(&a.event_id).unwrap();
        assert!(repo.find_by_id(&a.event_id).unwrap().is_none());
        assert!(matches!(
            repo.delete(&a.event_id),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
