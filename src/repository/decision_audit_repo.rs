// ==========================================
// 产能损失决策系统 - 决策审计数据仓储
// ==========================================
// 职责: decision_audit 表追加与查询
// 说明: 实现引擎层 DecisionAuditSink, 只追加不修改
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::audit::DecisionAudit;
use crate::engine::audit::DecisionAuditSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row, Result as SqliteResult};
use std::error::Error;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT audit_id, event_id, outcome, production_line, affect_date, affect_shift,
           dos_value, compensation_needed, recommendation, result_json, created_at
    FROM decision_audit
"#;

pub struct DecisionAuditRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DecisionAuditRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条审计记录
    pub fn insert(&self, audit: &DecisionAudit) -> RepositoryResult<String> {
        let result_json = serde_json::to_string(&audit.result_json)
            .map_err(|e| RepositoryError::InternalError(format!("审计结果序列化失败: {}", e)))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO decision_audit (
                audit_id, event_id, outcome, production_line, affect_date, affect_shift,
                dos_value, compensation_needed, recommendation, result_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                audit.audit_id,
                audit.event_id,
                audit.outcome,
                audit.production_line,
                audit.affect_date.format("%Y-%m-%d").to_string(),
                audit.affect_shift,
                audit.dos_value,
                audit.compensation_needed,
                audit.recommendation,
                result_json,
                audit.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(audit.audit_id.clone())
    }

    /// 最近的审计记录 (新在前)
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<DecisionAudit>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at DESC, rowid DESC LIMIT ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 某事件的全部审计记录
    pub fn list_by_event(&self, event_id: &str) -> RepositoryResult<Vec<DecisionAudit>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE event_id = ?1 ORDER BY created_at, rowid", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![event_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

impl DecisionAuditSink for DecisionAuditRepository {
    fn append(&self, audit: &DecisionAudit) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.insert(audit)?)
    }
}

fn map_row(row: &Row) -> SqliteResult<DecisionAudit> {
    let date_str: String = row.get(4)?;
    let result_json_str: String = row.get(9)?;
    let created_at_str: String = row.get(10)?;

    let affect_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let result_json = serde_json::from_str(&result_json_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at =
        NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(DecisionAudit {
        audit_id: row.get(0)?,
        event_id: row.get(1)?,
        outcome: row.get(2)?,
        production_line: row.get(3)?,
        affect_date,
        affect_shift: row.get(5)?,
        dos_value: row.get(6)?,
        compensation_needed: row.get(7)?,
        recommendation: row.get(8)?,
        result_json,
        created_at,
    })
}
