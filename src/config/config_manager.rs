// ==========================================
// 产能损失决策系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::decision_config::{
    default_line_capacities, DecisionConfig, DEFAULT_COMPENSATION_LOOKAHEAD_SHIFTS,
    DEFAULT_ESCALATION_LOOKBACK_SHIFTS, DEFAULT_ESCALATION_LOSS_THRESHOLD,
    DEFAULT_LINE_CAPACITY, DEFAULT_MAINTENANCE_HOURS, DEFAULT_MIN_DOS_THRESHOLD,
    DEFAULT_SHIFT_HOURS,
};
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 删除 global scope 的配置值, 之后读取回落到默认值
    pub fn reset_config_value(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    // ===== 类型化读取 =====

    /// 读取并解析数值配置; 缺失或格式错误时回落默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 读取 JSON 配置; 缺失或格式错误时回落默认值
    fn get_json_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    error = %e,
                    "JSON 配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    pub fn get_min_dos_threshold(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::MIN_DOS_THRESHOLD, DEFAULT_MIN_DOS_THRESHOLD)
    }

    pub fn set_min_dos_threshold(&self, threshold: f64) -> RepositoryResult<()> {
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(RepositoryError::FieldValueError {
                field: config_keys::MIN_DOS_THRESHOLD.to_string(),
                message: format!("最小DOS阈值不能为负: {}", threshold),
            });
        }
        self.set_config_value(config_keys::MIN_DOS_THRESHOLD, &threshold.to_string())
    }

    pub fn get_shift_hours(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::SHIFT_HOURS, DEFAULT_SHIFT_HOURS)
    }

    pub fn get_escalation_loss_threshold(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(
            config_keys::ESCALATION_LOSS_THRESHOLD,
            DEFAULT_ESCALATION_LOSS_THRESHOLD,
        )
    }

    pub fn get_escalation_lookback_shifts(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(
            config_keys::ESCALATION_LOOKBACK_SHIFTS,
            DEFAULT_ESCALATION_LOOKBACK_SHIFTS,
        )
    }

    pub fn get_compensation_lookahead_shifts(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(
            config_keys::COMPENSATION_LOOKAHEAD_SHIFTS,
            DEFAULT_COMPENSATION_LOOKAHEAD_SHIFTS,
        )
    }

    pub fn get_maintenance_hours(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::MAINTENANCE_HOURS, DEFAULT_MAINTENANCE_HOURS)
    }

    pub fn get_default_line_capacity(&self) -> RepositoryResult<f64> {
        self.get_parsed_or_default(config_keys::DEFAULT_LINE_CAPACITY, DEFAULT_LINE_CAPACITY)
    }

    /// 产线产能配置, 格式为 JSON: {"F16": 6000, "F25": 2800}
    pub fn get_line_capacities(&self) -> RepositoryResult<BTreeMap<String, f64>> {
        self.get_json_or_default(config_keys::LINE_CAPACITIES, default_line_capacities())
    }

    /// 基准预测行映射, 格式为 JSON: {"F16B": "F16"}
    pub fn get_baseline_row_mapping(&self) -> RepositoryResult<BTreeMap<String, String>> {
        self.get_json_or_default(config_keys::BASELINE_ROW_MAPPING, BTreeMap::new())
    }

    /// 组装一次决策使用的完整配置并校验
    pub fn load_decision_config(&self) -> RepositoryResult<DecisionConfig> {
        let config = DecisionConfig {
            min_dos_threshold: self.get_min_dos_threshold()?,
            shift_hours: self.get_shift_hours()?,
            escalation_loss_threshold: self.get_escalation_loss_threshold()?,
            escalation_lookback_shifts: self.get_escalation_lookback_shifts()?,
            compensation_lookahead_shifts: self.get_compensation_lookahead_shifts()?,
            maintenance_hours: self.get_maintenance_hours()?,
            default_line_capacity: self.get_default_line_capacity()?,
            line_capacities: self.get_line_capacities()?,
            baseline_row_mapping: self.get_baseline_row_mapping()?,
        };
        config.validate().map_err(RepositoryError::ValidationError)?;
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // DOS
    pub const MIN_DOS_THRESHOLD: &str = "min_dos_threshold";

    // 班次
    pub const SHIFT_HOURS: &str = "shift_hours";

    // 加线判定
    pub const ESCALATION_LOSS_THRESHOLD: &str = "escalation_loss_threshold";
    pub const ESCALATION_LOOKBACK_SHIFTS: &str = "escalation_lookback_shifts";

    // 补偿
    pub const COMPENSATION_LOOKAHEAD_SHIFTS: &str = "compensation_lookahead_shifts";
    pub const MAINTENANCE_HOURS: &str = "maintenance_hours";

    // 产能
    pub const DEFAULT_LINE_CAPACITY: &str = "default_line_capacity";
    pub const LINE_CAPACITIES: &str = "line_capacities"; // JSON

    // 基准预测行映射
    pub const BASELINE_ROW_MAPPING: &str = "baseline_row_mapping"; // JSON
}
