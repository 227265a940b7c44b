// ==========================================
// 产能损失决策系统 - 引擎层错误类型
// ==========================================
// 致命错误: 中止整次决策, 不产出部分结果
// 注意: 跳过事件 (SkipEvent) 是成功终态, 不在此列
// ==========================================

use crate::domain::types::ShiftCode;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("事件班次不在生产计划日历中: {date} {shift}")]
    SlotNotFound { date: NaiveDate, shift: ShiftCode },

    #[error("班次偏移超出日历范围: ordinal={ordinal}, delta={delta}")]
    OutOfRange { ordinal: usize, delta: i64 },

    #[error("缺少基准预测数据: line={line}, slot={date} {shift}")]
    NoForecastData {
        line: String,
        date: NaiveDate,
        shift: ShiftCode,
    },

    #[error("料号未找到库存产品组: {part_number}")]
    GroupNotFound { part_number: String },

    #[error("无法计算DOS: {reason}")]
    CannotComputeDos { reason: String },

    #[error("事件数据非法: {0}")]
    InvalidEvent(String),

    #[error("配置非法: {0}")]
    InvalidConfig(String),

    #[error("历史损失查询失败: {0}")]
    History(String),
}

impl EngineError {
    /// 错误类型标识 (日志/审计使用)
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::SlotNotFound { .. } => "SLOT_NOT_FOUND",
            EngineError::OutOfRange { .. } => "OUT_OF_RANGE",
            EngineError::NoForecastData { .. } => "NO_FORECAST_DATA",
            EngineError::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            EngineError::CannotComputeDos { .. } => "CANNOT_COMPUTE_DOS",
            EngineError::InvalidEvent(_) => "INVALID_EVENT",
            EngineError::InvalidConfig(_) => "INVALID_CONFIG",
            EngineError::History(_) => "HISTORY_UNAVAILABLE",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
