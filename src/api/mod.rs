// ==========================================
// 产能损失决策系统 - API 层
// ==========================================
// 职责: 面向调用方的业务接口, 组合仓储与引擎
// ==========================================

pub mod disruption_api;
pub mod error;

pub use disruption_api::{DisruptionApi, DisruptionReport};
pub use error::{ApiError, ApiResult};
