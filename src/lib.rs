// ==========================================
// 产能损失决策系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (人工最终控制权)
// 核心: 单个产能损失事件 -> 加线 / 跳过 / 接受 / 补偿 决策
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 决策规则
pub mod engine;

// 导入层 - 计划/库存文件
pub mod importer;

// 配置层 - 决策配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DecisionOutcome, DosLevel, RowKind, ShiftCode};

// 领域实体
pub use domain::{
    CompensationPlan, DecisionResult, HistoricalLossRecord, InventoryTable, LossEvent,
    ProductionPlan, ShiftSlot, SlotKey,
};

// 引擎
pub use engine::{DecisionOrchestrator, EngineError, ShiftCalendar};

// 配置
pub use config::{ConfigManager, DecisionConfig};

// API
pub use api::{ApiError, DisruptionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "产能损失决策系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
