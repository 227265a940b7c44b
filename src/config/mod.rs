// ==========================================
// 产能损失决策系统 - 配置层
// ==========================================
// 职责: 决策配置的默认值、校验与持久化覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod decision_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use decision_config::DecisionConfig;
