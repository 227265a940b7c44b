// ==========================================
// 产能损失决策系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod decision_audit_repo;
pub mod error;
pub mod loss_event_repo;

// 重导出核心仓储
pub use decision_audit_repo::DecisionAuditRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use loss_event_repo::LossEventRepository;
