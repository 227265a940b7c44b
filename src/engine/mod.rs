// ==========================================
// 产能损失决策系统 - 引擎层
// ==========================================
// 职责: 产能损失决策规则, 不拼 SQL
// 红线: 引擎只读参考数据, 不写计划/库存/历史
// ==========================================

pub mod accessors;
pub mod audit;
pub mod calendar;
pub mod compensation;
pub mod dos;
pub mod error;
pub mod escalation;
pub mod forecast;
pub mod orchestrator;
pub mod recommendation;
pub mod threshold;

// 重导出核心引擎
pub use accessors::{
    GroupInventory, InventoryAccessor, LossHistoryAccessor, LossHistorySnapshot, PlanAccessor,
};
pub use audit::{DecisionAuditSink, NoOpAuditSink, OptionalAuditSink};
pub use calendar::ShiftCalendar;
pub use compensation::{CompensationInputs, CompensationPlanner};
pub use dos::{DemandResolution, DosCalculator};
pub use error::{EngineError, EngineResult};
pub use escalation::EscalationChecker;
pub use forecast::ForecastCalculator;
pub use orchestrator::DecisionOrchestrator;
pub use threshold::ThresholdEvaluator;
