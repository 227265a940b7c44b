// ==========================================
// 产能损失决策系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod audit;
pub mod decision;
pub mod inventory;
pub mod loss_event;
pub mod plan;
pub mod shift;
pub mod types;

// 重导出核心类型
pub use audit::DecisionAudit;
pub use decision::{
    CandidateShift, CompensationPlan, DecisionResult, DosBreakdown, EscalationCheck,
    ForecastBreakdown, LookbackShift, NextShiftDemand, ThresholdCheck,
};
pub use inventory::{InventoryRecord, InventoryTable, ProductGroup};
pub use loss_event::{HistoricalLossRecord, LossEvent};
pub use plan::{PlanColumn, PlanRow, ProductionPlan};
pub use shift::{ShiftSlot, SlotKey};
pub use types::{DecisionOutcome, DosLevel, RowKind, ShiftCode};
