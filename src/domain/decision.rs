// ==========================================
// 产能损失决策系统 - 决策结果
// ==========================================
// DecisionResult 是引擎唯一的对外输出
// 每次调用生成一次, 之后不再修改
// ==========================================

use crate::domain::loss_event::LossEvent;
use crate::domain::shift::{ShiftSlot, SlotKey};
use crate::domain::types::{DecisionOutcome, DosLevel, RowKind};
use serde::{Deserialize, Serialize};

// ==========================================
// 加线判定 (前序班次损失检查)
// ==========================================

/// 单个前序班次的损失查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookbackShift {
    pub offset: i64,             // 相对事件班次的偏移 (-1, -2, -3)
    pub slot: Option<SlotKey>,   // 超出日历范围时为 None
    pub loss: Option<f64>,       // 无损失记录时为 None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationCheck {
    pub lookback_shifts: Vec<LookbackShift>,
    pub shifts_with_loss: usize,
    pub total_loss: f64,
    pub loss_threshold: f64,
    pub all_shifts_have_loss: bool,
    pub exceeds_threshold: bool,
    pub triggered: bool,
}

// ==========================================
// 本班产量预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBreakdown {
    pub baseline_forecast: f64,      // E
    pub lost_quantity: f64,          // C
    pub remaining_repair_hours: f64, // D
    pub hourly_capacity: f64,        // E / 班次工时
    pub further_loss: f64,           // D * 小时产能
    pub forecast_output: f64,        // F
}

// ==========================================
// 后两班需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextShiftDemand {
    pub first_slot: SlotKey,
    pub first: f64,
    pub second_slot: SlotKey,
    pub second: f64,
    pub resolved: f64, // 特殊处理后的 I; 两班均为 0 时记 0 并跳过事件
}

// ==========================================
// DOS 计算
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosBreakdown {
    pub group_inventory: f64,  // G
    pub forecast_output: f64,  // F
    pub scheduled_output: f64, // H
    pub demand: f64,           // I
    pub projected_eoh: f64,    // G + F - H
    pub dos: f64,
    pub level: DosLevel,
}

// ==========================================
// 阈值判定
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub dos: f64,
    pub threshold: f64,
    pub meets_threshold: bool,
    pub shortfall: f64,
}

// ==========================================
// 补偿方案
// ==========================================

/// 候选补偿班次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateShift {
    pub slot: ShiftSlot,
    pub planned_quantity: f64,
    pub line_capacity: f64,
    pub spare_capacity: f64,
    pub competing_events: Vec<RowKind>,
    pub maintenance_deduction: f64,
    pub absorbable: f64,
    pub viable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationPlan {
    pub required_output: f64,     // F' = 阈值 * I + H - G
    pub forecast_output: f64,     // F
    pub raw_gap: f64,             // F' - F (可能为负)
    pub compensation_needed: f64, // max(0, F' - F)
    pub compensation_required: bool,
    pub candidates: Vec<CandidateShift>,
    pub total_absorbable: f64, // 仅统计 viable 班次
    pub covers_need: bool,
    pub window_truncated: bool, // 日历不足 N 个后续班次
}

impl CompensationPlan {
    pub fn viable_candidates(&self) -> impl Iterator<Item = &CandidateShift> {
        self.candidates.iter().filter(|c| c.viable)
    }
}

// ==========================================
// DecisionResult - 决策结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub event: LossEvent,
    pub event_slot: ShiftSlot,
    pub outcome: DecisionOutcome,
    pub escalation: EscalationCheck,
    pub forecast: Option<ForecastBreakdown>,
    pub next_shift_demand: Option<NextShiftDemand>,
    pub dos: Option<DosBreakdown>,
    pub threshold: Option<ThresholdCheck>,
    pub compensation: Option<CompensationPlan>,
    pub recommendation: String,
}

impl DecisionResult {
    pub fn dos_value(&self) -> Option<f64> {
        self.dos.as_ref().map(|d| d.dos)
    }

    pub fn compensation_needed(&self) -> Option<f64> {
        self.compensation.as_ref().map(|c| c.compensation_needed)
    }
}
