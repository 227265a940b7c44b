// ==========================================
// 产能损失决策系统 - 补偿方案计算
// ==========================================
// 仅在 DOS 低于阈值时调用
// 1. F' = 阈值 * I + H - G, 补偿量 = F' - F (<= 0 时无需补偿)
// 2. 扫描事件之后 N 个班次 (同产线), 计算可吸收产量
// 3. 竞争事件扣减:
//    - 返工/回收: 与补偿共用同一剩余产能, 仅展示不重复扣减
//    - 保养: 扣减 (保养工时 / 班次工时) * 计划产量
// 结果仅供参考, 引擎不自动修改排产
// ==========================================

use crate::config::DecisionConfig;
use crate::domain::decision::{CandidateShift, CompensationPlan};
use crate::domain::shift::ShiftSlot;
use crate::domain::types::RowKind;
use crate::engine::accessors::PlanAccessor;
use crate::engine::calendar::ShiftCalendar;

/// 补偿量计算输入 (均来自 DOS 计算路径)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensationInputs {
    pub threshold: f64,        // 最小 DOS 阈值
    pub demand: f64,           // I
    pub scheduled_output: f64, // H
    pub group_inventory: f64,  // G
    pub forecast_output: f64,  // F
}

impl CompensationInputs {
    /// 恰好满足阈值所需的本班产量 F'
    pub fn required_output(&self) -> f64 {
        self.threshold * self.demand + self.scheduled_output - self.group_inventory
    }
}

pub struct CompensationPlanner<'a> {
    config: &'a DecisionConfig,
}

impl<'a> CompensationPlanner<'a> {
    pub fn new(config: &'a DecisionConfig) -> Self {
        Self { config }
    }

    /// 生成补偿方案
    pub fn plan<P>(
        &self,
        calendar: &ShiftCalendar,
        event_ordinal: usize,
        line: &str,
        plan: &P,
        inputs: &CompensationInputs,
    ) -> CompensationPlan
    where
        P: PlanAccessor + ?Sized,
    {
        let required_output = inputs.required_output();
        let raw_gap = required_output - inputs.forecast_output;
        let compensation_needed = raw_gap.max(0.0);

        if compensation_needed <= 0.0 {
            tracing::info!(
                line = line,
                required_output,
                forecast_output = inputs.forecast_output,
                "预测产量已满足阈值所需产量, 无需补偿"
            );
            return CompensationPlan {
                required_output,
                forecast_output: inputs.forecast_output,
                raw_gap,
                compensation_needed: 0.0,
                compensation_required: false,
                candidates: Vec::new(),
                total_absorbable: 0.0,
                covers_need: true,
                window_truncated: false,
            };
        }

        let mut candidates = Vec::new();
        let mut window_truncated = false;

        for step in 1..=self.config.compensation_lookahead_shifts {
            match calendar.offset(event_ordinal, step as i64) {
                Ok(slot) => candidates.push(self.evaluate_candidate(slot, line, plan)),
                Err(_) => {
                    window_truncated = true;
                    tracing::warn!(
                        line = line,
                        requested = self.config.compensation_lookahead_shifts,
                        available = step - 1,
                        "日历后续班次不足, 补偿扫描窗口被截断"
                    );
                    break;
                }
            }
        }

        let total_absorbable: f64 = candidates
            .iter()
            .filter(|c| c.viable)
            .map(|c| c.absorbable)
            .sum();
        let covers_need = total_absorbable >= compensation_needed;

        tracing::info!(
            line = line,
            compensation_needed,
            total_absorbable,
            covers_need,
            candidate_count = candidates.len(),
            "补偿方案计算完成"
        );

        CompensationPlan {
            required_output,
            forecast_output: inputs.forecast_output,
            raw_gap,
            compensation_needed,
            compensation_required: true,
            candidates,
            total_absorbable,
            covers_need,
            window_truncated,
        }
    }

    /// 单个候选班次的可吸收产量
    fn evaluate_candidate<P>(&self, slot: &ShiftSlot, line: &str, plan: &P) -> CandidateShift
    where
        P: PlanAccessor + ?Sized,
    {
        let key = slot.key();
        let planned_quantity = plan.line_load(line, &key);
        let line_capacity = self.config.line_capacity(line);
        let spare_capacity = (line_capacity - planned_quantity).max(0.0);
        let competing_events = plan.competing_events(line, &key);

        // 竞争事件类型已去重, 同班次保养只扣一次
        let maintenance_deduction = if competing_events.contains(&RowKind::Maintenance) {
            self.config.maintenance_hours / self.config.shift_hours * planned_quantity
        } else {
            0.0
        };
        let absorbable = (spare_capacity - maintenance_deduction).max(0.0);

        tracing::debug!(
            line = line,
            slot = %key,
            planned_quantity,
            line_capacity,
            spare_capacity,
            competing = ?competing_events,
            maintenance_deduction,
            absorbable,
            "候选补偿班次评估"
        );

        CandidateShift {
            slot: *slot,
            planned_quantity,
            line_capacity,
            spare_capacity,
            competing_events,
            maintenance_deduction,
            absorbable,
            viable: absorbable > 0.0,
        }
    }
}
