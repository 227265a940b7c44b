// ==========================================
// 产能损失决策系统 - DOS 计算
// ==========================================
// 公式: DOS = (G + F - H) / I
// G: 上一班产品组合计库存  F: 本班预测产量
// H: 本班原排产量          I: 后两班需求合计
// ==========================================
// I 的特殊处理:
// - 两班均为 0 -> 跳过事件 (成功终态)
// - 仅一班为 0 -> 取非零值的两倍
// - 均非零     -> 求和
// - 处理后 I <= 0 或日历不足两班 -> CannotComputeDos
// ==========================================

use crate::domain::decision::{DosBreakdown, NextShiftDemand};
use crate::domain::shift::SlotKey;
use crate::domain::types::DosLevel;
use crate::engine::accessors::PlanAccessor;
use crate::engine::calendar::ShiftCalendar;
use crate::engine::error::{EngineError, EngineResult};

const QTY_EPSILON: f64 = 1e-9;

fn is_zero(v: f64) -> bool {
    v.abs() < QTY_EPSILON
}

/// 后两班需求解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum DemandResolution {
    /// 两班均无需求, 跳过事件
    Skip(NextShiftDemand),
    /// 可用于 DOS 计算的需求
    Demand(NextShiftDemand),
}

pub struct DosCalculator;

impl DosCalculator {
    /// 读取事件后两个班次的产线基准预测并解析 I
    ///
    /// 日历中后续班次不足两个时视为无法计算 DOS
    pub fn next_shift_demand<P>(
        calendar: &ShiftCalendar,
        event_ordinal: usize,
        baseline_line: &str,
        plan: &P,
    ) -> EngineResult<DemandResolution>
    where
        P: PlanAccessor + ?Sized,
    {
        let lookahead = |delta: i64| {
            calendar
                .offset(event_ordinal, delta)
                .map(|slot| slot.key())
                .map_err(|_| EngineError::CannotComputeDos {
                    reason: format!("日历中不存在事件后第{}个班次", delta),
                })
        };
        let first_slot = lookahead(1)?;
        let second_slot = lookahead(2)?;

        let first = plan.planned_quantity(baseline_line, None, &first_slot);
        let second = plan.planned_quantity(baseline_line, None, &second_slot);

        tracing::debug!(
            line = baseline_line,
            first_slot = %first_slot,
            first,
            second_slot = %second_slot,
            second,
            "后两班需求读取完成"
        );

        Self::resolve_demand(first_slot, first, second_slot, second)
    }

    /// 后两班需求特殊处理
    pub fn resolve_demand(
        first_slot: SlotKey,
        first: f64,
        second_slot: SlotKey,
        second: f64,
    ) -> EngineResult<DemandResolution> {
        let mut demand = NextShiftDemand {
            first_slot,
            first,
            second_slot,
            second,
            resolved: 0.0,
        };

        let resolved = match (is_zero(first), is_zero(second)) {
            (true, true) => return Ok(DemandResolution::Skip(demand)),
            (true, false) => second * 2.0,
            (false, true) => first * 2.0,
            (false, false) => first + second,
        };

        if !(resolved > 0.0) {
            return Err(EngineError::CannotComputeDos {
                reason: format!(
                    "后两班需求合计非正: {} + {} -> {}",
                    first, second, resolved
                ),
            });
        }

        demand.resolved = resolved;
        Ok(DemandResolution::Demand(demand))
    }

    /// 计算预测 DOS
    pub fn compute(
        group_inventory: f64,
        forecast_output: f64,
        scheduled_output: f64,
        demand: f64,
    ) -> EngineResult<DosBreakdown> {
        if !(demand > 0.0) {
            return Err(EngineError::CannotComputeDos {
                reason: format!("需求 I 必须为正: {}", demand),
            });
        }

        let projected_eoh = group_inventory + forecast_output - scheduled_output;
        let dos = projected_eoh / demand;

        Ok(DosBreakdown {
            group_inventory,
            forecast_output,
            scheduled_output,
            demand,
            projected_eoh,
            dos,
            level: DosLevel::classify(dos),
        })
    }
}
