// ==========================================
// 产能损失决策系统 - 本班产量预测
// ==========================================
// 公式: F = E - C - D * (E / 班次工时)
// E: 产线基准预测  C: 已损失产量  D: 剩余修理时间
// ==========================================

use crate::domain::decision::ForecastBreakdown;
use crate::domain::shift::SlotKey;
use crate::engine::error::{EngineError, EngineResult};

pub struct ForecastCalculator {
    shift_hours: f64,
}

impl ForecastCalculator {
    pub fn new(shift_hours: f64) -> Self {
        Self { shift_hours }
    }

    /// 计算本班可实现产量
    ///
    /// # 参数
    /// - `line` / `slot`: 仅用于错误定位
    /// - `baseline`: E
    /// - `lost_quantity`: C
    /// - `remaining_repair_hours`: D
    ///
    /// # 返回
    /// - Err(NoForecastData): E <= 0, 基准未定义时不得继续计算 DOS
    pub fn forecast(
        &self,
        line: &str,
        slot: &SlotKey,
        baseline: f64,
        lost_quantity: f64,
        remaining_repair_hours: f64,
    ) -> EngineResult<ForecastBreakdown> {
        if !(baseline > 0.0) {
            return Err(EngineError::NoForecastData {
                line: line.to_string(),
                date: slot.date,
                shift: slot.shift,
            });
        }

        let hourly_capacity = baseline / self.shift_hours;
        let further_loss = remaining_repair_hours * hourly_capacity;
        let forecast_output = baseline - lost_quantity - further_loss;

        tracing::debug!(
            line = line,
            slot = %slot,
            baseline,
            lost_quantity,
            remaining_repair_hours,
            hourly_capacity,
            forecast_output,
            "本班产量预测完成"
        );

        Ok(ForecastBreakdown {
            baseline_forecast: baseline,
            lost_quantity,
            remaining_repair_hours,
            hourly_capacity,
            further_loss,
            forecast_output,
        })
    }
}
