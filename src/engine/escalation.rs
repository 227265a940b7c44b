// ==========================================
// 产能损失决策系统 - 加线判定
// ==========================================
// 规则: 事件之前紧邻的 N 个班次 (同产线) 均有损失记录,
//       且损失合计超过阈值 -> ADD_LINE_REQUIRED
// 日历不足 N 个前序班次时按"无损失记录"处理, 不报错
// ==========================================

use crate::domain::decision::{EscalationCheck, LookbackShift};
use crate::engine::accessors::LossHistoryAccessor;
use crate::engine::calendar::ShiftCalendar;
use crate::engine::error::EngineResult;

pub struct EscalationChecker {
    lookback_shifts: usize,
    loss_threshold: f64,
}

impl EscalationChecker {
    pub fn new(lookback_shifts: usize, loss_threshold: f64) -> Self {
        Self {
            lookback_shifts,
            loss_threshold,
        }
    }

    /// 执行加线判定
    ///
    /// 历史查询失败属于致命错误, 直接向上传播
    pub fn check<H>(
        &self,
        calendar: &ShiftCalendar,
        event_ordinal: usize,
        line: &str,
        history: &H,
    ) -> EngineResult<EscalationCheck>
    where
        H: LossHistoryAccessor + ?Sized,
    {
        let mut lookback_shifts = Vec::new();
        let mut exhausted = false;

        for step in 1..=self.lookback_shifts {
            let offset = -(step as i64);
            // 越过日历起点后不再查询, 剩余班次记为无记录
            let slot = if exhausted {
                None
            } else {
                calendar.offset(event_ordinal, offset).ok().map(|s| s.key())
            };
            exhausted = slot.is_none();
            let loss = match &slot {
                Some(key) => history.loss_for(line, key)?,
                None => None,
            };
            tracing::debug!(
                line = line,
                offset,
                slot = ?slot,
                loss = ?loss,
                "前序班次损失查询"
            );
            lookback_shifts.push(LookbackShift { offset, slot, loss });
        }

        let recorded: Vec<f64> = lookback_shifts
            .iter()
            .filter_map(|s| s.loss)
            .filter(|loss| *loss > 0.0)
            .collect();
        let shifts_with_loss = recorded.len();
        let total_loss: f64 = recorded.iter().sum();

        let all_shifts_have_loss =
            self.lookback_shifts > 0 && shifts_with_loss == self.lookback_shifts;
        let exceeds_threshold = total_loss > self.loss_threshold;
        let triggered = all_shifts_have_loss && exceeds_threshold;

        Ok(EscalationCheck {
            lookback_shifts,
            shifts_with_loss,
            total_loss,
            loss_threshold: self.loss_threshold,
            all_shifts_have_loss,
            exceeds_threshold,
            triggered,
        })
    }
}
