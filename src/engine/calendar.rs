// ==========================================
// 产能损失决策系统 - 班次日历解析
// ==========================================
// 职责: 从生产计划列构建有序班次序列, 定位与偏移
// 输入: 生产计划 (列已在导入时解析为 SlotKey)
// 输出: ShiftCalendar (单次决策内不可变)
// ==========================================

use crate::domain::plan::ProductionPlan;
use crate::domain::shift::{ShiftSlot, SlotKey};
use crate::domain::types::ShiftCode;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftCalendar {
    slots: Vec<ShiftSlot>,
}

impl ShiftCalendar {
    /// 从生产计划构建日历
    ///
    /// 只取班次列 (标识列与合计列忽略), 按 (日期, 班次序号) 排序去重,
    /// 依次分配 ordinal
    pub fn build(plan: &ProductionPlan) -> Self {
        Self::from_keys(plan.shift_columns())
    }

    /// 从任意 SlotKey 集合构建日历
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = SlotKey>,
    {
        let mut keys: Vec<SlotKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let slots: Vec<ShiftSlot> = keys
            .into_iter()
            .enumerate()
            .map(|(ordinal, key)| ShiftSlot {
                date: key.date,
                shift: key.shift,
                ordinal,
            })
            .collect();

        tracing::debug!(
            slot_count = slots.len(),
            first = ?slots.first().map(|s| s.key()),
            last = ?slots.last().map(|s| s.key()),
            "班次日历构建完成"
        );

        Self { slots }
    }

    pub fn slots(&self) -> &[ShiftSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 精确定位 (日期, 班次)
    ///
    /// # 返回
    /// - Ok(ordinal): 班次位置
    /// - Err(SlotNotFound): 计划中无此班次
    pub fn locate(&self, date: NaiveDate, shift: ShiftCode) -> EngineResult<usize> {
        let key = SlotKey::new(date, shift);
        self.slots
            .binary_search_by(|s| s.key().cmp(&key))
            .map_err(|_| EngineError::SlotNotFound { date, shift })
    }

    /// 按偏移取班次
    ///
    /// 负偏移取前序班次, 正偏移取后续班次; 越界返回 OutOfRange,
    /// 不回绕也不外推
    pub fn offset(&self, ordinal: usize, delta: i64) -> EngineResult<&ShiftSlot> {
        let out_of_range = EngineError::OutOfRange { ordinal, delta };
        if ordinal >= self.slots.len() {
            return Err(out_of_range);
        }
        let target = i64::try_from(ordinal)
            .ok()
            .and_then(|o| o.checked_add(delta))
            .filter(|t| *t >= 0)
            .and_then(|t| usize::try_from(t).ok())
            .ok_or_else(|| out_of_range.clone())?;

        self.slots.get(target).ok_or(out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::PlanRow;
    use crate::domain::types::RowKind;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn calendar() -> ShiftCalendar {
        // 乱序 + 重复, 验证排序去重
        ShiftCalendar::from_keys(vec![
            SlotKey::new(d(2), ShiftCode::T1),
            SlotKey::new(d(1), ShiftCode::T3),
            SlotKey::new(d(1), ShiftCode::T1),
            SlotKey::new(d(1), ShiftCode::T2),
            SlotKey::new(d(1), ShiftCode::T3),
            SlotKey::new(d(1), ShiftCode::T4),
        ])
    }

    #[test]
    fn test_ordinals_strictly_increasing_by_date_then_rank() {
        let cal = calendar();
        assert_eq!(cal.len(), 5);
        for pair in cal.slots().windows(2) {
            assert!(pair[0].ordinal < pair[1].ordinal);
            assert!(pair[0].key() < pair[1].key());
        }
        assert_eq!(cal.slots()[4].key(), SlotKey::new(d(2), ShiftCode::T1));
    }

    #[test]
    fn test_locate_then_offset_zero_is_identity() {
        let cal = calendar();
        for slot in cal.slots() {
            let ordinal = cal.locate(slot.date, slot.shift).unwrap();
            assert_eq!(cal.offset(ordinal, 0).unwrap(), slot);
        }
    }

    #[test]
    fn test_locate_missing_slot() {
        let cal = calendar();
        assert_eq!(
            cal.locate(d(5), ShiftCode::T1),
            Err(EngineError::SlotNotFound {
                date: d(5),
                shift: ShiftCode::T1
            })
        );
    }

    #[test]
    fn test_offset_crosses_day_boundary() {
        let cal = calendar();
        let t4 = cal.locate(d(1), ShiftCode::T4).unwrap();
        assert_eq!(cal.offset(t4, 1).unwrap().key(), SlotKey::new(d(2), ShiftCode::T1));
        assert_eq!(cal.offset(t4, -3).unwrap().key(), SlotKey::new(d(1), ShiftCode::T1));
    }

    #[test]
    fn test_offset_out_of_range() {
        let cal = calendar();
        assert!(matches!(cal.offset(0, -1), Err(EngineError::OutOfRange { .. })));
        assert!(matches!(cal.offset(4, 1), Err(EngineError::OutOfRange { .. })));
        assert!(matches!(cal.offset(99, 0), Err(EngineError::OutOfRange { .. })));
    }

    #[test]
    fn test_build_ignores_non_shift_columns() {
        let plan = ProductionPlan::from_rows(vec![PlanRow::new("F16", RowKind::Production)
            .with_quantity(SlotKey::new(d(1), ShiftCode::T1), 100.0)]);
        // from_rows 带有 Label 与 Total 列
        let cal = ShiftCalendar::build(&plan);
        assert_eq!(cal.len(), 1);
    }
}
