// ==========================================
// 产能损失决策系统 - 班次领域模型
// ==========================================

use crate::domain::types::ShiftCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SlotKey - (日期, 班次) 组合键
// ==========================================
// 派生 Ord: 先比日期, 再比班次序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub shift: ShiftCode,
}

impl SlotKey {
    pub fn new(date: NaiveDate, shift: ShiftCode) -> Self {
        Self { date, shift }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.shift)
    }
}

// ==========================================
// ShiftSlot - 日历中的一个班次
// ==========================================
// ordinal 为其在已解析日历中的位置 (从 0 开始, 严格递增)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub date: NaiveDate,
    pub shift: ShiftCode,
    pub ordinal: usize,
}

impl ShiftSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.shift)
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.key(), self.ordinal)
    }
}
