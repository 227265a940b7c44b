// ==========================================
// 产能损失决策系统 - 产能损失事件
// ==========================================
// 由操作员上报, 引擎只读消费
// ==========================================

use crate::domain::shift::SlotKey;
use crate::domain::types::ShiftCode;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// LossEvent - 上报的产能损失事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossEvent {
    pub date: NaiveDate,
    pub shift: ShiftCode,
    pub line: String,
    pub part_number: String,
    pub lost_quantity: f64,          // 已损失产量 (C)
    pub remaining_repair_hours: f64, // 剩余修理时间 (D)
}

impl LossEvent {
    pub fn new(
        date: NaiveDate,
        shift: ShiftCode,
        line: &str,
        part_number: &str,
        lost_quantity: f64,
        remaining_repair_hours: f64,
    ) -> Self {
        Self {
            date,
            shift,
            line: line.trim().to_string(),
            part_number: part_number.trim().to_string(),
            lost_quantity,
            remaining_repair_hours,
        }
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.date, self.shift)
    }

    /// 基础字段校验
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(String): 第一条违规原因
    pub fn validate(&self) -> Result<(), String> {
        if self.line.is_empty() {
            return Err("产线不能为空".to_string());
        }
        if self.part_number.is_empty() {
            return Err("产品料号不能为空".to_string());
        }
        if !self.lost_quantity.is_finite() || self.lost_quantity < 0.0 {
            return Err(format!("已损失产量非法: {}", self.lost_quantity));
        }
        if !self.remaining_repair_hours.is_finite() || self.remaining_repair_hours < 0.0 {
            return Err(format!("剩余修理时间非法: {}", self.remaining_repair_hours));
        }
        Ok(())
    }
}

// ==========================================
// HistoricalLossRecord - 已记录的历史损失
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalLossRecord {
    pub event_id: String,
    pub date: NaiveDate,
    pub shift: ShiftCode,
    pub line: String,
    pub part_number: Option<String>,
    pub lost_quantity: f64,
    pub remaining_repair_hours: f64,
    pub created_at: NaiveDateTime,
}

impl HistoricalLossRecord {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.date, self.shift)
    }
}
