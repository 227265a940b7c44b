// ==========================================
// 产能损失决策系统 - 引擎层数据访问接口
// ==========================================
// 职责: 定义计划 / 库存 / 历史损失的只读访问 trait
// 说明: 引擎只依赖 trait; 内存快照实现在本文件,
//       SQLite 历史实现在 repository 层
// ==========================================

use crate::domain::inventory::{InventoryTable, ProductGroup};
use crate::domain::loss_event::HistoricalLossRecord;
use crate::domain::plan::ProductionPlan;
use crate::domain::shift::SlotKey;
use crate::domain::types::RowKind;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// 生产计划访问
// ==========================================
pub trait PlanAccessor {
    /// 计划数量
    ///
    /// - product = None: 产线基准预测 (E / 后续班次需求)
    /// - product = Some: 该产线该产品的排产量 (H), 停线班次为 0
    ///
    /// 缺失单元格一律为 0, 不跨班次插值
    fn planned_quantity(&self, line: &str, product: Option<&str>, slot: &SlotKey) -> f64;

    /// 产线在该班次的全部生产排产量 (补偿剩余产能计算用)
    fn line_load(&self, line: &str, slot: &SlotKey) -> f64;

    /// 该班次该产线上的竞争事件类型 (返工/回收/保养), 已去重排序
    fn competing_events(&self, line: &str, slot: &SlotKey) -> Vec<RowKind>;
}

impl PlanAccessor for ProductionPlan {
    fn planned_quantity(&self, line: &str, product: Option<&str>, slot: &SlotKey) -> f64 {
        match product {
            None => self
                .rows_for_line(line, RowKind::BaselineForecast)
                .next()
                .map(|row| row.quantity_at(slot))
                .unwrap_or(0.0),
            Some(p) => self
                .rows_for_line(line, RowKind::Production)
                .filter(|row| row.matches_product(p))
                .map(|row| row.quantity_at(slot))
                .sum(),
        }
    }

    fn line_load(&self, line: &str, slot: &SlotKey) -> f64 {
        self.rows_for_line(line, RowKind::Production)
            .map(|row| row.quantity_at(slot))
            .sum()
    }

    fn competing_events(&self, line: &str, slot: &SlotKey) -> Vec<RowKind> {
        let mut kinds: Vec<RowKind> = self
            .rows
            .iter()
            .filter(|row| row.kind.is_competing() && row.line.trim() == line.trim())
            .filter(|row| row.quantity_at(slot) != 0.0)
            .map(|row| row.kind)
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

// ==========================================
// 库存访问
// ==========================================

/// 产品组库存汇总
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInventory {
    pub group: ProductGroup,
    pub total: f64,
}

pub trait InventoryAccessor {
    /// 料号所属产品组的上一班合计库存 (G)
    ///
    /// 料号无产品组映射时返回 GroupNotFound
    fn group_inventory(&self, part_number: &str) -> EngineResult<GroupInventory>;
}

impl InventoryAccessor for InventoryTable {
    fn group_inventory(&self, part_number: &str) -> EngineResult<GroupInventory> {
        let group = self
            .group_of(part_number)
            .cloned()
            .ok_or_else(|| EngineError::GroupNotFound {
                part_number: part_number.trim().to_string(),
            })?;
        let total = self.group_total(&group);
        Ok(GroupInventory { group, total })
    }
}

// ==========================================
// 历史损失访问
// ==========================================
pub trait LossHistoryAccessor {
    /// 指定产线、指定班次的已记录损失量
    ///
    /// 产线与 (日期, 班次) 精确匹配, 不按产品模糊匹配;
    /// 同一班次多条记录时合计
    ///
    /// # 返回
    /// - Ok(Some(qty)): 有记录
    /// - Ok(None): 无记录
    fn loss_for(&self, line: &str, slot: &SlotKey) -> EngineResult<Option<f64>>;
}

/// 内存中的历史损失快照
#[derive(Debug, Clone, Default)]
pub struct LossHistorySnapshot {
    records: Vec<HistoricalLossRecord>,
}

impl LossHistorySnapshot {
    pub fn new(records: Vec<HistoricalLossRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HistoricalLossRecord] {
        &self.records
    }
}

impl LossHistoryAccessor for LossHistorySnapshot {
    fn loss_for(&self, line: &str, slot: &SlotKey) -> EngineResult<Option<f64>> {
        let mut matched = self
            .records
            .iter()
            .filter(|r| r.line.trim() == line.trim() && r.slot_key() == *slot)
            .peekable();
        if matched.peek().is_none() {
            return Ok(None);
        }
        Ok(Some(matched.map(|r| r.lost_quantity).sum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::InventoryRecord;
    use crate::domain::plan::PlanRow;
    use crate::domain::types::ShiftCode;
    use chrono::NaiveDate;

    fn key(day: u32, shift: ShiftCode) -> SlotKey {
        SlotKey::new(NaiveDate::from_ymd_opt(2025, 3, day).unwrap(), shift)
    }

    fn plan() -> ProductionPlan {
        ProductionPlan::from_rows(vec![
            PlanRow::new("F16", RowKind::BaselineForecast)
                .with_quantity(key(1, ShiftCode::T1), 1100.0),
            PlanRow::new("F16", RowKind::Production)
                .with_product("EvansBP")
                .with_part_number("200723400")
                .with_quantity(key(1, ShiftCode::T1), 900.0),
            PlanRow::new("F16", RowKind::Production)
                .with_product("CIMARRONBP")
                .with_quantity(key(1, ShiftCode::T1), 300.0),
            PlanRow::new("F16", RowKind::Maintenance).with_quantity(key(1, ShiftCode::T2), 1.0),
            PlanRow::new("F16", RowKind::Rework).with_quantity(key(1, ShiftCode::T2), 50.0),
            PlanRow::new("F17", RowKind::Recycle).with_quantity(key(1, ShiftCode::T2), 50.0),
        ])
    }

    #[test]
    fn test_planned_quantity_baseline_and_product() {
        let p = plan();
        let slot = key(1, ShiftCode::T1);
        assert_eq!(p.planned_quantity("F16", None, &slot), 1100.0);
        assert_eq!(p.planned_quantity("F16", Some("200723400"), &slot), 900.0);
        assert_eq!(p.planned_quantity("F16", Some("EvansBP"), &slot), 900.0);
        assert_eq!(p.line_load("F16", &slot), 1200.0);
    }

    #[test]
    fn test_planned_quantity_missing_is_zero() {
        let p = plan();
        let slot = key(1, ShiftCode::T2);
        assert_eq!(p.planned_quantity("F16", None, &slot), 0.0);
        assert_eq!(p.planned_quantity("F16", Some("200723400"), &slot), 0.0);
        assert_eq!(p.planned_quantity("F99", None, &key(1, ShiftCode::T1)), 0.0);
    }

    #[test]
    fn test_competing_events_same_line_only() {
        let p = plan();
        assert_eq!(
            p.competing_events("F16", &key(1, ShiftCode::T2)),
            vec![RowKind::Rework, RowKind::Maintenance]
        );
        assert!(p.competing_events("F16", &key(1, ShiftCode::T1)).is_empty());
        assert_eq!(
            p.competing_events("F17", &key(1, ShiftCode::T2)),
            vec![RowKind::Recycle]
        );
    }

    #[test]
    fn test_group_inventory() {
        let g = ProductGroup::new("EvansBP", "16");
        let table = InventoryTable::new(vec![
            InventoryRecord::new("200723400", g.clone(), 300.0),
            InventoryRecord::new("200723401", g.clone(), 200.0),
        ]);
        let inv = table.group_inventory("200723400").unwrap();
        assert_eq!(inv.total, 500.0);
        assert_eq!(inv.group, g);

        assert_eq!(
            table.group_inventory("404"),
            Err(EngineError::GroupNotFound {
                part_number: "404".to_string()
            })
        );
    }

    #[test]
    fn test_loss_history_snapshot_exact_match() {
        let record = |line: &str, day: u32, shift: ShiftCode, qty: f64| HistoricalLossRecord {
            event_id: format!("{}-{}-{}", line, day, shift),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            shift,
            line: line.to_string(),
            part_number: None,
            lost_quantity: qty,
            remaining_repair_hours: 0.0,
            created_at: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let history = LossHistorySnapshot::new(vec![
            record("F16", 1, ShiftCode::T1, 400.0),
            record("F16", 1, ShiftCode::T1, 100.0),
            record("F17", 1, ShiftCode::T2, 700.0),
        ]);

        assert_eq!(history.loss_for("F16", &key(1, ShiftCode::T1)).unwrap(), Some(500.0));
        assert_eq!(history.loss_for("F16", &key(1, ShiftCode::T2)).unwrap(), None);
        assert_eq!(history.loss_for("F17", &key(1, ShiftCode::T1)).unwrap(), None);
    }
}
