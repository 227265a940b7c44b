// ==========================================
// 产能损失决策系统 - 成品库存领域模型
// ==========================================
// 库存按产品组汇总: 组 = (产品系列, Head 数量)
// 同组多个料号共享库存池
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ProductGroup - 产品组
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductGroup {
    pub product: String,
    pub head_qty: String,
}

impl ProductGroup {
    pub fn new(product: &str, head_qty: &str) -> Self {
        Self {
            product: product.trim().to_string(),
            head_qty: head_qty.trim().to_string(),
        }
    }
}

impl fmt::Display for ProductGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}H", self.product, self.head_qty)
    }
}

// ==========================================
// InventoryRecord - 单料号库存
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub part_number: String,
    pub group: ProductGroup,
    pub on_hand: f64, // 上一班结束时的合计在库量 (TTL QTY)
}

impl InventoryRecord {
    pub fn new(part_number: &str, group: ProductGroup, on_hand: f64) -> Self {
        Self {
            part_number: part_number.trim().to_string(),
            group,
            on_hand,
        }
    }
}

// ==========================================
// InventoryTable - 库存快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryTable {
    pub records: Vec<InventoryRecord>,
}

impl InventoryTable {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        Self { records }
    }

    /// 料号所属产品组
    pub fn group_of(&self, part_number: &str) -> Option<&ProductGroup> {
        let pn = part_number.trim();
        self.records
            .iter()
            .find(|r| r.part_number == pn)
            .map(|r| &r.group)
    }

    /// 产品组合计在库量
    pub fn group_total(&self, group: &ProductGroup) -> f64 {
        self.records
            .iter()
            .filter(|r| &r.group == group)
            .map(|r| r.on_hand)
            .sum()
    }

    /// 产品组内的全部料号
    pub fn group_members(&self, group: &ProductGroup) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| &r.group == group)
            .map(|r| r.part_number.as_str())
            .collect()
    }
}
