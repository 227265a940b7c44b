// ==========================================
// 产能损失决策系统 - 生产计划领域模型
// ==========================================
// 计划表: 行 = (产线, 产品), 列 = (日期, 班次)
// 导入阶段已完成表头解析与行类型打标
// ==========================================

use crate::domain::shift::SlotKey;
use crate::domain::types::RowKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// PlanColumn - 计划表列
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanColumn {
    Label(String), // 产线/类型/产品/料号等标识列
    Shift(SlotKey), // 班次数据列
    Total,         // 合计列
}

// ==========================================
// PlanRow - 计划行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub line: String,
    pub kind: RowKind,
    pub product: Option<String>,
    pub part_number: Option<String>,
    // 空单元格不入表, 读取时按 0 处理
    pub quantities: BTreeMap<SlotKey, f64>,
}

impl PlanRow {
    pub fn new(line: &str, kind: RowKind) -> Self {
        Self {
            line: line.to_string(),
            kind,
            product: None,
            part_number: None,
            quantities: BTreeMap::new(),
        }
    }

    pub fn with_product(mut self, product: &str) -> Self {
        self.product = Some(product.to_string());
        self
    }

    pub fn with_part_number(mut self, part_number: &str) -> Self {
        self.part_number = Some(part_number.to_string());
        self
    }

    pub fn with_quantity(mut self, key: SlotKey, quantity: f64) -> Self {
        self.quantities.insert(key, quantity);
        self
    }

    /// 指定班次的数量, 缺失即 0 (不向前填充)
    pub fn quantity_at(&self, key: &SlotKey) -> f64 {
        self.quantities.get(key).copied().unwrap_or(0.0)
    }

    /// 产品名或料号任一匹配即视为同一产品
    pub fn matches_product(&self, product: &str) -> bool {
        let p = product.trim();
        self.product.as_deref().map(str::trim) == Some(p)
            || self.part_number.as_deref().map(str::trim) == Some(p)
    }
}

// ==========================================
// ProductionPlan - 生产计划表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    pub columns: Vec<PlanColumn>,
    pub rows: Vec<PlanRow>,
}

impl ProductionPlan {
    pub fn new(columns: Vec<PlanColumn>, rows: Vec<PlanRow>) -> Self {
        Self { columns, rows }
    }

    /// 由行数据直接构建 (列集合取所有行出现过的班次)
    ///
    /// 主要用于测试与程序化构造; 文件导入走 importer
    pub fn from_rows(rows: Vec<PlanRow>) -> Self {
        let mut keys: Vec<SlotKey> = rows
            .iter()
            .flat_map(|r| r.quantities.keys().copied())
            .collect();
        keys.sort();
        keys.dedup();

        let mut columns = vec![
            PlanColumn::Label("Line".to_string()),
            PlanColumn::Label("Kind".to_string()),
            PlanColumn::Label("Product".to_string()),
            PlanColumn::Label("Part Number".to_string()),
        ];
        columns.extend(keys.into_iter().map(PlanColumn::Shift));
        columns.push(PlanColumn::Total);

        Self { columns, rows }
    }

    /// 全部班次列 (列顺序, 可能重复)
    pub fn shift_columns(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.columns.iter().filter_map(|c| match c {
            PlanColumn::Shift(key) => Some(*key),
            _ => None,
        })
    }

    /// 指定产线、指定类型的行
    pub fn rows_for_line<'a>(
        &'a self,
        line: &'a str,
        kind: RowKind,
    ) -> impl Iterator<Item = &'a PlanRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.kind == kind && r.line.trim() == line.trim())
    }

    /// 计划中出现过的产线
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.rows.iter().map(|r| r.line.clone()).collect();
        lines.sort();
        lines.dedup();
        lines
    }
}
