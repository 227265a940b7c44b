// ==========================================
// 产能损失决策系统 - 生产计划导入
// ==========================================
// 表头 (双行):
//   第 1 行: 日期 (合并单元格只在首列有值, 空白继承左侧日期)
//   第 2 行: 班次代码 T1..T4
//   标识列: Line / Kind / Product / Part Number (名称可在任一表头行)
//   合计列 (Total/合计) 与其他非班次列忽略
// 数据行:
//   Kind 标记一次性映射为 RowKind
//   Line 为空时沿用上一行 (合并单元格); 数量空白即缺失, 不向前填充
// ==========================================

use crate::domain::plan::{PlanColumn, PlanRow, ProductionPlan};
use crate::domain::shift::SlotKey;
use crate::domain::types::{RowKind, ShiftCode};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawGrid, UniversalFileParser};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

// 数据行从第 3 行开始 (1-based)
const HEADER_ROWS: usize = 2;

/// 标识列角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelRole {
    Line,
    Kind,
    Product,
    PartNumber,
    Other,
}

impl LabelRole {
    fn from_header(name: &str) -> Self {
        match DataCleaner::normalize_header(name).as_str() {
            "line" | "productionline" | "产线" => LabelRole::Line,
            "kind" | "type" | "rowtype" | "buildtype" | "类型" => LabelRole::Kind,
            "product" | "产品" => LabelRole::Product,
            "partnumber" | "p/n" | "pn" | "料号" => LabelRole::PartNumber,
            _ => LabelRole::Other,
        }
    }
}

fn is_total_header(name: &str) -> bool {
    matches!(
        DataCleaner::normalize_header(name).as_str(),
        "total" | "合计" | "总计"
    )
}

pub struct PlanImporter {
    year: i32,
}

impl PlanImporter {
    /// # 参数
    /// - year: D-Mon 格式表头日期使用的年份
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    /// 从文件导入生产计划 (.csv / .xlsx)
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<ProductionPlan> {
        let path = path.as_ref();
        let grid = UniversalFileParser.parse_grid(path)?;
        let plan = self.from_grid(&grid)?;
        info!(
            file = %path.display(),
            rows = plan.rows.len(),
            shift_columns = plan.shift_columns().count(),
            "生产计划导入完成"
        );
        Ok(plan)
    }

    /// 从原始网格构建生产计划
    pub fn from_grid(&self, grid: &RawGrid) -> ImportResult<ProductionPlan> {
        if grid.len() < HEADER_ROWS {
            return Err(ImportError::HeaderError(
                "生产计划至少需要两行表头 (日期行 + 班次行)".to_string(),
            ));
        }

        let columns = self.parse_header(&grid[0], &grid[1])?;
        let rows = Self::parse_rows(&columns, &grid[HEADER_ROWS..])?;
        Ok(ProductionPlan::new(columns, rows))
    }

    /// 表头解析: 每列一次性解析为 PlanColumn
    fn parse_header(&self, date_row: &[String], shift_row: &[String]) -> ImportResult<Vec<PlanColumn>> {
        let width = date_row.len().max(shift_row.len());
        let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

        let mut columns = Vec::with_capacity(width);
        let mut current_date: Option<NaiveDate> = None;

        for idx in 0..width {
            let top = cell(date_row, idx);
            let bottom = cell(shift_row, idx);

            if let Some(shift) = ShiftCode::parse(&bottom).filter(|_| !bottom.is_empty()) {
                if !top.is_empty() {
                    let date = DataCleaner::parse_header_date(&top, self.year).ok_or_else(|| {
                        ImportError::DateFormatError {
                            column: idx + 1,
                            value: top.clone(),
                        }
                    })?;
                    current_date = Some(date);
                }
                match current_date {
                    Some(date) => columns.push(PlanColumn::Shift(SlotKey::new(date, shift))),
                    None => {
                        warn!(column = idx + 1, shift = %shift, "班次列左侧无日期, 已忽略");
                        columns.push(PlanColumn::Label(bottom));
                    }
                }
                continue;
            }

            // 非班次列: 结束日期继承
            current_date = None;
            let name = if bottom.is_empty() { top } else { bottom };
            if is_total_header(&name) {
                columns.push(PlanColumn::Total);
            } else {
                columns.push(PlanColumn::Label(name));
            }
        }

        let has_line = columns
            .iter()
            .any(|c| matches!(c, PlanColumn::Label(name) if LabelRole::from_header(name) == LabelRole::Line));
        if !has_line {
            return Err(ImportError::HeaderError("缺少产线列 (Line)".to_string()));
        }
        if !columns.iter().any(|c| matches!(c, PlanColumn::Shift(_))) {
            return Err(ImportError::HeaderError("未识别到任何班次列".to_string()));
        }
        Ok(columns)
    }

    fn parse_rows(columns: &[PlanColumn], data: &[Vec<String>]) -> ImportResult<Vec<PlanRow>> {
        let mut rows = Vec::new();
        let mut last_line: Option<String> = None;

        for (offset, raw) in data.iter().enumerate() {
            let row_no = HEADER_ROWS + offset + 1;
            if raw.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            let mut line = None;
            let mut marker = String::new();
            let mut product = None;
            let mut part_number = None;
            let mut quantities = Vec::new();

            for (idx, column) in columns.iter().enumerate() {
                let value = raw.get(idx).map(String::as_str).unwrap_or("");
                match column {
                    PlanColumn::Label(name) => match LabelRole::from_header(name) {
                        LabelRole::Line => line = DataCleaner::normalize_null(Some(value)),
                        LabelRole::Kind => marker = value.trim().to_string(),
                        LabelRole::Product => product = DataCleaner::normalize_null(Some(value)),
                        LabelRole::PartNumber => {
                            part_number = DataCleaner::normalize_null(Some(value))
                                .map(|v| DataCleaner::normalize_code(&v))
                        }
                        LabelRole::Other => {}
                    },
                    PlanColumn::Shift(key) => {
                        let qty = DataCleaner::parse_quantity(value).map_err(|message| {
                            ImportError::TypeConversionError {
                                row: row_no,
                                field: key.to_string(),
                                message,
                            }
                        })?;
                        if let Some(qty) = qty {
                            quantities.push((*key, qty));
                        }
                    }
                    PlanColumn::Total => {}
                }
            }

            let line = match line.or_else(|| last_line.clone()) {
                Some(line) => line,
                None => {
                    return Err(ImportError::FieldMappingError {
                        row: row_no,
                        message: "产线为空且无可继承的上一行产线".to_string(),
                    })
                }
            };
            last_line = Some(line.clone());

            let mut row = PlanRow::new(&line, RowKind::from_marker(&marker));
            row.product = product;
            row.part_number = part_number;
            row.quantities.extend(quantities);
            rows.push(row);
        }

        Ok(rows)
    }
}
