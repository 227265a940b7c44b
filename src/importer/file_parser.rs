// ==========================================
// 产能损失决策系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取, 输出原始单元格网格
// 支持: Excel (.xlsx) / CSV (.csv)
// 计划表为双行表头, 因此解析器不识别表头, 由上层导入器解释
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始单元格网格 (行 -> 列 -> 去空白后的文本)
pub type RawGrid = Vec<Vec<String>>;

/// 文件解析 trait
pub trait FileParser {
    fn parse_grid(&self, file_path: &Path) -> ImportResult<RawGrid>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        ensure_exists(file_path)?;
        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(|v| v.trim().to_string()).collect());
        }
        Ok(grid)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        ensure_exists(file_path)?;
        let ext = extension_of(file_path);
        if ext != "xlsx" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 日期单元格按显示文本输出 (序列号), 由导入器统一解析
        let grid = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
            .collect();
        Ok(grid)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse_grid<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawGrid> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_grid(path),
            "xlsx" => ExcelParser.parse_grid(path),
            other => {
                ensure_exists(path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

/// 单行表头网格 -> 记录列表
///
/// 完全空白的行跳过; 返回 (源文件行号, 记录), 行号从 1 开始且含表头行
pub fn grid_to_records(grid: &RawGrid) -> ImportResult<Vec<(usize, HashMap<String, String>)>> {
    let mut rows = grid.iter().enumerate();
    let headers = rows
        .next()
        .map(|(_, row)| row.clone())
        .ok_or_else(|| ImportError::HeaderError("文件为空, 缺少表头行".to_string()))?;

    let mut records = Vec::new();
    for (idx, row) in rows {
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        let record = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(col, h)| (h.clone(), row.get(col).cloned().unwrap_or_default()))
            .collect();
        records.push((idx + 1, record));
    }
    Ok(records)
}
