// ==========================================
// 产能损失决策系统 - 数据清洗器实现
// ==========================================
// 职责: 表头名标准化 / 表头日期解析 / 数量解析 / 编码数值规整
// ==========================================

use chrono::{Duration, NaiveDate};

pub struct DataCleaner;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

// Excel 序列号日期的合法范围 (1900-01-01 .. 9999-12-31)
const EXCEL_SERIAL_MIN: f64 = 1.0;
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

impl DataCleaner {
    /// 表头名标准化: 小写, 去掉空白与下划线
    ///
    /// "Part Number" / "part_number" -> "partnumber"
    pub fn normalize_header(value: &str) -> String {
        value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// 空白视为缺失
    pub fn normalize_null(value: Option<&str>) -> Option<String> {
        value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// 编码类数值规整: Excel 会把 16 读成 "16.0"
    pub fn normalize_code(value: &str) -> String {
        let trimmed = value.trim();
        match trimmed.strip_suffix(".0") {
            Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
                head.to_string()
            }
            _ => trimmed.to_string(),
        }
    }

    /// 数量解析
    ///
    /// # 返回
    /// - Ok(None): 空白 / "-"
    /// - Ok(Some(v)): 数值 (允许千分位逗号)
    /// - Err(message): 非数值
    pub fn parse_quantity(value: &str) -> Result<Option<f64>, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Ok(None);
        }
        let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
        match cleaned.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(format!("无法解析为数量: {}", trimmed)),
        }
    }

    /// 表头日期解析
    ///
    /// 支持:
    /// - YYYY-MM-DD / YYYY/MM/DD (可带时间部分)
    /// - D-Mon (如 1-Mar), 年份由调用方提供
    /// - Excel 日期序列号 (如 45717)
    pub fn parse_header_date(value: &str, year: i32) -> Option<NaiveDate> {
        let token = value.split_whitespace().next()?;

        if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(token, "%Y/%m/%d") {
            return Some(date);
        }

        if let Some((day, month)) = token.split_once('-') {
            let day: u32 = day.trim().parse().ok()?;
            let month = month.trim().to_lowercase();
            let month_idx = MONTHS.iter().position(|m| month.starts_with(m))?;
            return NaiveDate::from_ymd_opt(year, month_idx as u32 + 1, day);
        }

        let serial: f64 = token.parse().ok()?;
        if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
    }
}
