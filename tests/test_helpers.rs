// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use capacity_loss_aps::db::{init_schema, open_sqlite_connection};
use capacity_loss_aps::domain::{
    InventoryRecord, InventoryTable, LossEvent, PlanRow, ProductGroup, ProductionPlan, RowKind,
    ShiftCode, SlotKey,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    capacity_loss_aps::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接 (已统一 PRAGMA)
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 写入带后缀的临时文件 (导入器按扩展名选择解析器)
pub fn write_temp_file(suffix: &str, content: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

// ==========================================
// 测试数据构建
// ==========================================

pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

pub fn key(day: u32, shift: ShiftCode) -> SlotKey {
    SlotKey::new(d(day), shift)
}

/// 3月1日 ~ 3月2日 共 8 个班次的 F16 计划
///
/// - 基准预测: 3/1 T1..T4 = 1100, 1100, next.0, next.1; 3/2 每班 1100
/// - 200723400 排产: 3/1 T1..T4 = 900, 900, 5000, 5000; 3/2 每班 900
pub fn standard_plan(next_two: (f64, f64)) -> ProductionPlan {
    let mut baseline = PlanRow::new("F16", RowKind::BaselineForecast)
        .with_quantity(key(1, ShiftCode::T1), 1100.0)
        .with_quantity(key(1, ShiftCode::T2), 1100.0)
        .with_quantity(key(1, ShiftCode::T3), next_two.0)
        .with_quantity(key(1, ShiftCode::T4), next_two.1);
    let mut production = PlanRow::new("F16", RowKind::Production)
        .with_product("EvansBP")
        .with_part_number("200723400")
        .with_quantity(key(1, ShiftCode::T1), 900.0)
        .with_quantity(key(1, ShiftCode::T2), 900.0)
        .with_quantity(key(1, ShiftCode::T3), 5_000.0)
        .with_quantity(key(1, ShiftCode::T4), 5_000.0);
    for shift in ShiftCode::ALL {
        baseline = baseline.with_quantity(key(2, shift), 1100.0);
        production = production.with_quantity(key(2, shift), 900.0);
    }
    ProductionPlan::from_rows(vec![baseline, production])
}

/// EvansBP/16H 产品组: 200723400 + 200723401, 合计 on_hand
pub fn standard_inventory(on_hand: f64) -> InventoryTable {
    let group = ProductGroup::new("EvansBP", "16");
    InventoryTable::new(vec![
        InventoryRecord::new("200723400", group.clone(), on_hand - 100.0),
        InventoryRecord::new("200723401", group, 100.0),
        InventoryRecord::new("200723500", ProductGroup::new("EvansBP", "12"), 9_999.0),
    ])
}

/// 3/1 T2 F16 的标准事件: C = 100, D = 2 -> F = 800
pub fn standard_event() -> LossEvent {
    LossEvent::new(d(1), ShiftCode::T2, "F16", "200723400", 100.0, 2.0)
}

pub fn event_at(day: u32, shift: ShiftCode, line: &str, lost: f64) -> LossEvent {
    LossEvent::new(d(day), shift, line, "200723400", lost, 0.0)
}

/// 两行表头计划 CSV (与 standard_plan 相同的数据)
pub fn standard_plan_csv() -> String {
    [
        "Line,Kind,Product,Part Number,1-Mar,,,,2-Mar,,,,Total",
        ",,,,T1,T2,T3,T4,T1,T2,T3,T4,",
        "F16,Forecast,,,1100,1100,300,400,1100,1100,1100,1100,",
        ",,EvansBP,200723400,900,900,5000,5000,900,900,900,900,",
    ]
    .join("\n")
}

/// 库存 CSV (与 standard_inventory(500) 相同的数据)
pub fn standard_inventory_csv() -> String {
    [
        "Product,Head_Qty,P/N,TTL QTY",
        "EvansBP,16,200723400,400",
        "EvansBP,16.0,200723401,100",
        "EvansBP,12,200723500,9999",
    ]
    .join("\n")
}
