// ==========================================
// 产能损失决策系统 - 导入层
// ==========================================
// 职责: 外部计划/库存文件 -> 标准化领域表
// 支持: Excel (.xlsx), CSV
// 约束: 表头只在此处解析一次, 下游不再接触原始表头
// ==========================================

pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod inventory_importer;
pub mod plan_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawGrid, UniversalFileParser};
pub use inventory_importer::InventoryImporter;
pub use plan_importer::PlanImporter;
