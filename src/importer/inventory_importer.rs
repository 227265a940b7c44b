// ==========================================
// 产能损失决策系统 - 库存导入
// ==========================================
// 列: Product / Head_Qty / P/N / TTL QTY (大小写、空白不敏感)
// 产品组 = (Product, Head_Qty); TTL QTY 为上一班合计在库
// ==========================================

use crate::domain::inventory::{InventoryRecord, InventoryTable, ProductGroup};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{grid_to_records, RawGrid, UniversalFileParser};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const COL_PRODUCT: &str = "product";
const COL_HEAD_QTY: &str = "headqty";
const COL_PART_NUMBER: &str = "p/n";
const COL_TOTAL_QTY: &str = "ttlqty";

pub struct InventoryImporter;

impl InventoryImporter {
    /// 从文件导入库存快照 (.csv / .xlsx)
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<InventoryTable> {
        let path = path.as_ref();
        let grid = UniversalFileParser.parse_grid(path)?;
        let table = self.from_grid(&grid)?;
        info!(file = %path.display(), records = table.records.len(), "库存导入完成");
        Ok(table)
    }

    pub fn from_grid(&self, grid: &RawGrid) -> ImportResult<InventoryTable> {
        let records = grid_to_records(grid)?;

        // 表头名 -> 标准名
        let header_map: HashMap<String, String> = grid
            .first()
            .map(|headers| {
                headers
                    .iter()
                    .map(|h| (DataCleaner::normalize_header(h), h.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let resolve = |canonical: &str, aliases: &[&str]| -> ImportResult<String> {
            std::iter::once(canonical)
                .chain(aliases.iter().copied())
                .find_map(|name| header_map.get(name).cloned())
                .ok_or_else(|| ImportError::HeaderError(format!("缺少库存列: {}", canonical)))
        };
        let product_col = resolve(COL_PRODUCT, &["产品"])?;
        let head_col = resolve(COL_HEAD_QTY, &["head", "heads"])?;
        let pn_col = resolve(COL_PART_NUMBER, &["pn", "partnumber", "料号"])?;
        let qty_col = resolve(COL_TOTAL_QTY, &["totalqty", "qty", "库存"])?;

        let mut table = Vec::with_capacity(records.len());
        for (row_no, record) in records {
            let get = |col: &str| record.get(col).map(String::as_str);

            let part_number = match DataCleaner::normalize_null(get(&pn_col)) {
                Some(pn) => DataCleaner::normalize_code(&pn),
                None => {
                    debug!(row = row_no, "料号为空, 跳过");
                    continue;
                }
            };
            let product = DataCleaner::normalize_null(get(&product_col)).ok_or_else(|| {
                ImportError::FieldMappingError {
                    row: row_no,
                    message: format!("料号 {} 缺少产品系列", part_number),
                }
            })?;
            let head_qty = DataCleaner::normalize_null(get(&head_col))
                .map(|h| DataCleaner::normalize_code(&h))
                .unwrap_or_default();
            let on_hand = DataCleaner::parse_quantity(get(&qty_col).unwrap_or(""))
                .map_err(|message| ImportError::TypeConversionError {
                    row: row_no,
                    field: qty_col.clone(),
                    message,
                })?
                .unwrap_or(0.0);

            table.push(InventoryRecord::new(
                &part_number,
                ProductGroup::new(&product, &head_qty),
                on_hand,
            ));
        }

        Ok(InventoryTable::new(table))
    }
}
