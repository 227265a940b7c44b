// ==========================================
// 产能损失决策系统 - 产能损失事件 API
// ==========================================
// 职责:
// 1. 损失事件记录 / 查询 / 删除
// 2. 对事件执行决策 (计划与库存快照由调用方提供)
// 3. 决策审计追加 (失败只记日志)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, DecisionConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::audit::DecisionAudit;
use crate::domain::decision::DecisionResult;
use crate::domain::inventory::InventoryTable;
use crate::domain::loss_event::{HistoricalLossRecord, LossEvent};
use crate::domain::plan::ProductionPlan;
use crate::engine::audit::OptionalAuditSink;
use crate::engine::orchestrator::DecisionOrchestrator;
use crate::repository::{DecisionAuditRepository, LossEventRepository, RepositoryError};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 上报并决策的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionReport {
    pub record: HistoricalLossRecord,
    pub result: DecisionResult,
    pub audit_id: Option<String>,
}

// ==========================================
// DisruptionApi
// ==========================================
pub struct DisruptionApi {
    loss_event_repo: Arc<LossEventRepository>,
    audit_repo: Arc<DecisionAuditRepository>,
    config_manager: Arc<ConfigManager>,
    audit_sink: OptionalAuditSink,
}

impl DisruptionApi {
    /// 基于共享连接创建 (会执行幂等建表)
    pub fn new(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            init_schema(&guard).map_err(RepositoryError::from)?;
        }

        let audit_repo = Arc::new(DecisionAuditRepository::from_connection(conn.clone()));
        Ok(Self {
            loss_event_repo: Arc::new(LossEventRepository::from_connection(conn.clone())),
            audit_sink: OptionalAuditSink::with_sink(audit_repo.clone()),
            audit_repo,
            config_manager: Arc::new(ConfigManager::from_connection(conn)?),
        })
    }

    /// 打开数据库文件并创建
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    // ==========================================
    // 损失事件
    // ==========================================

    pub fn record_loss_event(&self, event: &LossEvent) -> ApiResult<HistoricalLossRecord> {
        Ok(self.loss_event_repo.insert(event)?)
    }

    pub fn get_loss_event(&self, event_id: &str) -> ApiResult<HistoricalLossRecord> {
        self.loss_event_repo
            .find_by_id(event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("损失事件(id={})不存在", event_id)))
    }

    pub fn list_loss_events(
        &self,
        line: &str,
        date: NaiveDate,
    ) -> ApiResult<Vec<HistoricalLossRecord>> {
        Ok(self.loss_event_repo.list_by_line_and_date(line, date)?)
    }

    pub fn delete_loss_event(&self, event_id: &str) -> ApiResult<()> {
        Ok(self.loss_event_repo.delete(event_id)?)
    }

    // ==========================================
    // 决策
    // ==========================================

    /// 读取当前生效的决策配置
    pub fn load_config(&self) -> ApiResult<DecisionConfig> {
        self.config_manager
            .load_decision_config()
            .map_err(|e| match e {
                RepositoryError::ValidationError(msg) => ApiError::ConfigError(msg),
                other => other.into(),
            })
    }

    /// 使用数据库配置与历史执行决策 (不写审计)
    pub fn evaluate(
        &self,
        event: &LossEvent,
        plan: &ProductionPlan,
        inventory: &InventoryTable,
    ) -> ApiResult<DecisionResult> {
        let config = self.load_config()?;
        self.evaluate_with_config(event, plan, inventory, &config)
    }

    /// 使用调用方提供的配置执行决策 (不写审计)
    pub fn evaluate_with_config(
        &self,
        event: &LossEvent,
        plan: &ProductionPlan,
        inventory: &InventoryTable,
        config: &DecisionConfig,
    ) -> ApiResult<DecisionResult> {
        let result = DecisionOrchestrator::new(config)
            .evaluate(event, plan, inventory, self.loss_event_repo.as_ref())
            .map_err(|e| {
                warn!(kind = e.kind(), error = %e, line = %event.line, "决策中止");
                ApiError::from(e)
            })?;
        info!(
            outcome = %result.outcome,
            line = %event.line,
            slot = %event.slot_key(),
            "决策完成"
        );
        Ok(result)
    }

    /// 执行决策并追加审计
    ///
    /// # 返回
    /// - (决策结果, 审计ID); 审计写入失败时审计ID为 None, 决策结果不变
    pub fn evaluate_and_audit(
        &self,
        event: &LossEvent,
        plan: &ProductionPlan,
        inventory: &InventoryTable,
        event_id: Option<&str>,
    ) -> ApiResult<(DecisionResult, Option<String>)> {
        let result = self.evaluate(event, plan, inventory)?;
        let audit_id = self.audit_sink.record(&result, event_id);
        Ok((result, audit_id))
    }

    /// 记录事件后立即决策
    ///
    /// 事件先落库; 决策失败时事件仍保留, 错误返回给调用方
    pub fn report_and_evaluate(
        &self,
        event: &LossEvent,
        plan: &ProductionPlan,
        inventory: &InventoryTable,
    ) -> ApiResult<DisruptionReport> {
        let record = self.record_loss_event(event)?;
        let (result, audit_id) =
            self.evaluate_and_audit(event, plan, inventory, Some(&record.event_id))?;
        Ok(DisruptionReport {
            record,
            result,
            audit_id,
        })
    }

    // ==========================================
    // 审计查询
    // ==========================================

    pub fn recent_audits(&self, limit: usize) -> ApiResult<Vec<DecisionAudit>> {
        Ok(self.audit_repo.list_recent(limit)?)
    }

    pub fn audits_for_event(&self, event_id: &str) -> ApiResult<Vec<DecisionAudit>> {
        Ok(self.audit_repo.list_by_event(event_id)?)
    }
}
