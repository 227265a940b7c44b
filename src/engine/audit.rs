// ==========================================
// 产能损失决策系统 - 决策审计输出
// ==========================================
// 职责: 定义审计写入 trait, 实现依赖倒置
// 说明: Engine 层定义 trait, Repository 层实现 SQLite 写入
// 约束: 审计失败只记录日志, 不改变决策结果
// ==========================================

use crate::domain::audit::DecisionAudit;
use crate::domain::decision::DecisionResult;
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 审计写入 Trait
// ==========================================

/// 决策审计写入者
///
/// # 返回
/// - `Ok(audit_id)`: 写入成功
/// - `Err`: 写入失败
pub trait DecisionAuditSink: Send + Sync {
    fn append(&self, audit: &DecisionAudit) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作审计写入者 (单元测试 / 临时评估)
#[derive(Debug, Clone, Default)]
pub struct NoOpAuditSink;

impl DecisionAuditSink for NoOpAuditSink {
    fn append(&self, audit: &DecisionAudit) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpAuditSink: 跳过审计写入 - outcome={}, line={}",
            audit.outcome,
            audit.production_line
        );
        Ok(String::new())
    }
}

/// 可选的审计写入者包装
pub struct OptionalAuditSink {
    inner: Option<Arc<dyn DecisionAuditSink>>,
}

impl OptionalAuditSink {
    pub fn with_sink(sink: Arc<dyn DecisionAuditSink>) -> Self {
        Self { inner: Some(sink) }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// 追加一条决策审计
    ///
    /// 任何失败 (序列化或写入) 只产生 warn 日志, 返回 None
    pub fn record(&self, result: &DecisionResult, event_id: Option<&str>) -> Option<String> {
        let sink = match &self.inner {
            Some(sink) => sink,
            None => {
                tracing::debug!(
                    "OptionalAuditSink: 未配置审计写入者, 跳过 - outcome={}",
                    result.outcome
                );
                return None;
            }
        };

        let audit = match DecisionAudit::from_result(result, event_id) {
            Ok(audit) => audit,
            Err(e) => {
                tracing::warn!(error = %e, outcome = %result.outcome, "决策结果序列化失败, 审计未写入");
                return None;
            }
        };

        match sink.append(&audit) {
            Ok(audit_id) => Some(audit_id),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    outcome = %result.outcome,
                    line = %result.event.line,
                    "决策审计写入失败, 决策结果不受影响"
                );
                None
            }
        }
    }
}

impl Default for OptionalAuditSink {
    fn default() -> Self {
        Self::none()
    }
}
