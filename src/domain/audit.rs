// ==========================================
// 产能损失决策系统 - 决策审计记录
// ==========================================
// 用途: 决策追溯; 与 decision_audit 表一一对应
// ==========================================

use crate::domain::decision::DecisionResult;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAudit {
    pub audit_id: String,
    pub event_id: Option<String>, // 已持久化事件的ID; 临时评估时为 None
    pub outcome: String,
    pub production_line: String,
    pub affect_date: chrono::NaiveDate,
    pub affect_shift: String,
    pub dos_value: Option<f64>,
    pub compensation_needed: Option<f64>,
    pub recommendation: String,
    pub result_json: JsonValue,
    pub created_at: NaiveDateTime,
}

impl DecisionAudit {
    /// 由决策结果生成审计记录
    ///
    /// 审计ID与时间戳只存在于审计记录中, 不回写 DecisionResult
    pub fn from_result(
        result: &DecisionResult,
        event_id: Option<&str>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            audit_id: Uuid::new_v4().to_string(),
            event_id: event_id.map(|s| s.to_string()),
            outcome: result.outcome.as_str().to_string(),
            production_line: result.event.line.clone(),
            affect_date: result.event.date,
            affect_shift: result.event.shift.to_string(),
            dos_value: result.dos_value(),
            compensation_needed: result.compensation_needed(),
            recommendation: result.recommendation.clone(),
            result_json: serde_json::to_value(result)?,
            created_at: Utc::now().naive_utc(),
        })
    }
}
