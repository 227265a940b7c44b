// ==========================================
// 产能损失决策系统 - 领域类型定义
// ==========================================
// 班次代码 / 计划行类型 / 决策结论 / DOS 水平
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次代码 (Shift Code)
// ==========================================
// 每天固定 4 个班次, 排序按 T1 < T2 < T3 < T4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftCode {
    T1,
    T2,
    T3,
    T4,
}

impl ShiftCode {
    /// 全部班次 (按日内顺序)
    pub const ALL: [ShiftCode; 4] = [ShiftCode::T1, ShiftCode::T2, ShiftCode::T3, ShiftCode::T4];

    /// 日内排序序号 (1..=4)
    pub fn rank(&self) -> u8 {
        match self {
            ShiftCode::T1 => 1,
            ShiftCode::T2 => 2,
            ShiftCode::T3 => 3,
            ShiftCode::T4 => 4,
        }
    }

    /// 解析班次代码
    ///
    /// 接受 "T1" / "t1" / "1" 三种写法, 其余返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_uppercase();
        let s = s.strip_prefix('T').unwrap_or(&s);
        match s {
            "1" => Some(ShiftCode::T1),
            "2" => Some(ShiftCode::T2),
            "3" => Some(ShiftCode::T3),
            "4" => Some(ShiftCode::T4),
            _ => None,
        }
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.rank())
    }
}

// ==========================================
// 计划行类型 (Row Kind)
// ==========================================
// 导入时一次性打标, 下游只做结构化查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowKind {
    Production,       // 正常生产行
    BaselineForecast, // 产线基准预测行
    Rework,           // 返工
    Recycle,          // 回收
    Maintenance,      // 保养/维修
}

impl RowKind {
    /// 是否为与补偿争夺产能的竞争事件行
    pub fn is_competing(&self) -> bool {
        matches!(self, RowKind::Rework | RowKind::Recycle | RowKind::Maintenance)
    }

    /// 根据行标记文本识别类型
    ///
    /// 空白或无法识别的标记按生产行处理
    pub fn from_marker(marker: &str) -> Self {
        let m = marker.trim().to_lowercase();
        if m.is_empty() {
            return RowKind::Production;
        }
        if m.contains("forecast") || m.contains("baseline") || m.contains("预测") {
            RowKind::BaselineForecast
        } else if m.contains("rework") || m.contains("返工") {
            RowKind::Rework
        } else if m.contains("recycle") || m.contains("回收") {
            RowKind::Recycle
        } else if m.contains("maint") || m == "pm" || m.contains("保养") || m.contains("维修") {
            RowKind::Maintenance
        } else {
            RowKind::Production
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Production => write!(f, "PRODUCTION"),
            RowKind::BaselineForecast => write!(f, "BASELINE_FORECAST"),
            RowKind::Rework => write!(f, "REWORK"),
            RowKind::Recycle => write!(f, "RECYCLE"),
            RowKind::Maintenance => write!(f, "MAINTENANCE"),
        }
    }
}

// ==========================================
// 决策结论 (Decision Outcome)
// ==========================================
// 状态机的成功终态; 致命错误走 EngineError
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    AddLineRequired,      // 前序班次连续损失, 建议加线
    SkipEvent,            // 后两班无需求, 无法形成库存风险信号
    Accepted,             // 预测 DOS 满足阈值
    CompensationRequired, // DOS 低于阈值, 已生成补偿方案
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::AddLineRequired => "ADD_LINE_REQUIRED",
            DecisionOutcome::SkipEvent => "SKIP_EVENT",
            DecisionOutcome::Accepted => "ACCEPTED",
            DecisionOutcome::CompensationRequired => "COMPENSATION_REQUIRED",
        }
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// DOS 水平 (Days-Of-Supply Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DosLevel {
    Critical, // < 0.5 天, 严重不足
    Low,      // < 1.0 天, 不足
    Caution,  // < 2.0 天, 偏低
    Normal,   // 正常
}

impl DosLevel {
    pub const CRITICAL_BELOW_DAYS: f64 = 0.5;
    pub const LOW_BELOW_DAYS: f64 = 1.0;
    pub const CAUTION_BELOW_DAYS: f64 = 2.0;

    pub fn classify(dos: f64) -> Self {
        if dos < Self::CRITICAL_BELOW_DAYS {
            DosLevel::Critical
        } else if dos < Self::LOW_BELOW_DAYS {
            DosLevel::Low
        } else if dos < Self::CAUTION_BELOW_DAYS {
            DosLevel::Caution
        } else {
            DosLevel::Normal
        }
    }
}

impl fmt::Display for DosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DosLevel::Critical => write!(f, "CRITICAL"),
            DosLevel::Low => write!(f, "LOW"),
            DosLevel::Caution => write!(f, "CAUTION"),
            DosLevel::Normal => write!(f, "NORMAL"),
        }
    }
}
