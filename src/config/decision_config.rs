// ==========================================
// 产能损失决策系统 - 决策配置
// ==========================================
// 所有业务阈值集中在一个显式配置值中,
// 调用时传入编排器, 单次决策期间不可变
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认最小 DOS 阈值 (天)
pub const DEFAULT_MIN_DOS_THRESHOLD: f64 = 0.5;
/// 默认单班有效生产工时
pub const DEFAULT_SHIFT_HOURS: f64 = 11.0;
/// 默认加线判定累计损失阈值
pub const DEFAULT_ESCALATION_LOSS_THRESHOLD: f64 = 10_000.0;
/// 默认加线判定回看班次数
pub const DEFAULT_ESCALATION_LOOKBACK_SHIFTS: usize = 3;
/// 默认补偿候选班次数
pub const DEFAULT_COMPENSATION_LOOKAHEAD_SHIFTS: usize = 2;
/// 默认保养占用工时
pub const DEFAULT_MAINTENANCE_HOURS: f64 = 2.0;
/// 默认单班产线产能 (无产线专属配置时使用)
pub const DEFAULT_LINE_CAPACITY: f64 = 8_000.0;
/// 回看/前瞻窗口的最大班次数 (7 天 x 4 班)
pub const MAX_WINDOW_SHIFTS: usize = 28;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub min_dos_threshold: f64,
    pub shift_hours: f64,
    pub escalation_loss_threshold: f64,
    pub escalation_lookback_shifts: usize,
    pub compensation_lookahead_shifts: usize,
    pub maintenance_hours: f64,
    pub default_line_capacity: f64,
    // 产线 -> 单班产能
    pub line_capacities: BTreeMap<String, f64>,
    // 产线 -> 基准预测行所属产线键; 未配置时取产线自身
    pub baseline_row_mapping: BTreeMap<String, String>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_dos_threshold: DEFAULT_MIN_DOS_THRESHOLD,
            shift_hours: DEFAULT_SHIFT_HOURS,
            escalation_loss_threshold: DEFAULT_ESCALATION_LOSS_THRESHOLD,
            escalation_lookback_shifts: DEFAULT_ESCALATION_LOOKBACK_SHIFTS,
            compensation_lookahead_shifts: DEFAULT_COMPENSATION_LOOKAHEAD_SHIFTS,
            maintenance_hours: DEFAULT_MAINTENANCE_HOURS,
            default_line_capacity: DEFAULT_LINE_CAPACITY,
            line_capacities: default_line_capacities(),
            baseline_row_mapping: BTreeMap::new(),
        }
    }
}

/// 各产线的默认单班产能
pub fn default_line_capacities() -> BTreeMap<String, f64> {
    [
        ("F16", 6_000.0),
        ("F17", 10_000.0),
        ("F25", 2_800.0),
        ("F27", 10_000.0),
        ("F29", 12_000.0),
        ("F35", 8_000.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl DecisionConfig {
    /// 产线单班产能: 专属配置优先, 否则取默认值
    pub fn line_capacity(&self, line: &str) -> f64 {
        self.line_capacities
            .get(line.trim())
            .copied()
            .unwrap_or(self.default_line_capacity)
    }

    /// 产线对应的基准预测行键
    pub fn baseline_row_for<'a>(&'a self, line: &'a str) -> &'a str {
        self.baseline_row_mapping
            .get(line.trim())
            .map(String::as_str)
            .unwrap_or_else(|| line.trim())
    }

    pub fn with_min_dos_threshold(mut self, threshold: f64) -> Self {
        self.min_dos_threshold = threshold;
        self
    }

    pub fn with_line_capacity(mut self, line: &str, capacity: f64) -> Self {
        self.line_capacities.insert(line.trim().to_string(), capacity);
        self
    }

    pub fn with_baseline_row(mut self, line: &str, baseline_line: &str) -> Self {
        self.baseline_row_mapping
            .insert(line.trim().to_string(), baseline_line.trim().to_string());
        self
    }

    /// 配置合法性校验
    ///
    /// # 返回
    /// - Ok(()): 合法
    /// - Err(String): 第一条违规原因
    pub fn validate(&self) -> Result<(), String> {
        if !(self.shift_hours.is_finite() && self.shift_hours > 0.0) {
            return Err(format!("班次工时必须为正数: {}", self.shift_hours));
        }
        if !(self.min_dos_threshold.is_finite() && self.min_dos_threshold >= 0.0) {
            return Err(format!("最小DOS阈值不能为负: {}", self.min_dos_threshold));
        }
        if !(self.escalation_loss_threshold.is_finite() && self.escalation_loss_threshold >= 0.0) {
            return Err(format!(
                "加线损失阈值不能为负: {}",
                self.escalation_loss_threshold
            ));
        }
        if self.escalation_lookback_shifts == 0 {
            return Err("加线回看班次数必须大于0".to_string());
        }
        if self.escalation_lookback_shifts > MAX_WINDOW_SHIFTS {
            return Err(format!(
                "加线回看班次数不能超过 {}: {}",
                MAX_WINDOW_SHIFTS, self.escalation_lookback_shifts
            ));
        }
        if self.compensation_lookahead_shifts > MAX_WINDOW_SHIFTS {
            return Err(format!(
                "补偿候选班次数不能超过 {}: {}",
                MAX_WINDOW_SHIFTS, self.compensation_lookahead_shifts
            ));
        }
        if !(self.maintenance_hours >= 0.0 && self.maintenance_hours <= self.shift_hours) {
            return Err(format!(
                "保养工时必须在 [0, {}] 之间: {}",
                self.shift_hours, self.maintenance_hours
            ));
        }
        if !(self.default_line_capacity.is_finite() && self.default_line_capacity >= 0.0) {
            return Err(format!("默认产线产能不能为负: {}", self.default_line_capacity));
        }
        if let Some((line, cap)) = self.line_capacities.iter().find(|(_, c)| !(**c >= 0.0)) {
            return Err(format!("产线 {} 产能配置非法: {}", line, cap));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DecisionConfig::default();
        assert_eq!(cfg.min_dos_threshold, 0.5);
        assert_eq!(cfg.shift_hours, 11.0);
        assert_eq!(cfg.escalation_loss_threshold, 10_000.0);
        assert_eq!(cfg.escalation_lookback_shifts, 3);
        assert_eq!(cfg.compensation_lookahead_shifts, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_line_capacity_falls_back_to_default() {
        let cfg = DecisionConfig::default().with_line_capacity("L9", 4_000.0);
        assert_eq!(cfg.line_capacity("F25"), 2_800.0);
        assert_eq!(cfg.line_capacity("L9"), 4_000.0);
        assert_eq!(cfg.line_capacity("UNKNOWN"), DEFAULT_LINE_CAPACITY);
    }

    #[test]
    fn test_baseline_row_mapping() {
        let cfg = DecisionConfig::default().with_baseline_row("F16B", "F16");
        assert_eq!(cfg.baseline_row_for("F16B"), "F16");
        assert_eq!(cfg.baseline_row_for("F17"), "F17");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = DecisionConfig::default();
        cfg.shift_hours = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = DecisionConfig::default();
        cfg.escalation_lookback_shifts = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = DecisionConfig::default();
        cfg.maintenance_hours = 12.0;
        assert!(cfg.validate().is_err());

        let cfg = DecisionConfig::default().with_line_capacity("F16", -1.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_caps_window_sizes() {
        let mut cfg = DecisionConfig::default();
        cfg.escalation_lookback_shifts = MAX_WINDOW_SHIFTS;
        cfg.compensation_lookahead_shifts = MAX_WINDOW_SHIFTS;
        assert!(cfg.validate().is_ok());

        let mut cfg = DecisionConfig::default();
        cfg.escalation_lookback_shifts = usize::MAX;
        assert!(cfg.validate().is_err());

        let mut cfg = DecisionConfig::default();
        cfg.compensation_lookahead_shifts = MAX_WINDOW_SHIFTS + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: DecisionConfig = serde_json::from_str(r#"{"min_dos_threshold": 0.8}"#).unwrap();
        assert_eq!(cfg.min_dos_threshold, 0.8);
        assert_eq!(cfg.shift_hours, 11.0);
    }
}
