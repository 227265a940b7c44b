// ==========================================
// 产能损失决策系统 - DOS 阈值判定
// ==========================================

use crate::domain::decision::ThresholdCheck;

pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// 比较预测 DOS 与最小阈值
    ///
    /// DOS 低于阈值时 shortfall = 阈值 - DOS, 否则为 0
    pub fn evaluate(dos: f64, threshold: f64) -> ThresholdCheck {
        let meets_threshold = dos >= threshold;
        let shortfall = if meets_threshold { 0.0 } else { threshold - dos };
        ThresholdCheck {
            dos,
            threshold,
            meets_threshold,
            shortfall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_threshold() {
        let check = ThresholdEvaluator::evaluate(0.571, 0.5);
        assert!(check.meets_threshold);
        assert_eq!(check.shortfall, 0.0);
    }

    #[test]
    fn test_shortfall() {
        let check = ThresholdEvaluator::evaluate(0.3, 0.5);
        assert!(!check.meets_threshold);
        assert!((check.shortfall - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_exactly_at_threshold_is_accepted() {
        let check = ThresholdEvaluator::evaluate(0.5, 0.5);
        assert!(check.meets_threshold);
        assert_eq!(check.shortfall, 0.0);
    }

    #[test]
    fn test_negative_dos_has_full_shortfall() {
        let check = ThresholdEvaluator::evaluate(-0.25, 0.5);
        assert!(!check.meets_threshold);
        assert_eq!(check.shortfall, 0.75);
    }
}
