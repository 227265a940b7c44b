// ==========================================
// 产能损失决策系统 - 建议文本
// ==========================================
// 面向操作员的中文建议, 数值统一保留两位小数
// 相同输入必须产生相同文本
// ==========================================

use crate::domain::decision::{
    CompensationPlan, DosBreakdown, EscalationCheck, NextShiftDemand, ThresholdCheck,
};

pub fn add_line(line: &str, escalation: &EscalationCheck) -> String {
    format!(
        "产线 {} 前 {} 个班次均有损失记录, 累计损失 {:.2} 超过阈值 {:.2}, 建议增加生产线",
        line,
        escalation.lookback_shifts.len(),
        escalation.total_loss,
        escalation.loss_threshold
    )
}

pub fn skip_event(line: &str, demand: &NextShiftDemand) -> String {
    format!(
        "产线 {} 后两班 ({} / {}) 均无需求预测, 无法形成库存风险信号, 跳过本次事件",
        line, demand.first_slot, demand.second_slot
    )
}

pub fn accepted(dos: &DosBreakdown, threshold: &ThresholdCheck) -> String {
    format!(
        "预测 DOS 为 {:.2} 天, 满足最小阈值 {:.2} 天, 无需调整排产",
        dos.dos, threshold.threshold
    )
}

pub fn compensation(threshold: &ThresholdCheck, plan: &CompensationPlan) -> String {
    let head = format!(
        "预测 DOS 为 {:.2} 天, 低于最小阈值 {:.2} 天",
        threshold.dos, threshold.threshold
    );

    if !plan.compensation_required {
        return format!(
            "{}; 预测产量 {:.2} 已不低于所需产量 {:.2}, 无需补偿",
            head, plan.forecast_output, plan.required_output
        );
    }

    let slots: Vec<String> = plan
        .viable_candidates()
        .map(|c| format!("{} (可吸收 {:.2})", c.slot.key(), c.absorbable))
        .collect();

    if plan.covers_need {
        format!(
            "{}; 需补偿产量 {:.2}, 后续班次可吸收 {:.2}, 建议安排在: {}",
            head,
            plan.compensation_needed,
            plan.total_absorbable,
            slots.join(", ")
        )
    } else if slots.is_empty() {
        format!(
            "{}; 需补偿产量 {:.2}, 后续 {} 个班次均无可用产能, 建议评估加班或增加生产线",
            head,
            plan.compensation_needed,
            plan.candidates.len()
        )
    } else {
        format!(
            "{}; 需补偿产量 {:.2}, 后续班次仅可吸收 {:.2} (缺口 {:.2}), 建议安排在: {}, 并评估加班或增加生产线",
            head,
            plan.compensation_needed,
            plan.total_absorbable,
            plan.compensation_needed - plan.total_absorbable,
            slots.join(", ")
        )
    }
}
