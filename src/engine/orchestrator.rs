// ==========================================
// 产能损失决策系统 - 决策编排器
// ==========================================
// 状态机 (单次调用, 单向执行, 无重试, 无中间持久化):
// START -> 加线判定 -> { ADD_LINE_REQUIRED
//                     | DOS 计算 -> { SKIP_EVENT
//                                   | CannotComputeDos (错误)
//                                   | 阈值判定 -> { ACCEPTED
//                                                 | 补偿方案 } } }
// 任一致命错误中止整次决策, 不产出部分结果
// ==========================================

use crate::config::DecisionConfig;
use crate::domain::decision::DecisionResult;
use crate::domain::loss_event::LossEvent;
use crate::domain::plan::ProductionPlan;
use crate::domain::types::DecisionOutcome;
use crate::engine::accessors::{InventoryAccessor, LossHistoryAccessor, PlanAccessor};
use crate::engine::calendar::ShiftCalendar;
use crate::engine::compensation::{CompensationInputs, CompensationPlanner};
use crate::engine::dos::{DemandResolution, DosCalculator};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::escalation::EscalationChecker;
use crate::engine::forecast::ForecastCalculator;
use crate::engine::recommendation;
use crate::engine::threshold::ThresholdEvaluator;
use tracing::{debug, info};

// ==========================================
// DecisionOrchestrator - 决策编排器
// ==========================================
pub struct DecisionOrchestrator<'a> {
    config: &'a DecisionConfig,
}

impl<'a> DecisionOrchestrator<'a> {
    pub fn new(config: &'a DecisionConfig) -> Self {
        Self { config }
    }

    /// 对一条损失事件做完整决策
    ///
    /// 班次日历每次从计划重新构建; 引擎不写任何参考数据
    ///
    /// # 参数
    /// - event: 上报的损失事件
    /// - plan: 生产计划快照
    /// - inventory: 库存访问
    /// - history: 历史损失访问
    pub fn evaluate<I, H>(
        &self,
        event: &LossEvent,
        plan: &ProductionPlan,
        inventory: &I,
        history: &H,
    ) -> EngineResult<DecisionResult>
    where
        I: InventoryAccessor + ?Sized,
        H: LossHistoryAccessor + ?Sized,
    {
        let calendar = ShiftCalendar::build(plan);
        self.evaluate_with_calendar(event, &calendar, plan, inventory, history)
    }

    /// 使用已构建的日历执行决策
    pub fn evaluate_with_calendar<P, I, H>(
        &self,
        event: &LossEvent,
        calendar: &ShiftCalendar,
        plan: &P,
        inventory: &I,
        history: &H,
    ) -> EngineResult<DecisionResult>
    where
        P: PlanAccessor + ?Sized,
        I: InventoryAccessor + ?Sized,
        H: LossHistoryAccessor + ?Sized,
    {
        let config = self.config;
        config.validate().map_err(EngineError::InvalidConfig)?;
        event.validate().map_err(EngineError::InvalidEvent)?;

        info!(
            line = %event.line,
            date = %event.date,
            shift = %event.shift,
            part_number = %event.part_number,
            lost_quantity = event.lost_quantity,
            remaining_repair_hours = event.remaining_repair_hours,
            "开始产能损失决策"
        );

        // ===== Step 1: 定位事件班次 =====
        let slot_key = event.slot_key();
        let ordinal = calendar.locate(event.date, event.shift)?;
        let event_slot = *calendar.offset(ordinal, 0)?;
        debug!(slot = %event_slot, "事件班次定位完成");

        // ===== Step 2: 加线判定 =====
        let escalation = EscalationChecker::new(
            config.escalation_lookback_shifts,
            config.escalation_loss_threshold,
        )
        .check(calendar, ordinal, &event.line, history)?;

        info!(
            line = %event.line,
            shifts_with_loss = escalation.shifts_with_loss,
            total_loss = escalation.total_loss,
            triggered = escalation.triggered,
            "加线判定完成"
        );

        if escalation.triggered {
            let recommendation = recommendation::add_line(&event.line, &escalation);
            return Ok(DecisionResult {
                event: event.clone(),
                event_slot,
                outcome: DecisionOutcome::AddLineRequired,
                escalation,
                forecast: None,
                next_shift_demand: None,
                dos: None,
                threshold: None,
                compensation: None,
                recommendation,
            });
        }

        // ===== Step 3: 本班产量预测 (E, C, D -> F) =====
        let baseline_line = config.baseline_row_for(&event.line);
        let baseline = plan.planned_quantity(baseline_line, None, &slot_key);
        let forecast = ForecastCalculator::new(config.shift_hours).forecast(
            &event.line,
            &slot_key,
            baseline,
            event.lost_quantity,
            event.remaining_repair_hours,
        )?;

        // ===== Step 4: 产品组库存 (G) 与原排产 (H) =====
        let group = inventory.group_inventory(&event.part_number)?;
        let scheduled_output = plan.planned_quantity(&event.line, Some(&event.part_number), &slot_key);
        debug!(
            group = %group.group,
            group_inventory = group.total,
            scheduled_output,
            "库存与原排产读取完成"
        );

        // ===== Step 5: 后两班需求 (I) =====
        let demand = match DosCalculator::next_shift_demand(calendar, ordinal, baseline_line, plan)? {
            DemandResolution::Skip(demand) => {
                info!(line = %event.line, "后两班均无需求, 跳过事件");
                let recommendation = recommendation::skip_event(&event.line, &demand);
                return Ok(DecisionResult {
                    event: event.clone(),
                    event_slot,
                    outcome: DecisionOutcome::SkipEvent,
                    escalation,
                    forecast: Some(forecast),
                    next_shift_demand: Some(demand),
                    dos: None,
                    threshold: None,
                    compensation: None,
                    recommendation,
                });
            }
            DemandResolution::Demand(demand) => demand,
        };

        // ===== Step 6: DOS 与阈值判定 =====
        let dos = DosCalculator::compute(
            group.total,
            forecast.forecast_output,
            scheduled_output,
            demand.resolved,
        )?;
        let threshold = ThresholdEvaluator::evaluate(dos.dos, config.min_dos_threshold);

        info!(
            line = %event.line,
            dos = dos.dos,
            level = ?dos.level,
            threshold = threshold.threshold,
            meets_threshold = threshold.meets_threshold,
            "DOS 计算完成"
        );

        if threshold.meets_threshold {
            let recommendation = recommendation::accepted(&dos, &threshold);
            return Ok(DecisionResult {
                event: event.clone(),
                event_slot,
                outcome: DecisionOutcome::Accepted,
                escalation,
                forecast: Some(forecast),
                next_shift_demand: Some(demand),
                dos: Some(dos),
                threshold: Some(threshold),
                compensation: None,
                recommendation,
            });
        }

        // ===== Step 7: 补偿方案 =====
        let inputs = CompensationInputs {
            threshold: config.min_dos_threshold,
            demand: demand.resolved,
            scheduled_output,
            group_inventory: group.total,
            forecast_output: forecast.forecast_output,
        };
        let compensation =
            CompensationPlanner::new(config).plan(calendar, ordinal, &event.line, plan, &inputs);
        let recommendation = recommendation::compensation(&threshold, &compensation);

        Ok(DecisionResult {
            event: event.clone(),
            event_slot,
            outcome: DecisionOutcome::CompensationRequired,
            escalation,
            forecast: Some(forecast),
            next_shift_demand: Some(demand),
            dos: Some(dos),
            threshold: Some(threshold),
            compensation: Some(compensation),
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::{InventoryRecord, InventoryTable, ProductGroup};
    use crate::domain::loss_event::HistoricalLossRecord;
    use crate::domain::plan::PlanRow;
    use crate::domain::shift::SlotKey;
    use crate::domain::types::{RowKind, ShiftCode};
    use crate::engine::accessors::LossHistorySnapshot;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn key(day: u32, shift: ShiftCode) -> SlotKey {
        SlotKey::new(d(day), shift)
    }

    /// 3月1日 T1..T4: 基准预测 1100 / 300 / 400 / 500, 排产 900 / 5000 / 5000 / 0
    fn plan(next_two: (f64, f64)) -> ProductionPlan {
        ProductionPlan::from_rows(vec![
            PlanRow::new("F16", RowKind::BaselineForecast)
                .with_quantity(key(1, ShiftCode::T1), 1100.0)
                .with_quantity(key(1, ShiftCode::T2), 1100.0)
                .with_quantity(key(1, ShiftCode::T3), next_two.0)
                .with_quantity(key(1, ShiftCode::T4), next_two.1),
            PlanRow::new("F16", RowKind::Production)
                .with_product("EvansBP")
                .with_part_number("200723400")
                .with_quantity(key(1, ShiftCode::T1), 900.0)
                .with_quantity(key(1, ShiftCode::T2), 900.0)
                .with_quantity(key(1, ShiftCode::T3), 5_000.0)
                .with_quantity(key(1, ShiftCode::T4), 5_000.0),
        ])
    }

    fn inventory(on_hand: f64) -> InventoryTable {
        InventoryTable::new(vec![InventoryRecord::new(
            "200723400",
            ProductGroup::new("EvansBP", "16"),
            on_hand,
        )])
    }

    fn event() -> LossEvent {
        LossEvent::new(d(1), ShiftCode::T2, "F16", "200723400", 100.0, 2.0)
    }

    #[test]
    fn test_accepted_path() {
        let config = DecisionConfig::default();
        let result = DecisionOrchestrator::new(&config)
            .evaluate(&event(), &plan((300.0, 400.0)), &inventory(500.0), &LossHistorySnapshot::default())
            .unwrap();

        assert_eq!(result.outcome, DecisionOutcome::Accepted);
        assert_eq!(result.forecast.as_ref().unwrap().forecast_output, 800.0);
        let dos = result.dos.as_ref().unwrap();
        assert_eq!(dos.demand, 700.0);
        assert!((dos.dos - 400.0 / 700.0).abs() < 1e-9);
        assert!(result.compensation.is_none());
    }

    #[test]
    fn test_compensation_path() {
        let config = DecisionConfig::default();
        let result = DecisionOrchestrator::new(&config)
            .evaluate(&event(), &plan((300.0, 400.0)), &inventory(100.0), &LossHistorySnapshot::default())
            .unwrap();

        // DOS = (100 + 800 - 900) / 700 = 0
        assert_eq!(result.outcome, DecisionOutcome::CompensationRequired);
        let comp = result.compensation.as_ref().unwrap();
        // F' = 0.5 * 700 + 900 - 100 = 1150
        assert_eq!(comp.required_output, 1150.0);
        assert_eq!(comp.compensation_needed, 350.0);
        assert_eq!(comp.candidates.len(), 2);
        // F16 产能 6000, 排产 5000 -> 每班可吸收 1000
        assert_eq!(comp.total_absorbable, 2_000.0);
        assert!(comp.covers_need);
    }

    #[test]
    fn test_skip_event_when_both_next_zero() {
        let config = DecisionConfig::default();
        let result = DecisionOrchestrator::new(&config)
            .evaluate(&event(), &plan((0.0, 0.0)), &inventory(500.0), &LossHistorySnapshot::default())
            .unwrap();
        assert_eq!(result.outcome, DecisionOutcome::SkipEvent);
        assert!(result.dos.is_none());
    }

    #[test]
    fn test_escalation_short_circuits_before_forecast() {
        let config = DecisionConfig::default();
        // 事件班次基准预测为 0, 但加线判定先于预测, 不应报 NoForecastData
        let plan = ProductionPlan::from_rows(vec![PlanRow::new("F16", RowKind::Production)
            .with_quantity(key(1, ShiftCode::T1), 1.0)
            .with_quantity(key(1, ShiftCode::T2), 1.0)
            .with_quantity(key(1, ShiftCode::T3), 1.0)
            .with_quantity(key(1, ShiftCode::T4), 1.0)]);
        let record = |shift: ShiftCode, qty: f64| HistoricalLossRecord {
            event_id: shift.to_string(),
            date: d(1),
            shift,
            line: "F16".to_string(),
            part_number: None,
            lost_quantity: qty,
            remaining_repair_hours: 0.0,
            created_at: d(1).and_hms_opt(0, 0, 0).unwrap(),
        };
        let history = LossHistorySnapshot::new(vec![
            record(ShiftCode::T1, 4000.0),
            record(ShiftCode::T2, 4000.0),
            record(ShiftCode::T3, 3000.0),
        ]);
        let event = LossEvent::new(d(1), ShiftCode::T4, "F16", "200723400", 100.0, 2.0);

        let result = DecisionOrchestrator::new(&config)
            .evaluate(&event, &plan, &InventoryTable::default(), &history)
            .unwrap();
        assert_eq!(result.outcome, DecisionOutcome::AddLineRequired);
        assert!(result.forecast.is_none());
    }

    #[test]
    fn test_fatal_errors_abort() {
        let config = DecisionConfig::default();
        let orchestrator = DecisionOrchestrator::new(&config);
        let history = LossHistorySnapshot::default();

        let missing_slot = LossEvent::new(d(9), ShiftCode::T2, "F16", "200723400", 100.0, 2.0);
        assert!(matches!(
            orchestrator.evaluate(&missing_slot, &plan((300.0, 400.0)), &inventory(500.0), &history),
            Err(EngineError::SlotNotFound { .. })
        ));

        let no_baseline = LossEvent::new(d(1), ShiftCode::T2, "F17", "200723400", 100.0, 2.0);
        assert!(matches!(
            orchestrator.evaluate(&no_baseline, &plan((300.0, 400.0)), &inventory(500.0), &history),
            Err(EngineError::NoForecastData { .. })
        ));

        let unknown_part = LossEvent::new(d(1), ShiftCode::T2, "F16", "999", 100.0, 2.0);
        assert!(matches!(
            orchestrator.evaluate(&unknown_part, &plan((300.0, 400.0)), &inventory(500.0), &history),
            Err(EngineError::GroupNotFound { .. })
        ));

        let at_end = LossEvent::new(d(1), ShiftCode::T4, "F16", "200723400", 100.0, 2.0);
        let mut p = plan((300.0, 400.0));
        p.rows[0].quantities.insert(key(1, ShiftCode::T4), 1100.0);
        assert!(matches!(
            orchestrator.evaluate(&at_end, &p, &inventory(500.0), &history),
            Err(EngineError::CannotComputeDos { .. })
        ));
    }

    #[test]
    fn test_oversized_window_config_is_rejected() {
        let mut config = DecisionConfig::default();
        config.escalation_lookback_shifts = usize::MAX;
        let result = DecisionOrchestrator::new(&config).evaluate(
            &event(),
            &plan((300.0, 400.0)),
            &inventory(500.0),
            &LossHistorySnapshot::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));

        let mut config = DecisionConfig::default();
        config.compensation_lookahead_shifts = usize::MAX;
        let result = DecisionOrchestrator::new(&config).evaluate(
            &event(),
            &plan((300.0, 400.0)),
            &inventory(100.0),
            &LossHistorySnapshot::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_baseline_row_mapping_is_used() {
        let config = DecisionConfig::default().with_baseline_row("F16B", "F16");
        let mut p = plan((300.0, 400.0));
        p.rows.push(
            PlanRow::new("F16B", RowKind::Production)
                .with_part_number("200723400")
                .with_quantity(key(1, ShiftCode::T2), 900.0),
        );
        let event = LossEvent::new(d(1), ShiftCode::T2, "F16B", "200723400", 100.0, 2.0);
        let result = DecisionOrchestrator::new(&config)
            .evaluate(&event, &p, &inventory(500.0), &LossHistorySnapshot::default())
            .unwrap();
        assert_eq!(result.forecast.unwrap().baseline_forecast, 1100.0);
    }

    #[test]
    fn test_idempotent() {
        let config = DecisionConfig::default();
        let orchestrator = DecisionOrchestrator::new(&config);
        let p = plan((0.0, 600.0));
        let inv = inventory(100.0);
        let history = LossHistorySnapshot::default();
        let a = orchestrator.evaluate(&event(), &p, &inv, &history).unwrap();
        let b = orchestrator.evaluate(&event(), &p, &inv, &history).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        assert_eq!(a.next_shift_demand.unwrap().resolved, 1200.0);
    }
}
