// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 损失事件 / 决策审计的持久化与查询
// ==========================================

mod test_helpers;

use capacity_loss_aps::config::DecisionConfig;
use capacity_loss_aps::domain::{DecisionAudit, ShiftCode};
use capacity_loss_aps::engine::{LossHistoryAccessor, LossHistorySnapshot};
use capacity_loss_aps::repository::{
    DecisionAuditRepository, LossEventRepository, RepositoryError,
};
use capacity_loss_aps::DecisionOrchestrator;
use test_helpers::*;

#[test]
fn test_loss_event_insert_and_query() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LossEventRepository::new(&db_path).expect("Failed to create repo");

    let record = repo.insert(&standard_event()).expect("Failed to insert");
    assert!(!record.event_id.is_empty());
    assert_eq!(record.line, "F16");
    assert_eq!(record.lost_quantity, 100.0);

    let found = repo.find_by_id(&record.event_id).unwrap().unwrap();
    assert_eq!(found.event_id, record.event_id);
    assert_eq!(found.shift, ShiftCode::T2);
    assert_eq!(found.part_number.as_deref(), Some("200723400"));

    let listed = repo.list_by_line_and_date("F16", d(1)).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(repo.list_by_line_and_date("F17", d(1)).unwrap().is_empty());
}

#[test]
fn test_loss_event_rejects_invalid_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LossEventRepository::new(&db_path).expect("Failed to create repo");

    let result = repo.insert(&event_at(1, ShiftCode::T1, "", 100.0));
    assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn test_loss_event_delete() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LossEventRepository::new(&db_path).expect("Failed to create repo");

    let record = repo.insert(&standard_event()).unwrap();
    repo.delete(&record.event_id).unwrap();
    assert!(repo.find_by_id(&record.event_id).unwrap().is_none());

    assert!(matches!(
        repo.delete(&record.event_id),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_loss_for_sums_same_slot_and_matches_line_exactly() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LossEventRepository::new(&db_path).expect("Failed to create repo");

    repo.insert(&event_at(1, ShiftCode::T3, "F16", 1_500.0)).unwrap();
    repo.insert(&event_at(1, ShiftCode::T3, "F16", 500.0)).unwrap();
    repo.insert(&event_at(1, ShiftCode::T3, "F17", 9_000.0)).unwrap();

    assert_eq!(
        repo.loss_for("F16", &key(1, ShiftCode::T3)).unwrap(),
        Some(2_000.0)
    );
    assert_eq!(repo.loss_for("F16", &key(1, ShiftCode::T4)).unwrap(), None);
    assert_eq!(repo.loss_for("F1", &key(1, ShiftCode::T3)).unwrap(), None);
}

#[test]
fn test_repository_history_matches_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LossEventRepository::new(&db_path).expect("Failed to create repo");

    for (shift, lost) in [
        (ShiftCode::T1, 4_000.0),
        (ShiftCode::T2, 4_000.0),
        (ShiftCode::T3, 3_000.0),
    ] {
        repo.insert(&event_at(1, shift, "F16", lost)).unwrap();
    }
    let snapshot = LossHistorySnapshot::new(repo.list_all().unwrap());

    for shift in ShiftCode::ALL {
        assert_eq!(
            repo.loss_for("F16", &key(1, shift)).unwrap(),
            snapshot.loss_for("F16", &key(1, shift)).unwrap()
        );
    }
}

#[test]
fn test_decision_audit_persistence() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    let loss_repo = LossEventRepository::from_connection(conn.clone());
    let audit_repo = DecisionAuditRepository::from_connection(conn);

    let record = loss_repo.insert(&standard_event()).unwrap();
    let config = DecisionConfig::default();
    let result = DecisionOrchestrator::new(&config)
        .evaluate(
            &standard_event(),
            &standard_plan((300.0, 400.0)),
            &standard_inventory(100.0),
            &loss_repo,
        )
        .unwrap();

    let audit = DecisionAudit::from_result(&result, Some(&record.event_id)).unwrap();
    let audit_id = audit_repo.insert(&audit).unwrap();
    assert_eq!(audit_id, audit.audit_id);

    let by_event = audit_repo.list_by_event(&record.event_id).unwrap();
    assert_eq!(by_event.len(), 1);
    assert_eq!(by_event[0].outcome, "COMPENSATION_REQUIRED");
    assert_eq!(by_event[0].compensation_needed, Some(350.0));
    assert_eq!(by_event[0].affect_shift, "T2");

    // 审计中保存的结果 JSON 可还原为原始决策
    let restored: capacity_loss_aps::DecisionResult =
        serde_json::from_value(by_event[0].result_json.clone()).unwrap();
    assert_eq!(restored, result);
}

#[test]
fn test_decision_audit_unknown_event_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let audit_repo = DecisionAuditRepository::new(&db_path).expect("Failed to create repo");

    let config = DecisionConfig::default();
    let result = DecisionOrchestrator::new(&config)
        .evaluate(
            &standard_event(),
            &standard_plan((300.0, 400.0)),
            &standard_inventory(500.0),
            &LossHistorySnapshot::default(),
        )
        .unwrap();

    let audit = DecisionAudit::from_result(&result, Some("missing-event")).unwrap();
    assert!(matches!(
        audit_repo.insert(&audit),
        Err(RepositoryError::ForeignKeyViolation(_))
    ));

    // 临时评估 (无事件ID) 可以写入
    let audit = DecisionAudit::from_result(&result, None).unwrap();
    audit_repo.insert(&audit).unwrap();
    assert_eq!(audit_repo.list_recent(10).unwrap().len(), 1);
}
