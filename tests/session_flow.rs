// End-to-end session scenarios through the public API

use keypass_ledger::{
    parse_script, to_canonical, to_display, Command, EntryKey, EntryKind, EventType, LedgerError,
    Session,
};

fn session_with(names: &[&str]) -> Session {
    let mut session = Session::new();
    for name in names {
        session.add_user(name).unwrap();
    }
    session
}

#[test]
fn test_buddhist_era_round_trip() {
    let canonical = to_canonical("05/07/2568").unwrap();
    assert_eq!(canonical, "2025-07-05");
    assert_eq!(to_display(&canonical), "05/07/2568");

    assert!(to_canonical("31/02/2568").is_none());
    assert!(to_canonical("32/01/2568").is_none());
    assert!(to_canonical("15/13/2568").is_none());
}

#[test]
fn test_alice_bob_scenario() {
    let mut session = session_with(&["Alice", "Bob"]);

    let stored = session
        .record_entry("Alice", EntryKind::Key, "Bob", "05/07/68")
        .unwrap();
    assert_eq!(stored, "2025-07-05");

    let err = session
        .record_entry("Alice", EntryKind::Key, "Bob", "05/07/2568")
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateDate { .. }));

    let stored = session
        .record_entry("Alice", EntryKind::Pass, "Bob", "05/07/68")
        .unwrap();
    assert_eq!(stored, "2025-07-05");
    assert_eq!(session.store().len(), 2);
}

#[test]
fn test_same_date_other_pair_is_accepted() {
    let mut session = session_with(&["A", "B", "C"]);
    session
        .record_entry("A", EntryKind::Key, "B", "01/01/2568")
        .unwrap();

    assert!(session.record_entry("C", EntryKind::Key, "B", "01/01/2568").is_ok());
    assert!(session.record_entry("A", EntryKind::Key, "C", "01/01/2568").is_ok());
    assert!(session.record_entry("A", EntryKind::Pass, "B", "01/01/2568").is_ok());
}

#[test]
fn test_non_date_values_repeat() {
    let mut session = session_with(&["A", "B"]);
    assert!(session.record_entry("A", EntryKind::Key, "B", "XYZ").is_ok());
    assert!(session.record_entry("A", EntryKind::Key, "B", "XYZ").is_ok());
    assert_eq!(
        session.store().values(&EntryKey::new("B", EntryKind::Key, "A")),
        &["XYZ", "XYZ"]
    );
}

#[test]
fn test_rename_moves_every_entry() {
    let mut session = session_with(&["A", "C"]);
    session.record_entry("A", EntryKind::Key, "C", "k1").unwrap();
    session.record_entry("C", EntryKind::Pass, "A", "p1").unwrap();
    session.record_entry("A", EntryKind::Pass, "C", "05/07/68").unwrap();
    let before = session.store().len();

    assert_eq!(session.rename_user("A", "B").unwrap(), "B");

    assert_eq!(session.users(), &["B", "C"]);
    assert_eq!(session.store().len(), before);
    assert!(session.store().iter().all(|(key, _)| !key.involves("A")));
    assert_eq!(
        session.store().values(&EntryKey::new("C", EntryKind::Key, "B")),
        &["k1"]
    );
    assert_eq!(
        session.store().values(&EntryKey::new("B", EntryKind::Pass, "C")),
        &["p1"]
    );

    // Date uniqueness follows the renamed party
    assert!(matches!(
        session.record_entry("B", EntryKind::Pass, "C", "05/07/2568"),
        Err(LedgerError::DuplicateDate { .. })
    ));
}

#[test]
fn test_rename_to_existing_name_changes_nothing() {
    let mut session = session_with(&["A", "B"]);
    session.record_entry("A", EntryKind::Key, "B", "k").unwrap();

    assert_eq!(
        session.rename_user("A", "B"),
        Err(LedgerError::DuplicateName("B".to_string()))
    );
    assert_eq!(session.rename_user("A", " "), Err(LedgerError::EmptyName));
    assert_eq!(session.users(), &["A", "B"]);
    assert_eq!(
        session.store().values(&EntryKey::new("B", EntryKind::Key, "A")),
        &["k"]
    );
}

#[test]
fn test_delete_cascades_only_to_the_party() {
    let mut session = session_with(&["A", "B", "C"]);
    session.record_entry("B", EntryKind::Key, "A", "a-recv").unwrap();
    session.record_entry("A", EntryKind::Key, "C", "a-sent").unwrap();
    session.record_entry("A", EntryKind::Pass, "B", "a-sent-pass").unwrap();
    session.record_entry("B", EntryKind::Key, "C", "keep-1").unwrap();
    session.record_entry("C", EntryKind::Pass, "B", "keep-2").unwrap();

    session.delete_user("A").unwrap();

    assert_eq!(session.users(), &["B", "C"]);
    assert_eq!(session.store().len(), 2);
    assert!(session.store().iter().all(|(key, _)| !key.involves("A")));
    assert_eq!(
        session.delete_user("A"),
        Err(LedgerError::UserNotFound("A".to_string()))
    );
}

#[test]
fn test_validate_cross_duplicate() {
    let mut session = session_with(&["X", "Y"]);
    session.record_entry("X", EntryKind::Key, "Y", "ABC").unwrap();
    session.record_entry("Y", EntryKind::Key, "X", "ABC").unwrap();

    let report = session.validate_all().unwrap();

    assert!(report.has_conflicts);
    assert_eq!(report.duplicates.len(), 1);
    let finding = &report.duplicates[0];
    assert_eq!(finding.kind, EntryKind::Key);
    assert_eq!(finding.value, "ABC");

    let mut receivers = finding.receivers.clone();
    receivers.sort();
    let mut senders = finding.senders.clone();
    senders.sort();
    assert_eq!(receivers, vec!["X", "Y"]);
    assert_eq!(senders, vec!["X", "Y"]);
    assert!(report.conflicts.is_empty());
}

#[test]
fn test_validate_without_entries() {
    let mut session = session_with(&["Solo"]);
    let report = session.validate_all().unwrap();

    assert!(!report.has_conflicts);
    assert_eq!(report.total_comparisons, 0);
    assert_eq!(report.total_users, 1);
}

#[test]
fn test_validate_without_users() {
    let mut session = Session::new();
    assert_eq!(session.validate_all().unwrap_err(), LedgerError::NoUsers);
}

#[test]
fn test_report_is_replaced_not_merged() {
    let mut session = session_with(&["X", "Y"]);
    session.record_entry("X", EntryKind::Key, "Y", "dup").unwrap();
    session.record_entry("Y", EntryKind::Key, "X", "dup").unwrap();
    assert!(session.validate_all().unwrap().has_conflicts);

    session.delete_user("Y").unwrap();
    let report = session.validate_all().unwrap();
    assert!(!report.has_conflicts);
    assert_eq!(session.last_report().unwrap().total_users, 1);
}

#[test]
fn test_replayed_script() {
    let script = r#"
        add Alice
        add Bob
        send Alice key Bob 05/07/68
        send Alice key Bob 05/07/2568
        send Alice pass Bob 05/07/68
        send Bob key Alice 05/07/68
        validate
    "#;

    let mut session = Session::new();
    let results: Vec<_> = parse_script(script)
        .into_iter()
        .map(|(_, parsed)| parsed.and_then(|cmd| session.apply(cmd)))
        .collect();

    assert_eq!(results.len(), 7);
    assert!(results[3].is_err());
    assert!(results.iter().enumerate().all(|(i, r)| i == 3 || r.is_ok()));

    let report = session.last_report().unwrap();
    assert_eq!(report.total_keys, 2);
    assert_eq!(report.total_passes, 1);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].value, "05/07/2568");
}

#[test]
fn test_snapshot_and_journal_after_reset() {
    let mut session = session_with(&["A", "B"]);
    session.record_entry("A", EntryKind::Key, "B", "k").unwrap();
    session.apply(Command::Reset).unwrap();

    let snapshot = session.snapshot();
    assert!(snapshot.users.is_empty());
    assert!(snapshot.rows.is_empty());
    assert_eq!(snapshot.total_entries, 0);
    assert_eq!(session.journal().last().unwrap().event_type, EventType::Reset);

    // The snapshot is what a UI would serialize and render
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["total_entries"], 0);
}
