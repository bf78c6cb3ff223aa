use chrono::NaiveDate;
use lifeos_core::db::{open_db, open_db_in_memory};
use lifeos_core::{
    CompletionCommit, LevelTable, MasteryLevel, ProgressRepository, ProgressionConfig,
    ProgressionEngine, ProgressionService, ProtocolId, ProtocolMastery, RepoError, ServiceError,
    SqliteProgressRepository, StreakCatalyst, StreakOutcome,
};
use rusqlite::Connection;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, d).expect("valid date")
}

fn engine() -> ProgressionEngine {
    ProgressionEngine::new(ProgressionConfig {
        level_thresholds: LevelTable::new(vec![0, 100, 250, 500]),
        xp_per_completion: 40,
        ..ProgressionConfig::default()
    })
}

fn service(conn: &mut Connection) -> ProgressionService<SqliteProgressRepository<'_>> {
    let repo = SqliteProgressRepository::try_new(conn).unwrap();
    ProgressionService::new(repo, engine())
}

#[test]
fn consecutive_days_build_streak_and_xp() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    for d in 1..=3 {
        let outcome = service.complete_protocol("meditation", day(d)).unwrap();
        assert_eq!(outcome.mastery.streak, d);
    }

    let mastery = service.mastery("meditation", day(3)).unwrap();
    assert_eq!(mastery.streak, 3);
    assert_eq!(mastery.level, MasteryLevel::Adept);
    assert_eq!(mastery.xp, 120);

    let xp = service.user_xp().unwrap();
    assert_eq!(xp.level, 2);
    assert_eq!(xp.current, 20);
    assert_eq!(xp.next_level, 150);
}

#[test]
fn completing_twice_on_one_day_is_counted_once() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let first = service.complete_protocol("cold_exposure", day(4)).unwrap();
    assert_eq!(first.streak_outcome, StreakOutcome::Reset);

    let second = service.complete_protocol("Cold_Exposure", day(4)).unwrap();
    assert_eq!(second.streak_outcome, StreakOutcome::AlreadyCounted);
    assert_eq!(second.xp_awarded, 0);
    assert_eq!(service.user_xp().unwrap().current, 40);

    let history = service.history(Some("cold_exposure")).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn skipped_day_resets_streak() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.complete_protocol("journaling", day(1)).unwrap();
    service.complete_protocol("journaling", day(2)).unwrap();
    let outcome = service.complete_protocol("journaling", day(4)).unwrap();

    assert_eq!(outcome.streak_outcome, StreakOutcome::Reset);
    assert_eq!(outcome.mastery.streak, 1);
    assert_eq!(outcome.mastery.xp, 120);
}

#[test]
fn catalyst_is_granted_once_and_consumed_by_continued_streak() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    assert!(service.grant_streak_catalyst().unwrap());
    assert!(!service.grant_streak_catalyst().unwrap());

    // A reset does not consume the catalyst.
    let first = service.complete_protocol("breathwork", day(10)).unwrap();
    assert!(!first.catalyst_consumed);
    assert!(service.catalyst().unwrap().is_armed());

    let second = service.complete_protocol("breathwork", day(11)).unwrap();
    assert!(second.catalyst_consumed);
    assert_eq!(second.mastery.streak, 3);
    assert_eq!(second.xp_awarded, 80);
    assert!(!service.catalyst().unwrap().is_armed());
}

#[test]
fn history_groups_protocols_per_day() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.complete_protocol("walk", day(2)).unwrap();
    service.complete_protocol("meditation", day(1)).unwrap();
    service.complete_protocol("meditation", day(2)).unwrap();

    let history = service.history(None).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, day(1));
    assert_eq!(history[1].completed_protocols.len(), 2);

    let listed: Vec<String> = service
        .list_mastery(day(2))
        .unwrap()
        .into_iter()
        .map(|mastery| mastery.protocol_id.to_string())
        .collect();
    assert_eq!(listed, vec!["meditation", "walk"]);
}

#[test]
fn backdated_completion_is_rejected_and_keeps_streak() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    for d in 10..=12 {
        service.complete_protocol("meditation", day(d)).unwrap();
    }

    let err = service.complete_protocol("meditation", day(5)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::CompletionBeforeLatest { requested, latest }
            if requested == day(5) && latest == day(12)
    ));
    assert_eq!(service.history(Some("meditation")).unwrap().len(), 3);
    assert_eq!(service.user_xp().unwrap().current, 20);

    let next = service.complete_protocol("meditation", day(13)).unwrap();
    assert_eq!(next.streak_outcome, StreakOutcome::Continued);
    assert_eq!(next.mastery.streak, 4);
}

#[test]
fn backdating_one_protocol_does_not_block_another() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.complete_protocol("walk", day(12)).unwrap();
    let outcome = service.complete_protocol("sauna", day(5)).unwrap();
    assert_eq!(outcome.streak_outcome, StreakOutcome::Reset);
}

#[test]
fn lapsed_streak_reads_as_zero() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    for d in 1..=7 {
        service.complete_protocol("meditation", day(d)).unwrap();
    }
    service.complete_protocol("walk", day(9)).unwrap();

    let live = service.mastery("meditation", day(8)).unwrap();
    assert_eq!(live.streak, 7);
    assert_eq!(live.level, MasteryLevel::Expert);

    let lapsed = service.mastery("meditation", day(9)).unwrap();
    assert_eq!(lapsed.streak, 0);
    assert_eq!(lapsed.level, MasteryLevel::Novice);
    assert_eq!(lapsed.xp, 280);

    let listed: Vec<(String, u32, MasteryLevel)> = service
        .list_mastery(day(10))
        .unwrap()
        .into_iter()
        .map(|mastery| (mastery.protocol_id.to_string(), mastery.streak, mastery.level))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("meditation".to_string(), 0, MasteryLevel::Novice),
            ("walk".to_string(), 1, MasteryLevel::Novice),
        ]
    );

    let restarted = service.complete_protocol("meditation", day(10)).unwrap();
    assert_eq!(restarted.streak_outcome, StreakOutcome::Reset);
    assert_eq!(restarted.mastery_before, MasteryLevel::Novice);
    assert_eq!(restarted.mastery.streak, 1);
}

#[test]
fn invalid_protocol_id_is_rejected_before_storage() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let err = service.complete_protocol("   ", day(1)).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidProtocolId(_)));
    assert!(service.history(None).unwrap().is_empty());
}

#[test]
fn progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifeos.db");

    {
        let mut conn = open_db(&path).unwrap();
        let mut service = service(&mut conn);
        service.complete_protocol("meditation", day(1)).unwrap();
        service.complete_protocol("meditation", day(2)).unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let mut service = service(&mut conn);
    let outcome = service.complete_protocol("meditation", day(3)).unwrap();
    assert_eq!(outcome.streak_outcome, StreakOutcome::Continued);
    assert_eq!(outcome.mastery.streak, 3);
    assert_eq!(outcome.total_xp, 120);
}

#[test]
fn mastery_level_is_derived_from_stored_streak() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProgressRepository::try_new(&mut conn).unwrap();
    let protocol_id = ProtocolId::parse("sauna").unwrap();

    let mut mastery = ProtocolMastery::new(protocol_id.clone());
    mastery.streak = 25;
    // Stored level is ignored; only the streak is persisted.
    mastery.level = MasteryLevel::Novice;
    repo.commit_completion(&CompletionCommit {
        date: day(25),
        mastery,
        total_xp: 250,
        catalyst: StreakCatalyst::default(),
    })
    .unwrap();

    let loaded = repo
        .load_mastery(&protocol_id, &Default::default())
        .unwrap();
    assert_eq!(loaded.level, MasteryLevel::Master);
    assert_eq!(repo.total_xp().unwrap(), 250);
}

#[test]
fn corrupted_total_xp_is_reported() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO profile_kv (key, value) VALUES ('total_xp', 'lots');",
        [],
    )
    .unwrap();

    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();
    let err = repo.total_xp().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("total_xp")));
}
