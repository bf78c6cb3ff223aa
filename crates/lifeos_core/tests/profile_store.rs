use lifeos_core::db::open_db_in_memory;
use lifeos_core::{ProfileRepository, RepoError, SqliteProfileRepository};

#[test]
fn set_get_and_remove_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    assert_eq!(repo.get_value("display_name").unwrap(), None);
    repo.set_value("display_name", "Ada").unwrap();
    repo.set_value(" display_name ", "Ada L.").unwrap();
    assert_eq!(
        repo.get_value("display_name").unwrap().as_deref(),
        Some("Ada L.")
    );

    assert!(repo.remove_value("display_name").unwrap());
    assert!(!repo.remove_value("display_name").unwrap());
    assert_eq!(repo.get_value("display_name").unwrap(), None);
}

#[test]
fn list_values_is_sorted_by_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.set_value("timezone", "Europe/Oslo").unwrap();
    repo.set_value("coach_tone", "gentle").unwrap();

    let keys: Vec<String> = repo
        .list_values()
        .unwrap()
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(keys, vec!["coach_tone", "timezone"]);
}

#[test]
fn reserved_and_empty_keys_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    let err = repo.set_value("total_xp", "999999").unwrap_err();
    assert!(matches!(err, RepoError::ReservedKey(key) if key == "total_xp"));

    let err = repo.remove_value("streak_catalyst").unwrap_err();
    assert!(matches!(err, RepoError::ReservedKey(_)));

    let err = repo.get_value("   ").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
