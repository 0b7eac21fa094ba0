//! Database tests

use super::*;
use crate::models::*;
use crate::scoring::Page;

fn entry(income: f64, expenses: f64) -> NewFinancialEntry {
    NewFinancialEntry {
        income,
        expenses,
        expense_breakdown: None,
        notes: None,
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.leaderboard(Page::default()).unwrap().is_empty());
    assert!(db.list_financial_entries("nobody").unwrap().is_empty());
    assert!(db.get_profile("nobody").unwrap().is_none());
}

#[test]
fn test_in_memory_db_cleans_up_on_drop() {
    let db = Database::in_memory().unwrap();
    let path = std::path::PathBuf::from(db.path());
    assert!(path.exists());

    let clone = db.clone();
    drop(db);
    assert!(path.exists());

    drop(clone);
    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

#[test]
fn test_schema_tables_exist() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    for table in [
        "financial_data",
        "leaderboard_entries",
        "profiles",
        "bank_links",
        "audit_log",
    ] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "missing table {}", table);
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::in_memory().unwrap();
    db.insert_leaderboard_entry("ana", 120, None).unwrap();

    let reopened = Database::new_unencrypted(db.path()).unwrap();
    assert_eq!(reopened.leaderboard(Page::default()).unwrap().len(), 1);
}

#[test]
fn test_financial_entries_roundtrip_breakdown() {
    let db = Database::in_memory().unwrap();

    let mut first = entry(4000.0, 3000.0);
    first.expense_breakdown = Some(ExpenseBreakdown {
        housing: Some(1500.0),
        food: Some(600.0),
        ..Default::default()
    });
    first.notes = Some("January".to_string());
    db.insert_financial_entry("ana", &first).unwrap();
    db.insert_financial_entry("ana", &entry(4200.0, 2800.0)).unwrap();
    db.insert_financial_entry("ben", &entry(1000.0, 900.0)).unwrap();

    let all = db.list_financial_entries("ana").unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].notes.as_deref(), Some("January"));
    assert_eq!(
        all[0].expense_breakdown.as_ref().and_then(|b| b.housing),
        Some(1500.0)
    );
    assert_eq!(all[1].expense_breakdown, None);

    let recent = db.recent_financial_entries("ana", 1).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].income, 4200.0);
}

#[test]
fn test_insert_rejects_non_finite_entry() {
    let db = Database::in_memory().unwrap();
    let result = db.insert_financial_entry("ana", &entry(f64::INFINITY, 10.0));
    assert!(matches!(result, Err(Error::InvalidData(_))));
    assert!(db.list_financial_entries("ana").unwrap().is_empty());
}

#[test]
fn test_leaderboard_ordering_and_ranks() {
    let db = Database::in_memory().unwrap();
    db.insert_leaderboard_entry("ana", 250, Some(25.0)).unwrap();
    db.insert_leaderboard_entry("ben", 400, Some(40.0)).unwrap();
    db.insert_leaderboard_entry("cy", 250, None).unwrap();
    db.insert_leaderboard_entry("dee", 100, Some(10.0)).unwrap();

    let top = db.leaderboard(Page::default()).unwrap();
    let names: Vec<&str> = top.iter().map(|r| r.entry.username.as_str()).collect();
    assert_eq!(names, vec!["ben", "ana", "cy", "dee"]);
    assert_eq!(top[2].rank, 3);
    assert_eq!(top[2].entry.savings, None);

    let second = db.leaderboard(Page { page: 2, limit: 2 }).unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].rank, 3);
    assert_eq!(second[0].entry.username, "cy");

    let far = db.leaderboard(Page::new(Some(i64::MAX), None)).unwrap();
    assert!(far.is_empty());
}

#[test]
fn test_latest_leaderboard_entry() {
    let db = Database::in_memory().unwrap();
    assert!(db.latest_leaderboard_entry("ana").unwrap().is_none());

    db.insert_leaderboard_entry("ana", 100, Some(10.0)).unwrap();
    db.insert_leaderboard_entry("ana", 90, Some(9.0)).unwrap();

    let latest = db.latest_leaderboard_entry("ana").unwrap().unwrap();
    assert_eq!(latest.score, 90);
}

#[test]
fn test_profile_upsert() {
    let db = Database::in_memory().unwrap();

    let profile = Profile {
        goal: "Save for a house".to_string(),
        monthly_budget: Some(2500.0),
        ..Default::default()
    };
    db.upsert_profile("ana", &profile).unwrap();
    assert_eq!(db.get_profile("ana").unwrap(), Some(profile.clone()));

    let updated = profile.merge(ProfileUpdate {
        full_name: Some("Ana Ruiz".to_string()),
        ..Default::default()
    });
    db.upsert_profile("ana", &updated).unwrap();

    let stored = db.get_profile("ana").unwrap().unwrap();
    assert_eq!(stored.full_name, "Ana Ruiz");
    assert_eq!(stored.goal, "Save for a house");
}

#[test]
fn test_bank_link_lifecycle() {
    let db = Database::in_memory().unwrap();

    db.set_bank_link("ana", "access-sandbox-1", Some("item-1"))
        .unwrap();
    db.set_bank_link("ana", "access-sandbox-2", None).unwrap();

    let link = db.get_bank_link("ana").unwrap().unwrap();
    assert_eq!(link.access_token, "access-sandbox-2");
    assert_eq!(link.item_id, None);

    assert!(db.delete_bank_link("ana").unwrap());
    assert!(!db.delete_bank_link("ana").unwrap());
    assert!(db.get_bank_link("ana").unwrap().is_none());
}

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();
    db.log_audit("ana", "submit_score", Some("leaderboard_entry"), Some(1), None)
        .unwrap();
    db.log_audit("ana", "update_profile", Some("profile"), None, Some("goal"))
        .unwrap();

    let entries = db.list_audit_log("ana", 10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "update_profile");
    assert_eq!(entries[0].details.as_deref(), Some("goal"));

    assert_eq!(db.list_audit_log("ana", 1).unwrap().len(), 1);
}

#[test]
fn test_audit_log_is_per_user() {
    let db = Database::in_memory().unwrap();
    db.log_audit("ana", "create", Some("financial_data"), Some(1), None)
        .unwrap();
    db.log_audit("ben", "create", Some("financial_data"), Some(2), None)
        .unwrap();

    let ben = db.list_audit_log("ben", 10).unwrap();
    assert_eq!(ben.len(), 1);
    assert_eq!(ben[0].username, "ben");
    assert_eq!(ben[0].entity_id, Some(2));
    assert!(db.list_audit_log("cy", 10).unwrap().is_empty());
}

#[test]
fn test_reset_scopes() {
    let db = Database::in_memory().unwrap();
    db.insert_financial_entry("ana", &entry(100.0, 50.0)).unwrap();
    db.insert_leaderboard_entry("ana", 500, Some(50.0)).unwrap();
    db.upsert_profile("ana", &Profile::default()).unwrap();

    db.reset(ResetScope::Leaderboard).unwrap();
    assert!(db.leaderboard(Page::default()).unwrap().is_empty());
    assert_eq!(db.list_financial_entries("ana").unwrap().len(), 1);

    db.reset(ResetScope::FinancialData).unwrap();
    assert!(db.list_financial_entries("ana").unwrap().is_empty());
    assert!(db.get_profile("ana").unwrap().is_some());

    db.reset(ResetScope::All).unwrap();
    assert!(db.get_profile("ana").unwrap().is_none());
}

#[test]
fn test_reset_scope_parsing() {
    assert_eq!(
        "financial-data".parse::<ResetScope>(),
        Ok(ResetScope::FinancialData)
    );
    assert_eq!(ResetScope::All.as_str(), "all");
    assert!("everything".parse::<ResetScope>().is_err());
}

#[test]
fn test_new_requires_key() {
    // Only meaningful when the key is not set in the test environment
    if std::env::var(DB_KEY_ENV).is_err() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savvy.db");
        let result = Database::new(path.to_str().unwrap());
        assert!(matches!(result, Err(Error::Encryption(_))));
    }
}
