//! Integration tests for application import/export against the SQLite backend.

use admission_core::{ApplicationRepository, FieldName, ValidationPolicy, Validator};
use admission_data::ApplicationCsv;
use admission_db_sqlite::SqliteApplicationRepository;
use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;

const FIXTURE: &str = include_str!("fixtures/applications.csv");

async fn setup_test_db() -> SqliteApplicationRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteApplicationRepository::new_with_pool(pool);
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

#[test]
fn test_parse_fixture() {
    let rows = ApplicationCsv::parse(FIXTURE.as_bytes()).expect("Failed to parse CSV");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].data.get(FieldName::PresentAddress), "12 MG Road, Pune");
    assert_eq!(rows[0].data.get(FieldName::SchoolBudget), "1,50,000");
}

#[tokio::test]
async fn test_lenient_import_rejects_only_blank_required_fields() {
    let repo = setup_test_db().await;
    let rows = ApplicationCsv::parse(FIXTURE.as_bytes()).unwrap();

    let report = ApplicationCsv::load(&repo, &rows, &Validator::default())
        .await
        .expect("Failed to load applications");

    assert_eq!(report.imported, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].user_id, "uid-102");
    assert_eq!(
        report.rejected[0].errors.fields(),
        vec![FieldName::BloodGroup, FieldName::PermanentAddress]
    );

    let stored = repo.get_application("uid-101").await.unwrap();
    assert_eq!(stored.data.get(FieldName::FatherEmail), "suresh.nair@example");
}

#[tokio::test]
async fn test_strict_import_also_rejects_malformed_email() {
    let repo = setup_test_db().await;
    let rows = ApplicationCsv::parse(FIXTURE.as_bytes()).unwrap();

    let report = ApplicationCsv::load(&repo, &rows, &Validator::new(ValidationPolicy::Strict))
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    let rejected: Vec<&str> = report.rejected.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(rejected, vec!["uid-101", "uid-102"]);
    assert!(report.rejected[0].errors.contains(FieldName::FatherEmail));
}

#[tokio::test]
async fn test_export_after_import_round_trips_data() {
    let repo = setup_test_db().await;
    let rows = ApplicationCsv::parse(FIXTURE.as_bytes()).unwrap();
    ApplicationCsv::load(&repo, &rows, &Validator::default())
        .await
        .unwrap();

    let records = repo.list_applications().await.unwrap();
    let mut out = Vec::new();
    let written = ApplicationCsv::export(&records, &mut out).unwrap();
    assert_eq!(written, 2);

    let reparsed = ApplicationCsv::parse(out.as_slice()).unwrap();
    let mut users: Vec<&str> = reparsed.iter().map(|r| r.user_id.as_str()).collect();
    users.sort_unstable();
    assert_eq!(users, vec!["uid-100", "uid-101"]);

    let aarav = reparsed.iter().find(|r| r.user_id == "uid-100").unwrap();
    assert_eq!(aarav.data, rows[0].data);
}
