//! CSV import and export of application records.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter.
//!
//! | Column        | Required | Notes |
//! |---------------|----------|-------|
//! | `user_id`     | yes      | key the application is stored under |
//! | any form key  | no       | snake_case or camelCase field name, e.g. `full_name`, `bloodGroup` |
//!
//! Unknown columns are ignored; form fields without a column stay empty.
//! Exports always write `user_id`, `submitted_by`, `submitted_at` followed by
//! every form field in screen order.
//!
//! ### Minimal example
//!
//! ```csv
//! user_id,full_name,blood_group,interests
//! uid-1,Aarav Shah,O+,Chess
//! ```

use std::io::{Read, Write};

use admission_core::{
    ApplicationRecord, ApplicationRepository, FieldName, FormData, FormErrors, RepositoryError,
    Validator,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Attribution written on rows that arrive through the importer.
pub const IMPORT_ATTRIBUTION: &str = "import";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("line {line}: user_id is blank")]
    MissingUserId { line: u64 },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based line number in the source file (the header is line 1).
    pub line: u64,
    pub user_id: String,
    pub data: FormData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: u64,
    pub user_id: String,
    pub errors: FormErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

pub struct ApplicationCsv;

impl ApplicationCsv {
    /// Parses application rows from CSV.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ImportRow>, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let user_id_col = headers
            .iter()
            .position(|h| h == "user_id" || h == "userId")
            .ok_or(DataError::MissingColumn("user_id"))?;

        let columns: Vec<Option<FieldName>> = headers.iter().map(FieldName::parse).collect();
        for (header, field) in headers.iter().zip(&columns) {
            if field.is_none() && !matches!(header, "user_id" | "userId") {
                debug!(column = header, "ignoring unknown column");
            }
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());

            let user_id = record.get(user_id_col).unwrap_or_default().trim().to_string();
            if user_id.is_empty() {
                return Err(DataError::MissingUserId { line });
            }

            let data = FormData::from_record(
                columns
                    .iter()
                    .zip(record.iter())
                    .filter_map(|(field, value)| field.map(|f| (f.as_str(), value))),
            );
            rows.push(ImportRow {
                line,
                user_id,
                data,
            });
        }

        Ok(rows)
    }

    /// Validates every step of each row and writes the clean ones.
    ///
    /// Invalid rows are reported and skipped. A repository error aborts the
    /// load; rows written before it stay written.
    pub async fn load(
        repo: &dyn ApplicationRepository,
        rows: &[ImportRow],
        validator: &Validator,
    ) -> Result<ImportReport, DataError> {
        let mut report = ImportReport::default();

        for row in rows {
            let errors = validator.validate_all(&row.data);
            if !errors.is_empty() {
                warn!(line = row.line, user_id = %row.user_id, %errors, "rejecting row");
                report.rejected.push(RejectedRow {
                    line: row.line,
                    user_id: row.user_id.clone(),
                    errors,
                });
                continue;
            }

            let record =
                ApplicationRecord::new(row.user_id.clone(), IMPORT_ATTRIBUTION, row.data.clone());
            repo.submit(&record).await?;
            report.imported += 1;
        }

        info!(
            imported = report.imported,
            rejected = report.rejected.len(),
            "import finished"
        );
        Ok(report)
    }

    /// Writes `records` as CSV and returns the number of data rows written.
    pub fn export<W: Write>(
        records: &[ApplicationRecord],
        writer: W,
    ) -> Result<usize, DataError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["user_id", "submitted_by", "submitted_at"];
        header.extend(FieldName::ALL.iter().map(FieldName::as_str));
        wtr.write_record(&header)?;

        for record in records {
            let submitted_at = record.submitted_at.to_rfc3339();
            let mut row = vec![
                record.user_id.as_str(),
                record.submitted_by.as_str(),
                submitted_at.as_str(),
            ];
            row.extend(record.data.iter().map(|(_, value)| value));
            wtr.write_record(&row)?;
        }

        wtr.flush().map_err(|e| DataError::Csv(e.to_string()))?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use admission_core::db::InMemoryApplicationRepository;
    use admission_core::{FormErrors, ValidationPolicy};
    use pretty_assertions::assert_eq;

    use super::*;

    const VALID_ROW: &str = "user_id,full_name,blood_group,interests,father_name,father_age,mother_name,mother_age,relationship_status,present_address,permanent_address,language_spoken,school_budget\n\
        uid-1,Aarav Shah,O+,Chess,Raj,44,Meera,41,Married,1 Lake Rd,1 Lake Rd,Gujarati,90000\n";

    #[test]
    fn parse_maps_headers_to_fields() {
        let rows = ApplicationCsv::parse(VALID_ROW.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].user_id, "uid-1");
        assert_eq!(rows[0].data.get(FieldName::LanguageSpoken), "Gujarati");
        assert_eq!(rows[0].data.get(FieldName::Caste), "");
    }

    #[test]
    fn parse_accepts_camel_case_and_ignores_unknown_columns() {
        let csv = "userId,fullName,shoe_size\nuid-9,Zoya,7\n";
        let rows = ApplicationCsv::parse(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].user_id, "uid-9");
        assert_eq!(rows[0].data.get(FieldName::FullName), "Zoya");
    }

    #[test]
    fn parse_requires_user_id_column() {
        let err = ApplicationCsv::parse("full_name\nA\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn("user_id")));
    }

    #[test]
    fn parse_rejects_blank_user_id() {
        let err = ApplicationCsv::parse("user_id,full_name\n  ,A\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingUserId { line: 2 }));
    }

    #[tokio::test]
    async fn load_skips_rows_failing_any_step() {
        let csv = format!("{VALID_ROW}uid-2,Bela,,Art,,,,,,,,,\n");
        let rows = ApplicationCsv::parse(csv.as_bytes()).unwrap();
        let repo = InMemoryApplicationRepository::new();

        let report = ApplicationCsv::load(&repo, &rows, &Validator::default())
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.rejected.len(), 1);
        let rejected = &report.rejected[0];
        assert_eq!(rejected.user_id, "uid-2");
        assert_eq!(rejected.line, 3);
        assert!(rejected.errors.contains(FieldName::BloodGroup));
        assert!(rejected.errors.contains(FieldName::SchoolBudget));
        assert!(!rejected.errors.contains(FieldName::FullName));

        let stored = repo.get_application("uid-1").await.unwrap();
        assert_eq!(stored.submitted_by, IMPORT_ATTRIBUTION);
    }

    #[tokio::test]
    async fn strict_load_checks_formats() {
        let csv = VALID_ROW.replace(",44,", ",forty-four,");
        let rows = ApplicationCsv::parse(csv.as_bytes()).unwrap();
        let repo = InMemoryApplicationRepository::new();

        let report = ApplicationCsv::load(&repo, &rows, &Validator::new(ValidationPolicy::Strict))
            .await
            .unwrap();

        assert_eq!(report.imported, 0);
        assert_eq!(
            report.rejected[0].errors.fields(),
            vec![FieldName::FatherAge]
        );
        assert_ne!(report.rejected[0].errors, FormErrors::new());
    }

    #[tokio::test]
    async fn repository_failure_aborts_load() {
        let rows = ApplicationCsv::parse(VALID_ROW.as_bytes()).unwrap();
        let repo = InMemoryApplicationRepository::new();
        repo.fail_with(Some(RepositoryError::Database("locked".into())))
            .await;

        let err = ApplicationCsv::load(&repo, &rows, &Validator::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Repository(RepositoryError::Database(_))));
    }

    #[test]
    fn export_writes_header_and_rows() {
        let record = ApplicationRecord::new(
            "uid-1",
            "uid-1",
            FormData::default()
                .with_field(FieldName::FullName, "Aarav, Jr.")
                .with_field(FieldName::SchoolBudget, "90000"),
        );
        let mut out = Vec::new();

        let written = ApplicationCsv::export(std::slice::from_ref(&record), &mut out).unwrap();
        assert_eq!(written, 1);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("user_id,submitted_by,submitted_at,full_name,"));
        assert_eq!(header.split(',').count(), FieldName::ALL.len() + 3);

        // The exported file is importable again.
        let rows = ApplicationCsv::parse(text.as_bytes()).unwrap();
        assert_eq!(rows[0].data, record.data);
    }
}
