pub mod applications;

pub use applications::{ApplicationCsv, DataError, ImportReport, ImportRow, RejectedRow};
