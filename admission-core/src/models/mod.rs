mod errors;
mod fields;
mod form_data;
mod record;
mod step;

pub use errors::FormErrors;
pub use fields::{FieldName, FormData, ParseFieldNameError};
pub use record::ApplicationRecord;
pub use step::Step;
