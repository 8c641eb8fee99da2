//! Field and step validators.
//!
//! [`validate_step`] is the plain required-field check the form has always
//! used. [`Validator`] layers the optional format checks selected by
//! [`ValidationPolicy`] on top of it.

mod field;
mod step;

pub use field::{
    validate_age, validate_amount, validate_email, validate_format, validate_phone,
    validate_required,
};
pub use step::{Validator, required_fields, validate_step};

use crate::config::ValidationPolicy;
