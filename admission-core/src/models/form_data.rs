use std::{collections::BTreeMap, fmt};

use super::{FieldName, FormData};

impl FormData {
    /// Returns a copy of this record with `field` replaced by `value`.
    ///
    /// The receiver is left untouched.
    pub fn with_field(
        &self,
        field: FieldName,
        value: impl Into<String>,
    ) -> FormData {
        let mut next = self.clone();
        *next.slot_mut(field) = value.into();
        next
    }

    /// Iterates every field in screen order together with its value.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL.iter().map(move |field| (*field, self.get(*field)))
    }

    /// `true` when every field is blank.
    pub fn is_blank(&self) -> bool {
        self.iter().all(|(_, value)| value.trim().is_empty())
    }

    /// Projects the record into the backend's flat field-by-field schema,
    /// keyed by [`FieldName::as_str`].
    pub fn to_record(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(field, value)| (field.as_str(), value.to_string()))
            .collect()
    }

    /// Rebuilds a record from a flat key/value projection.
    ///
    /// Keys may be snake_case or camelCase; unknown keys are ignored and
    /// missing keys stay empty.
    pub fn from_record<I, K, V>(entries: I) -> FormData
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut data = FormData::default();
        for (key, value) in entries {
            if let Some(field) = FieldName::parse(key.as_ref()) {
                *data.slot_mut(field) = value.into();
            }
        }
        data
    }
}

impl fmt::Display for FormData {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (field, value) in self.iter() {
            let shown = if value.is_empty() { "-" } else { value };
            writeln!(f, "{:<30} {}", format!("{}:", field.label()), shown)?;
        }
        Ok(())
    }
}
