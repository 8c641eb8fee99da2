use std::{collections::BTreeMap, fmt};

use super::FieldName;

/// Validation messages for one validation pass, keyed by field.
///
/// An empty map means the validated step is clean. A new map is built on
/// every pass; maps from different steps are never merged by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<FieldName, String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: FieldName,
        message: impl Into<String>,
    ) {
        self.errors.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(
        &self,
        field: FieldName,
    ) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(
        &self,
        field: FieldName,
    ) -> bool {
        self.errors.contains_key(&field)
    }

    /// Fields with an error, in screen order.
    pub fn fields(&self) -> Vec<FieldName> {
        self.errors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Folds another pass into this one. Used only by whole-form validation.
    pub fn extend(
        &mut self,
        other: FormErrors,
    ) {
        self.errors.extend(other.errors);
    }
}

impl FromIterator<(FieldName, String)> for FormErrors {
    fn from_iter<T: IntoIterator<Item = (FieldName, String)>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let messages: Vec<&str> = self.errors.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_iff_no_entries() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);

        errors.insert(FieldName::FullName, "Full Name is required");
        assert!(!errors.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn fields_follow_screen_order() {
        let errors: FormErrors = [
            (FieldName::Interests, "c".to_string()),
            (FieldName::FullName, "a".to_string()),
            (FieldName::BloodGroup, "b".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            errors.fields(),
            vec![FieldName::FullName, FieldName::BloodGroup, FieldName::Interests]
        );
        assert_eq!(errors.to_string(), "a; b; c");
    }

    #[test]
    fn insert_replaces_existing_message() {
        let mut errors = FormErrors::new();
        errors.insert(FieldName::FatherAge, "first");
        errors.insert(FieldName::FatherAge, "second");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldName::FatherAge), Some("second"));
    }
}
