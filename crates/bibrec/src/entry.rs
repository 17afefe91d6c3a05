//! Bibliography entry data structures

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::FormatError;

/// Name under which the citation key is exposed through [`Entry::get`]
pub const KEY_FIELD: &str = "key";

/// Month assumed when an entry carries a year but no month
pub const DEFAULT_MONTH: &str = "Jan";

/// A single named field of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryField {
    pub name: String,
    pub value: String,
}

/// One bibliographic record: a citation key plus named string fields.
///
/// Field names are case-sensitive and keep the order in which they were
/// first set. Looking up a field that is not present yields `None`; reads
/// never insert anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    fields: Vec<EntryField>,
}

impl Entry {
    /// Create an entry with the given citation key and no fields
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// The citation key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up a field by name. `"key"` resolves to the citation key.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name == KEY_FIELD {
            return Some(&self.key);
        }
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Whether a field is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, replacing an existing value in place.
    ///
    /// Setting `"key"` replaces the citation key.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if name == KEY_FIELD {
            self.key = value;
            return;
        }
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(EntryField { name, value }),
        }
    }

    /// Fields other than the citation key, in insertion order
    pub fn fields(&self) -> &[EntryField] {
        &self.fields
    }

    pub fn year(&self) -> Option<&str> {
        self.get("year")
    }

    pub fn month(&self) -> Option<&str> {
        self.get("month")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    pub fn howpublished(&self) -> Option<&str> {
        self.get("howpublished")
    }

    /// Publication date derived from `month` and `year`.
    ///
    /// The month may be an abbreviation ("Mar") or a full name ("March");
    /// it defaults to January when absent or empty. The date is recomputed
    /// on every call and points at the first day of the month.
    pub fn published(&self) -> Result<NaiveDate, FormatError> {
        let year = self.year().ok_or_else(|| FormatError::MissingYear {
            key: self.key.clone(),
        })?;
        let month = match self.month() {
            Some(m) if !m.trim().is_empty() => m,
            _ => DEFAULT_MONTH,
        };
        parse_month_year(month, year).ok_or_else(|| FormatError::UnrecognizedDate {
            key: self.key.clone(),
            month: month.to_string(),
            year: year.to_string(),
        })
    }
}

/// Parse "<month> <year>" with the month abbreviated or spelled out
pub fn parse_month_year(month: &str, year: &str) -> Option<NaiveDate> {
    let s = format!("1 {} {}", month.trim(), year.trim());
    NaiveDate::parse_from_str(&s, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(&s, "%d %B %Y"))
        .ok()
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(KEY_FIELD, &self.key)?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fields: &[(&str, &str)]) -> Entry {
        let mut e = Entry::new("test2024");
        for (name, value) in fields {
            e.set(*name, *value);
        }
        e
    }

    #[test]
    fn test_absent_fields_are_none() {
        let e = entry(&[("year", "2024")]);
        assert_eq!(e.get("month"), None);
        assert_eq!(e.howpublished(), None);
        assert_eq!(e.fields().len(), 1);
    }

    #[test]
    fn test_key_lookup() {
        let mut e = entry(&[]);
        assert_eq!(e.get("key"), Some("test2024"));
        e.set("key", "other");
        assert_eq!(e.key(), "other");
        assert!(e.fields().is_empty());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut e = entry(&[("author", "A"), ("title", "T"), ("year", "2020")]);
        e.set("title", "New");
        let names: Vec<_> = e.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["author", "title", "year"]);
        assert_eq!(e.title(), Some("New"));
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let e = entry(&[("Year", "2020")]);
        assert_eq!(e.get("year"), None);
        assert_eq!(e.get("Year"), Some("2020"));
    }

    #[test]
    fn test_published_month_forms_agree() {
        let full = entry(&[("month", "March"), ("year", "2022")]);
        let short = entry(&[("month", "Mar"), ("year", "2022")]);
        assert_eq!(full.published().unwrap(), short.published().unwrap());
        assert_eq!(
            full.published().unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_published_defaults_to_january() {
        let e = entry(&[("year", "2019")]);
        assert_eq!(
            e.published().unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
        );
        let empty_month = entry(&[("month", ""), ("year", "2019")]);
        assert_eq!(empty_month.published(), e.published());
    }

    #[test]
    fn test_published_missing_year() {
        let e = entry(&[("month", "May")]);
        assert_eq!(
            e.published(),
            Err(FormatError::MissingYear {
                key: "test2024".into()
            })
        );
    }

    #[test]
    fn test_published_unrecognized_month() {
        let e = entry(&[("month", "Smarch"), ("year", "2022")]);
        assert!(matches!(
            e.published(),
            Err(FormatError::UnrecognizedDate { .. })
        ));
    }

    #[test]
    fn test_serialize_key_first() {
        let e = entry(&[("author", "Doe, Jane"), ("year", "2020")]);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(
            json,
            r#"{"key":"test2024","author":"Doe, Jane","year":"2020"}"#
        );
    }
}
