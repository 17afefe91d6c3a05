//! Bibliography: an ordered collection of entries

use std::collections::HashSet;

use serde::Serialize;

use crate::entry::Entry;
use crate::error::FormatError;

/// An ordered collection of [`Entry`] records.
///
/// Insertion order is preserved until the collection is explicitly sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bib {
    entries: Vec<Entry>,
}

impl Bib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn last_mut(&mut self) -> Option<&mut Entry> {
        self.entries.last_mut()
    }

    /// First entry with the given citation key
    pub fn find(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Sort in place by publication date.
    ///
    /// With `newest_first` the most recent entry comes first. Entries with the
    /// same date keep their relative order. Every date is derived before the
    /// collection is touched, so on error the order is unchanged.
    pub fn sort_by_date(&mut self, newest_first: bool) -> Result<(), FormatError> {
        let dates = self
            .entries
            .iter()
            .map(Entry::published)
            .collect::<Result<Vec<_>, _>>()?;

        let mut keyed: Vec<_> = dates.into_iter().zip(self.entries.drain(..)).collect();
        keyed.sort_by(|(a, _), (b, _)| {
            if newest_first {
                b.cmp(a)
            } else {
                a.cmp(b)
            }
        });
        self.entries = keyed.into_iter().map(|(_, entry)| entry).collect();
        Ok(())
    }

    /// Citation keys that occur more than once, in order of first repeat
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for entry in &self.entries {
            if !seen.insert(entry.key()) && !dups.contains(&entry.key()) {
                dups.push(entry.key());
            }
        }
        dups
    }
}

impl From<Vec<Entry>> for Bib {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl Extend<Entry> for Bib {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<Entry> for Bib {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Bib {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Bib {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
