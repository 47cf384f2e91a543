//! Core domain types for the SLR taxonomies.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Result, SlrError};

// ---------------------------------------------------------------------------
// FaultId
// ---------------------------------------------------------------------------

/// Identifier of a fault-injection type, rendered as `T<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaultId(pub u64);

impl FaultId {
    /// The identifier following this one.
    pub fn next(self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| SlrError::parse(format!("no fault injection id after {self}")))
    }
}

impl std::fmt::Display for FaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Matches a leading `T<digits>` token.
static FAULT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T(\d+)").expect("fault id regex"));

impl FaultId {
    /// Parse the leading `T<digits>` token of a label.
    ///
    /// `Ok(None)` when the label has no such token; an error when the
    /// digits do not fit an id.
    pub fn leading(label: &str) -> Result<Option<Self>> {
        let Some(caps) = FAULT_ID_RE.captures(label) else {
            return Ok(None);
        };
        caps[1]
            .parse()
            .map(|n| Some(Self(n)))
            .map_err(|_| SlrError::parse(format!("fault injection id out of range in '{label}'")))
    }
}

// ---------------------------------------------------------------------------
// Category entries
// ---------------------------------------------------------------------------

/// An item of a persisted category list.
///
/// Lists are stored as JSON arrays of display labels; implementors convert
/// between that label and their in-memory form.
pub trait CategoryEntry: Clone {
    /// Build an entry from its stored label.
    fn from_label(label: String) -> Self;

    /// The label written back to the store.
    fn label(&self) -> &str;
}

impl CategoryEntry for String {
    fn from_label(label: String) -> Self {
        label
    }

    fn label(&self) -> &str {
        self
    }
}

/// A fault-injection type with its identifier parsed out of the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultInjection {
    /// `None` when the stored label carries no usable `T<n>` prefix.
    pub id: Option<FaultId>,
    label: String,
}

impl FaultInjection {
    /// A new entry rendered as `T<n> (<name>)`.
    pub fn new(id: FaultId, name: &str) -> Self {
        Self {
            id: Some(id),
            label: format!("{id} ({name})"),
        }
    }
}

impl CategoryEntry for FaultInjection {
    fn from_label(label: String) -> Self {
        Self {
            id: FaultId::leading(&label).ok().flatten(),
            label,
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ---------------------------------------------------------------------------
// CategoryList
// ---------------------------------------------------------------------------

/// Append-only list of category entries with a revision counter.
///
/// `version` starts at 0 when loaded and bumps on every accepted append, so
/// callers can tell whether a list needs persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryList<T> {
    entries: Vec<T>,
    version: u64,
}

impl<T> Default for CategoryList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            version: 0,
        }
    }
}

impl<T: CategoryEntry> CategoryList<T> {
    /// Build a list from stored labels, at version 0.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: labels
                .into_iter()
                .map(|l| T::from_label(l.into()))
                .collect(),
            version: 0,
        }
    }

    /// Append `entry` unless an entry with the same label exists.
    /// Returns whether it was appended.
    pub fn push_unique(&mut self, entry: T) -> bool {
        if self.contains(entry.label()) {
            return false;
        }
        self.entries.push(entry);
        self.version += 1;
        true
    }

    /// Whether an entry with exactly this label exists.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label() == label)
    }

    /// Labels in list order, as persisted.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label().to_string()).collect()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of appends since the list was loaded.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True once anything has been appended.
    pub fn is_modified(&self) -> bool {
        self.version > 0
    }
}

impl CategoryList<FaultInjection> {
    /// Highest identifier present, ignoring entries without a `T<n>` prefix.
    ///
    /// Fails when a prefix is present but out of range, so numbering never
    /// restarts below an existing entry.
    pub fn max_id(&self) -> Result<Option<FaultId>> {
        let mut max = None;
        for entry in &self.entries {
            max = max.max(FaultId::leading(entry.label())?);
        }
        Ok(max)
    }

    /// `max_id + 1`, or `T1` for a list with no identifiers.
    pub fn next_id(&self) -> Result<FaultId> {
        match self.max_id()? {
            Some(id) => id.next(),
            None => Ok(FaultId(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_id_display_and_parse() {
        assert_eq!(FaultId(7).to_string(), "T7");
        assert_eq!(FaultId::leading("T12 (Glitch)").expect("parse"), Some(FaultId(12)));
        assert_eq!(FaultId::leading("Glitch").expect("parse"), None);
        assert!(FaultId::leading("T99999999999999999999 (Huge)").is_err());
    }

    #[test]
    fn fault_injection_parses_prefix() {
        let fi = FaultInjection::from_label("T3 (Voltage glitching)".into());
        assert_eq!(fi.id, Some(FaultId(3)));
        assert_eq!(fi.label(), "T3 (Voltage glitching)");

        let malformed = FaultInjection::from_label("Laser".into());
        assert_eq!(malformed.id, None);
        assert_eq!(malformed.label(), "Laser");
    }

    #[test]
    fn new_fault_injection_label() {
        let fi = FaultInjection::new(FaultId(4), "Clock glitching");
        assert_eq!(fi.label(), "T4 (Clock glitching)");
    }

    #[test]
    fn next_id_skips_gaps_and_malformed() {
        let list: CategoryList<FaultInjection> =
            CategoryList::from_labels(["T1 (Foo)", "Untagged", "T3 (Bar)"]);
        assert_eq!(list.max_id().expect("max"), Some(FaultId(3)));
        assert_eq!(list.next_id().expect("next"), FaultId(4));

        let empty: CategoryList<FaultInjection> = CategoryList::default();
        assert_eq!(empty.next_id().expect("next"), FaultId(1));
    }

    #[test]
    fn next_id_goes_past_u32() {
        let list: CategoryList<FaultInjection> =
            CategoryList::from_labels(["T4294967296 (Huge)"]);
        assert_eq!(list.next_id().expect("next"), FaultId(4_294_967_297));
    }

    #[test]
    fn next_id_fails_instead_of_wrapping() {
        assert!(FaultId(u64::MAX).next().is_err());
        let list: CategoryList<FaultInjection> =
            CategoryList::from_labels([format!("T{} (Last)", u64::MAX)]);
        assert!(list.next_id().is_err());
    }

    #[test]
    fn push_unique_bumps_version_once() {
        let mut list: CategoryList<String> = CategoryList::from_labels(["Automotive"]);
        assert!(!list.is_modified());

        assert!(!list.push_unique("Automotive".into()));
        assert_eq!(list.version(), 0);

        assert!(list.push_unique("Railway".into()));
        assert_eq!(list.version(), 1);
        assert_eq!(list.labels(), vec!["Automotive", "Railway"]);
    }
}
