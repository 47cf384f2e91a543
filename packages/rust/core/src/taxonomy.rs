//! Taxonomy updates from "Other" answers.
//!
//! The merge functions take category lists by value and hand them back with
//! any additions applied. Nothing here touches the filesystem; the caller
//! decides whether and when a changed list is persisted.

use slrkit_shared::{CategoryList, FaultId, FaultInjection, Result};
use tracing::{debug, info};

/// The two persisted category lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    pub domains: CategoryList<String>,
    pub fault_injections: CategoryList<FaultInjection>,
}

impl Taxonomy {
    /// True when either list gained an entry since it was loaded.
    pub fn is_modified(&self) -> bool {
        self.domains.is_modified() || self.fault_injections.is_modified()
    }
}

/// Outcome of [`merge_fault_injections`].
#[derive(Debug, Clone)]
pub struct FaultMerge {
    /// The list with new entries appended.
    pub list: CategoryList<FaultInjection>,
    /// Identifier assigned to each "Other" value, in input order.
    pub assigned: Vec<FaultId>,
}

/// Assign `T<n>` identifiers to new fault-injection types.
///
/// Numbering continues from the highest identifier in `list`. Each value is
/// stored as `T<n> (<value>)`; the counter only advances when an entry is
/// actually appended. Deduplication is by exact label, so two spellings of
/// the same technique get two identifiers. Fails if a stored identifier is
/// out of range or the next one would overflow.
pub fn merge_fault_injections(
    mut list: CategoryList<FaultInjection>,
    others: &[String],
) -> Result<FaultMerge> {
    if list.entries().iter().any(|e| e.id.is_none()) {
        debug!(
            untagged = list.entries().iter().filter(|e| e.id.is_none()).count(),
            "ignoring entries without a T<n> prefix for numbering"
        );
    }

    if others.is_empty() {
        return Ok(FaultMerge {
            list,
            assigned: Vec::new(),
        });
    }

    let mut next = list.next_id()?;
    let mut consumed = false;
    let mut assigned = Vec::with_capacity(others.len());

    for name in others {
        if consumed {
            next = next.next()?;
            consumed = false;
        }
        assigned.push(next);
        if list.push_unique(FaultInjection::new(next, name)) {
            info!(id = %next, name = %name, "new fault injection type");
            consumed = true;
        }
    }

    Ok(FaultMerge { list, assigned })
}

/// Add a free-text domain unless it is already listed.
pub fn merge_domain(mut list: CategoryList<String>, other: &str) -> CategoryList<String> {
    let other = other.trim();
    if other.is_empty() {
        return list;
    }
    if list.push_unique(other.to_string()) {
        info!(domain = other, "new domain");
    } else {
        debug!(domain = other, "domain already listed");
    }
    list
}
