//! Needs register: the list of assessed needs for a case.
//!
//! Needs are validated once on admission and are immutable afterwards; the
//! only other operation is removal. Insertion order is kept.

mod care_act;
mod suggestions;

pub use care_act::*;
pub use suggestions::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{NeedCategory, NeedDomain, NeedItem, Severity};

/// Reasons a need is refused.
#[derive(Error, Debug, PartialEq)]
pub enum NeedError {
    #[error("Please enter a need description and intervention.")]
    MissingText,

    #[error("To qualify for s.117 funding, a need MUST meet both statutory tests: Arising from disorder AND Reducing risk of deterioration. Please confirm these tests.")]
    StatutoryTestsUnmet,
}

/// A need as entered on the form, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNeed {
    pub description: String,
    pub category: NeedCategory,
    pub domain: NeedDomain,
    pub intervention: String,
    pub provider: String,
    pub severity: Severity,
    pub statutory_test_arises: bool,
    pub statutory_test_reduces_risk: bool,
}

impl Default for NewNeed {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: NeedCategory::S117,
            domain: NeedDomain::MentalHealth,
            intervention: String::new(),
            provider: String::new(),
            severity: Severity::Medium,
            statutory_test_arises: false,
            statutory_test_reduces_risk: false,
        }
    }
}

impl NewNeed {
    pub fn new(category: NeedCategory) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }

    /// Fill description, intervention and provider from a suggestion.
    pub fn apply_suggestion(&mut self, suggestion: &SuggestedNeed) {
        self.description = suggestion.label.to_string();
        self.intervention = suggestion.intervention.to_string();
        self.provider = self.category.default_provider().to_string();
    }

    fn validate(&self) -> Result<(), NeedError> {
        if self.description.is_empty() || self.intervention.is_empty() {
            return Err(NeedError::MissingText);
        }
        if self.category == NeedCategory::S117
            && !(self.statutory_test_arises && self.statutory_test_reduces_risk)
        {
            return Err(NeedError::StatutoryTestsUnmet);
        }
        Ok(())
    }
}

/// Ordered collection of admitted needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeedsRegister {
    items: Vec<NeedItem>,
}

impl NeedsRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list, e.g. after loading saved work. No validation
    /// is re-applied.
    pub fn from_items(items: Vec<NeedItem>) -> Self {
        Self { items }
    }

    /// Validate and admit a need. On error the register is unchanged.
    pub fn add(&mut self, need: NewNeed) -> Result<&NeedItem, NeedError> {
        if let Err(err) = need.validate() {
            warn!(category = need.category.label(), %err, "need rejected");
            return Err(err);
        }
        let item = NeedItem {
            id: uuid::Uuid::new_v4().to_string(),
            description: need.description,
            category: need.category,
            domain: need.domain,
            intervention: need.intervention,
            provider: need.provider,
            severity: need.severity,
            statutory_test_arises: Some(need.statutory_test_arises),
            statutory_test_reduces_risk: Some(need.statutory_test_reduces_risk),
        };
        debug!(id = %item.id, category = item.category.label(), "need added");
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        let removed = self.items.len() != before;
        debug!(id, removed, "need removal");
        removed
    }

    pub fn items(&self) -> &[NeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn count_in(&self, category: NeedCategory) -> usize {
        self.items.iter().filter(|n| n.category == category).count()
    }

    /// Needs grouped by domain, in domain declaration order, skipping empty
    /// domains. Within a domain, insertion order is kept.
    pub fn by_domain(&self) -> Vec<(NeedDomain, Vec<&NeedItem>)> {
        NeedDomain::ALL
            .iter()
            .filter_map(|domain| {
                let group: Vec<&NeedItem> =
                    self.items.iter().filter(|n| n.domain == *domain).collect();
                (!group.is_empty()).then_some((*domain, group))
            })
            .collect()
    }
}
