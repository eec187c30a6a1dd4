use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::pattern::BugPattern;
use super::persistence::{PatternEntry, PatternSections};
use super::predefined::predefined_patterns;
use super::signature::CompiledPattern;
use crate::debug;

/// A pattern together with its compiled signatures.
#[derive(Debug, Clone)]
pub struct StoredPattern {
    pub pattern: BugPattern,
    pub compiled: CompiledPattern,
    /// Unset for built-in patterns
    pub learned_at: Option<DateTime<Utc>>,
}

impl StoredPattern {
    fn new(pattern: BugPattern, learned_at: Option<DateTime<Utc>>) -> Self {
        let compiled = CompiledPattern::compile(&pattern);
        Self { pattern, compiled, learned_at }
    }

    fn to_entry(&self) -> (String, PatternEntry) {
        let entry = PatternEntry { pattern: self.pattern.clone(), learned_at: self.learned_at };
        (self.pattern.id.clone(), entry)
    }
}

/// Built-in, common and project-specific patterns, each keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    predefined: BTreeMap<String, StoredPattern>,
    common: BTreeMap<String, StoredPattern>,
    project_specific: BTreeMap<String, StoredPattern>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predefined() -> Self {
        let mut catalog = Self::new();
        catalog.load_predefined_patterns();
        catalog
    }

    /// Load the built-in set. Calling this again leaves the catalog unchanged.
    pub fn load_predefined_patterns(&mut self) -> Vec<&BugPattern> {
        if self.predefined.is_empty() {
            for pattern in predefined_patterns() {
                self.predefined.insert(pattern.id.clone(), StoredPattern::new(pattern, None));
            }
            debug!("Loaded {} predefined patterns", self.predefined.len());
        }
        self.predefined.values().map(|stored| &stored.pattern).collect()
    }

    /// Upsert `pattern` into the namespace chosen by `project_specific`.
    ///
    /// The pattern is stored as given apart from its `project_specific` flag.
    /// Returns `true` when an existing pattern with the same id was replaced.
    pub fn learn_pattern(&mut self, pattern: BugPattern, project_specific: bool) -> bool {
        self.store(pattern, project_specific, Utc::now())
    }

    fn store(
        &mut self,
        mut pattern: BugPattern,
        project_specific: bool,
        learned_at: DateTime<Utc>,
    ) -> bool {
        pattern.project_specific = project_specific;

        let namespace =
            if project_specific { &mut self.project_specific } else { &mut self.common };
        let id = pattern.id.clone();
        let stored = StoredPattern::new(pattern, Some(learned_at));
        let replaced = namespace.insert(id.clone(), stored).is_some();

        debug!(
            "{} pattern {} ({})",
            if replaced { "Updated" } else { "Learned" },
            id,
            if project_specific { "project-specific" } else { "common" }
        );
        replaced
    }

    /// Merge both sections of an imported document. Returns `(common, project_specific)` counts.
    ///
    /// Entries keep their recorded learn time; entries without one are stamped now.
    pub fn import_sections(&mut self, sections: PatternSections) -> (usize, usize) {
        let common = sections.common.len();
        let project_specific = sections.project_specific.len();

        for entry in sections.common.into_values() {
            let learned_at = entry.learned_at.unwrap_or_else(Utc::now);
            self.store(entry.pattern, false, learned_at);
        }
        for entry in sections.project_specific.into_values() {
            let learned_at = entry.learned_at.unwrap_or_else(Utc::now);
            self.store(entry.pattern, true, learned_at);
        }

        (common, project_specific)
    }

    /// Learned patterns of both namespaces, in document form.
    pub fn export_sections(&self) -> PatternSections {
        PatternSections {
            common: self.common.values().map(StoredPattern::to_entry).collect(),
            project_specific: self.project_specific.values().map(StoredPattern::to_entry).collect(),
        }
    }

    /// Every pattern the matcher considers, ordered by id.
    ///
    /// A common pattern shadows a built-in one with the same id; a project-specific
    /// pattern never shadows anything and is listed after its common namesake.
    pub fn all_patterns(&self) -> Vec<&BugPattern> {
        self.entries().map(|stored| &stored.pattern).collect()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &StoredPattern> {
        let mut entries: Vec<&StoredPattern> = self
            .predefined
            .iter()
            .filter(|(id, _)| !self.common.contains_key(*id))
            .map(|(_, stored)| stored)
            .chain(self.common.values())
            .chain(self.project_specific.values())
            .collect();
        entries.sort_by(|a, b| {
            a.pattern
                .id
                .cmp(&b.pattern.id)
                .then(a.pattern.project_specific.cmp(&b.pattern.project_specific))
        });
        entries.into_iter()
    }

    pub fn project_specific_patterns(&self) -> Vec<&BugPattern> {
        self.project_specific.values().map(|stored| &stored.pattern).collect()
    }

    /// Look up an id, preferring the project-specific namespace.
    pub fn get_pattern(&self, id: &str) -> Option<&BugPattern> {
        self.project_specific
            .get(id)
            .or_else(|| self.common.get(id))
            .or_else(|| self.predefined.get(id))
            .map(|stored| &stored.pattern)
    }

    /// When the pattern `get_pattern` would return was learned; `None` for built-ins.
    pub fn learned_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.project_specific
            .get(id)
            .or_else(|| self.common.get(id))
            .and_then(|stored| stored.learned_at)
    }

    /// Case-insensitive search over id, name and description.
    pub fn search_patterns(&self, query: &str) -> Vec<&BugPattern> {
        let query = query.to_lowercase();
        self.all_patterns()
            .into_iter()
            .filter(|p| {
                p.id.to_lowercase().contains(&query)
                    || p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Patterns learned at runtime or imported, in either namespace.
    pub fn learned_count(&self) -> usize {
        self.common.len() + self.project_specific.len()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.predefined.is_empty() && self.learned_count() == 0
    }
}
