//! Per-batch reconciliation index.
//!
//! Groups records by exact title and by numeric code fragment, telling
//! re-observations (same item id seen again) apart from conflicts (a
//! different item id sharing the key).
//!
//! > A record whose item id matches *any* existing member is dropped.
//! > Otherwise it is appended, so every group of two or more members holds
//! > that many distinct item ids.
//!
//! The index is rebuilt from scratch for every batch and holds no state
//! across cycles.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ClassifiedRecord, ListingRecord};

/// Records sharing one key, in first-seen order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Group {
    /// Batch position of the first member, used to order groups
    pub first_seen: usize,
    pub members: Vec<ListingRecord>,
}

impl Group {
    fn new(first_seen: usize, record: &ListingRecord) -> Self {
        Self {
            first_seen,
            members: vec![record.clone()],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Two or more distinct item ids share this key.
    pub fn is_conflict(&self) -> bool {
        self.members.len() >= 2
    }

    /// Whether any member carries this item id.
    fn contains_item(&self, item_id: &str) -> bool {
        self.members.iter().any(|m| m.item_id == item_id)
    }
}

/// Outcome of offering a record to one group map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First record with this key
    NewGroup,
    /// Same item id already present
    Reobserved,
    /// Different item id under an existing key
    Conflict,
}

/// Groups keyed by title and by digit fragment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationIndex {
    pub by_title: HashMap<String, Group>,
    pub by_code_digits: HashMap<String, Group>,
}

impl ReconciliationIndex {
    /// Title groups holding two or more distinct items, in first-seen order.
    pub fn title_conflicts(&self) -> Vec<(&str, &Group)> {
        conflicts(&self.by_title)
    }

    /// Digit-fragment groups holding two or more distinct items, in first-seen order.
    pub fn code_conflicts(&self) -> Vec<(&str, &Group)> {
        conflicts(&self.by_code_digits)
    }
}

fn conflicts(map: &HashMap<String, Group>) -> Vec<(&str, &Group)> {
    let mut found: Vec<(&str, &Group)> = map
        .iter()
        .filter(|(_, group)| group.is_conflict())
        .map(|(key, group)| (key.as_str(), group))
        .collect();
    found.sort_by_key(|(_, group)| group.first_seen);
    found
}

/// Counters collected while building the index.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReconcileStats {
    pub records: usize,
    pub reobserved_titles: usize,
    pub reobserved_fragments: usize,
    pub without_fragment: usize,
}

/// Builder for constructing a reconciliation index.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: ReconciliationIndex,
    stats: ReconcileStats,
}

impl IndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under its title and, if present, its digit fragment.
    pub fn add_record(&mut self, record: &ClassifiedRecord) {
        let position = self.stats.records;
        self.stats.records += 1;

        let listing = &record.record;
        if place(&mut self.index.by_title, &listing.title, position, listing)
            == Placement::Reobserved
        {
            self.stats.reobserved_titles += 1;
        }

        match record.digit_fragment() {
            Some(fragment) => {
                if place(&mut self.index.by_code_digits, fragment, position, listing)
                    == Placement::Reobserved
                {
                    self.stats.reobserved_fragments += 1;
                }
            }
            None => self.stats.without_fragment += 1,
        }
    }

    /// Finish building and return the index with its counters.
    pub fn build(self) -> (ReconciliationIndex, ReconcileStats) {
        (self.index, self.stats)
    }
}

/// Offer a record to the group stored under `key`.
fn place(
    groups: &mut HashMap<String, Group>,
    key: &str,
    position: usize,
    record: &ListingRecord,
) -> Placement {
    match groups.get_mut(key) {
        None => {
            groups.insert(key.to_string(), Group::new(position, record));
            Placement::NewGroup
        }
        Some(group) if group.contains_item(&record.item_id) => Placement::Reobserved,
        Some(group) => {
            log::debug!(
                "Conflict on '{}': item {} joins {} existing member(s)",
                key,
                record.item_id,
                group.len()
            );
            group.members.push(record.clone());
            Placement::Conflict
        }
    }
}

/// Build the reconciliation index for one batch.
pub fn reconcile(records: &[ClassifiedRecord]) -> ReconciliationIndex {
    let mut builder = IndexBuilder::new();
    for record in records {
        builder.add_record(record);
    }
    builder.build().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{CodeClassifier, StandardClassifier, parse_line};

    fn classified(line: &str) -> ClassifiedRecord {
        let record = parse_line(line).unwrap();
        let analysis = StandardClassifier.analyze(&record.code);
        ClassifiedRecord::new(record, analysis)
    }

    fn line(title: &str, code: &str, item: &str) -> String {
        format!("{title} - SKU: {code} - W1 - Item: {item}")
    }

    #[test]
    fn test_scenario_title_and_fragment_conflict() {
        let records = vec![
            classified("Widget A - SKU: SF - 111 - Warehouse1 - Item: 111111111111"),
            classified("Widget A - SKU: SF - 111 - Warehouse1 - Item: 222222222222"),
        ];
        let index = reconcile(&records);

        assert_eq!(index.by_title["Widget A"].len(), 2);
        assert_eq!(index.by_code_digits["111"].len(), 2);
        assert_eq!(index.title_conflicts().len(), 1);
        assert_eq!(index.code_conflicts().len(), 1);
    }

    #[test]
    fn test_repeated_scrape_is_not_a_conflict() {
        let same = line("Widget A", "SF - 111", "111111111111");
        let records = vec![classified(&same), classified(&same), classified(&same)];

        let mut builder = IndexBuilder::new();
        for record in &records {
            builder.add_record(record);
        }
        let (index, stats) = builder.build();

        assert_eq!(index.by_title["Widget A"].len(), 1);
        assert_eq!(index.by_code_digits["111"].len(), 1);
        assert!(index.title_conflicts().is_empty());
        assert_eq!(stats.reobserved_titles, 2);
        assert_eq!(stats.reobserved_fragments, 2);
    }

    #[test]
    fn test_reconciling_twice_is_idempotent() {
        let batch = vec![
            classified(&line("Widget A", "SF - 111", "111111111111")),
            classified(&line("Widget B", "SF - 222", "222222222222")),
            classified(&line("Widget C", "SF - 333", "333333333333")),
        ];
        let doubled: Vec<_> = batch.iter().chain(batch.iter()).cloned().collect();
        let index = reconcile(&doubled);

        assert!(index.by_title.values().all(|g| g.len() == 1));
        assert!(index.by_code_digits.values().all(|g| g.len() == 1));
    }

    #[test]
    fn test_reobservation_keeps_different_text() {
        // Same item id seen with a tweaked location still counts as re-observed.
        let records = vec![
            classified("Widget A - SKU: SF - 111 - W1 - Item: 111111111111"),
            classified("Widget A - SKU: SF - 111 - W2 - Item: 111111111111"),
        ];
        let index = reconcile(&records);
        assert_eq!(index.by_title["Widget A"].len(), 1);
        assert_eq!(index.by_title["Widget A"].members[0].location, "W1");
    }

    #[test]
    fn test_three_distinct_items_all_captured() {
        let records = vec![
            classified(&line("Widget A", "SF - 111", "111111111111")),
            classified(&line("Widget A", "SF - 111", "222222222222")),
            classified(&line("Widget A", "SF - 111", "333333333333")),
        ];
        let index = reconcile(&records);
        let ids: Vec<_> = index.by_title["Widget A"]
            .members
            .iter()
            .map(|m| m.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["111111111111", "222222222222", "333333333333"]);
    }

    #[test]
    fn test_reobserving_non_first_member_is_dropped() {
        let records = vec![
            classified(&line("Widget A", "SF - 111", "111111111111")),
            classified(&line("Widget A", "SF - 111", "222222222222")),
            classified(&line("Widget A", "SF - 111", "222222222222")),
        ];
        let index = reconcile(&records);
        assert_eq!(index.by_title["Widget A"].len(), 2);
        assert_eq!(index.by_code_digits["111"].len(), 2);
    }

    #[test]
    fn test_fragment_conflict_across_titles() {
        let records = vec![
            classified(&line("Widget A", "SF - 4145", "111111111111")),
            classified(&line("Gadget B", "JW - 4145 - B", "222222222222")),
        ];
        let index = reconcile(&records);
        assert!(index.title_conflicts().is_empty());
        let conflicts = index.code_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, "4145");
    }

    #[test]
    fn test_records_without_fragment_skip_fragment_index() {
        let records = vec![
            classified(&line("Widget A", "SF - - -", "111111111111")),
            classified(&line("Widget B", "SF - - -", "222222222222")),
            classified(&line("Widget C", "SF - 12", "333333333333")),
        ];
        let mut builder = IndexBuilder::new();
        for record in &records {
            builder.add_record(record);
        }
        let (index, stats) = builder.build();

        assert!(index.by_code_digits.is_empty());
        assert_eq!(stats.without_fragment, 3);
        assert_eq!(index.by_title.len(), 3);
    }

    #[test]
    fn test_conflicts_are_ordered_by_first_seen() {
        let records = vec![
            classified(&line("Zeta", "SF - 901", "111111111111")),
            classified(&line("Alpha", "SF - 902", "222222222222")),
            classified(&line("Alpha", "SF - 903", "333333333333")),
            classified(&line("Zeta", "SF - 904", "444444444444")),
        ];
        let index = reconcile(&records);
        let keys: Vec<_> = index.title_conflicts().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }
}
