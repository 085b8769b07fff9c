//! Record filtering and ordering
//!
//! Filters are conjunctive: a record is kept only if it satisfies every
//! supplied predicate. Text predicates compare case-insensitively.

use crate::models::{Priority, Record, Status};

/// Equality filter over the classification fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub author: Option<String>,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// True when no predicate is set; such a filter keeps everything
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }

    /// Check a single record against every predicate
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ref author) = self.author {
            if !eq_ignore_case(&record.author, author) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if !eq_ignore_case(&record.category, category) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if record.priority != Some(priority) {
                return false;
            }
        }
        true
    }
}

/// Keep the records matching `filter`, preserving their order
pub fn apply(records: Vec<Record>, filter: &Filter) -> Vec<Record> {
    if filter.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Case-insensitive substring search over title, author and category
pub fn search(records: Vec<Record>, term: &str) -> Vec<Record> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&term)
                || r.author.to_lowercase().contains(&term)
                || r.category.to_lowercase().contains(&term)
        })
        .collect()
}

/// Order records high → medium → low; records without a priority go last
///
/// The sort is stable, so records sharing a priority keep their relative
/// order.
pub fn sort_by_priority(records: &mut [Record]) {
    records.sort_by_key(priority_rank);
}

fn priority_rank(record: &Record) -> u8 {
    record
        .priority
        .map(|p| p.rank())
        .unwrap_or(Priority::ALL.len() as u8)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Defaults, NewRecord};

    fn record(title: &str, author: &str, status: Status, priority: Option<Priority>) -> Record {
        let mut input = NewRecord::new(title);
        input.author = Some(author.to_string());
        input.status = Some(status);
        let mut record = input.into_record(&Defaults::default());
        record.priority = priority;
        record
    }

    fn titles(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    fn library() -> Vec<Record> {
        vec![
            record("Dune", "Frank Herbert", Status::Read, Some(Priority::Low)),
            record("Children of Dune", "Frank Herbert", Status::Unread, Some(Priority::High)),
            record("Neuromancer", "William Gibson", Status::Read, Some(Priority::Medium)),
            record("Dune Messiah", "Frank Herbert", Status::Read, Some(Priority::High)),
        ]
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        let all = apply(library(), &filter);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let filter = Filter::new().author("Frank Herbert").status(Status::Read);
        let result = apply(library(), &filter);
        assert_eq!(titles(&result), vec!["Dune", "Dune Messiah"]);
    }

    #[test]
    fn test_filter_text_is_case_insensitive() {
        let filter = Filter::new().author("frank herbert");
        assert_eq!(apply(library(), &filter).len(), 3);

        let filter = Filter::new().category("GENERAL");
        assert_eq!(apply(library(), &filter).len(), 4);
    }

    #[test]
    fn test_filter_priority() {
        let filter = Filter::new().priority(Priority::High);
        let result = apply(library(), &filter);
        assert_eq!(titles(&result), vec!["Children of Dune", "Dune Messiah"]);
    }

    #[test]
    fn test_filter_without_match_is_empty() {
        let filter = Filter::new().author("Ursula K. Le Guin");
        assert!(apply(library(), &filter).is_empty());
    }

    #[test]
    fn test_sort_by_priority() {
        let mut records = vec![
            record("A", "x", Status::Unread, Some(Priority::Low)),
            record("B", "x", Status::Unread, Some(Priority::High)),
            record("C", "x", Status::Unread, Some(Priority::Medium)),
        ];
        sort_by_priority(&mut records);
        assert_eq!(titles(&records), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut records = library();
        sort_by_priority(&mut records);
        assert_eq!(
            titles(&records),
            vec!["Children of Dune", "Dune Messiah", "Neuromancer", "Dune"]
        );
    }

    #[test]
    fn test_missing_priority_sorts_last() {
        let mut records = vec![
            record("Legacy", "x", Status::Read, None),
            record("Low", "x", Status::Read, Some(Priority::Low)),
            record("High", "x", Status::Read, Some(Priority::High)),
        ];
        sort_by_priority(&mut records);
        assert_eq!(titles(&records), vec!["High", "Low", "Legacy"]);
    }

    #[test]
    fn test_search() {
        let result = search(library(), "dune");
        assert_eq!(titles(&result), vec!["Dune", "Children of Dune", "Dune Messiah"]);

        let result = search(library(), "GIBSON");
        assert_eq!(titles(&result), vec!["Neuromancer"]);

        assert_eq!(search(library(), "  ").len(), 4);
    }
}
