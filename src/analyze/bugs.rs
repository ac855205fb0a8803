//! Bug title handling: positional open/closed attribution per priority tier,
//! keyword status classification and test-case based priority.

use crate::model::{IssueRecord, Priority, TestCaseMapping};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum BugStatus {
    Open,
    Closed,
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BugStatus::Open => f.write_str("Open"),
            BugStatus::Closed => f.write_str("Closed"),
        }
    }
}

/// Keyword → status, checked in order against the lower-cased title.
pub const DEFAULT_STATUS_RULES: [(&str, BugStatus); 11] = [
    ("resolved", BugStatus::Closed),
    ("fixed", BugStatus::Closed),
    ("completed", BugStatus::Closed),
    ("closed", BugStatus::Closed),
    ("done", BugStatus::Closed),
    ("failure", BugStatus::Open),
    ("error", BugStatus::Open),
    ("delay", BugStatus::Open),
    ("issues", BugStatus::Open),
    ("open", BugStatus::Open),
    ("pending", BugStatus::Open),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StatusRules {
    rules: Vec<(String, BugStatus)>,
    fallback: BugStatus,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_RULES.to_vec(), BugStatus::Open)
    }
}

impl StatusRules {
    pub fn new(rules: Vec<(impl ToString, BugStatus)>, fallback: BugStatus) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(keyword, status)| (keyword.to_string().to_lowercase(), *status))
                .collect(),
            fallback,
        }
    }

    /// First rule whose keyword occurs in `title` wins.
    pub fn classify(&self, title: &str) -> BugStatus {
        let title = title.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| title.contains(keyword.as_str()))
            .map_or(self.fallback, |(_, status)| *status)
    }
}

/// A bug title labeled by its index within the module's list.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedBug {
    pub title: String,
    pub priority: Priority,
    pub status: BugStatus,
}

/// Titles `0..open` are Open, `open..open + closed` are Closed. Each tier
/// starts again at index 0; indices past the end are skipped.
pub fn attribute_tier(
    titles: &[String],
    priority: Priority,
    open: u64,
    closed: u64,
) -> Vec<AttributedBug> {
    let open = usize::try_from(open).unwrap_or(usize::MAX);
    let closed = usize::try_from(closed).unwrap_or(usize::MAX);
    titles
        .iter()
        .take(open.saturating_add(closed))
        .enumerate()
        .map(|(index, title)| AttributedBug {
            title: title.clone(),
            priority,
            status: if index < open {
                BugStatus::Open
            } else {
                BugStatus::Closed
            },
        })
        .collect()
}

pub fn attribute_by_position(record: &IssueRecord) -> Vec<AttributedBug> {
    Priority::ALL
        .iter()
        .flat_map(|&priority| {
            attribute_tier(
                &record.bug_titles,
                priority,
                record.open(priority),
                record.closed(priority),
            )
        })
        .collect()
}

/// Test cases of one module split by the tier they match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierCases {
    pub p0: Vec<String>,
    pub p1: Vec<String>,
    pub other: Vec<String>,
}

impl TierCases {
    pub fn classify(record: &IssueRecord, mapping: &TestCaseMapping) -> Self {
        let matches = |test_case: &str, priority: Priority| {
            mapping
                .ids(&record.module, priority)
                .iter()
                .any(|id| test_case.contains(id.as_str()))
        };
        let mut cases = Self::default();
        for test_case in &record.test_cases {
            if matches(test_case, Priority::P0) {
                cases.p0.push(test_case.clone());
            } else if matches(test_case, Priority::P1) {
                cases.p1.push(test_case.clone());
            } else if matches(test_case, Priority::Other) {
                cases.other.push(test_case.clone());
            }
        }
        cases
    }

    pub fn priority(&self) -> Priority {
        if !self.p0.is_empty() {
            Priority::P0
        } else if !self.p1.is_empty() {
            Priority::P1
        } else {
            Priority::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BugDetail {
    pub title: String,
    pub status: BugStatus,
    pub priority: Priority,
    pub cases: TierCases,
}

/// Bug details of one module, most severe first, optionally one status only.
pub fn bug_details(
    record: &IssueRecord,
    mapping: &TestCaseMapping,
    rules: &StatusRules,
    status: Option<BugStatus>,
) -> Vec<BugDetail> {
    let cases = TierCases::classify(record, mapping);
    let priority = cases.priority();
    let mut details = record
        .bug_titles
        .iter()
        .map(|title| BugDetail {
            title: title.clone(),
            status: rules.classify(title),
            priority,
            cases: cases.clone(),
        })
        .filter(|detail| status.map_or(true, |s| detail.status == s))
        .collect::<Vec<_>>();
    details.sort_by_key(|detail| detail.priority);
    details
}

/// Bug counts per priority tier.
pub fn priority_summary(details: &[BugDetail]) -> [(Priority, usize); 3] {
    Priority::ALL.map(|priority| {
        let count = details.iter().filter(|d| d.priority == priority).count();
        (priority, count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn inbox() -> IssueRecord {
        IssueRecord {
            module: "Inbox".to_string(),
            open_p0: 2,
            closed_p0: 1,
            open_p1: 1,
            closed_p1: 0,
            open_other: 0,
            closed_other: 1,
            bug_titles: titles(&["A", "B", "C", "D"]),
            ..IssueRecord::default()
        }
    }

    #[test]
    fn p0_titles_are_labeled_by_position() {
        let labeled = attribute_tier(&inbox().bug_titles, Priority::P0, 2, 1)
            .into_iter()
            .map(|bug| (bug.title, bug.status))
            .collect::<Vec<_>>();
        assert_eq!(
            labeled,
            vec![
                ("A".to_string(), BugStatus::Open),
                ("B".to_string(), BugStatus::Open),
                ("C".to_string(), BugStatus::Closed),
            ]
        );
    }

    #[test]
    fn every_tier_restarts_at_the_first_title() {
        let labeled = attribute_by_position(&inbox())
            .into_iter()
            .map(|bug| (bug.priority, bug.title, bug.status))
            .collect::<Vec<_>>();
        assert_eq!(
            labeled,
            vec![
                (Priority::P0, "A".to_string(), BugStatus::Open),
                (Priority::P0, "B".to_string(), BugStatus::Open),
                (Priority::P0, "C".to_string(), BugStatus::Closed),
                (Priority::P1, "A".to_string(), BugStatus::Open),
                (Priority::Other, "A".to_string(), BugStatus::Closed),
            ]
        );
    }

    #[test]
    fn short_title_lists_are_skipped_silently() {
        let labeled = attribute_tier(&titles(&["A"]), Priority::P1, 2, 3);
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].status, BugStatus::Open);
        assert!(attribute_tier(&[], Priority::P0, 4, 4).is_empty());
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = StatusRules::default();
        assert_eq!(rules.classify("Login FIXED after error"), BugStatus::Closed);
        assert_eq!(rules.classify("Sync error on reconnect"), BugStatus::Open);
        assert_eq!(rules.classify("Button misaligned"), BugStatus::Open);

        let reversed = StatusRules::new(
            vec![("error", BugStatus::Open), ("fixed", BugStatus::Closed)],
            BugStatus::Closed,
        );
        assert_eq!(reversed.classify("Login fixed after error"), BugStatus::Open);
        assert_eq!(reversed.classify("Button misaligned"), BugStatus::Closed);
    }

    #[test]
    fn details_take_priority_from_matched_test_cases() {
        let mut mapping = TestCaseMapping::default();
        mapping.insert("Inbox", Priority::P0, vec!["TC_001"]);
        mapping.insert("Inbox", Priority::P1, vec!["TC_003"]);
        let record = IssueRecord {
            bug_titles: titles(&["Reply resolved", "Attachment error"]),
            test_cases: titles(&["TC_003 reply", "TC_009 misc"]),
            ..inbox()
        };

        let details = bug_details(&record, &mapping, &StatusRules::default(), None);
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| d.priority == Priority::P1));
        assert_eq!(details[0].cases.p1, titles(&["TC_003 reply"]));
        assert!(details[0].cases.other.is_empty());
        assert_eq!(
            priority_summary(&details),
            [(Priority::P0, 0), (Priority::P1, 2), (Priority::Other, 0)]
        );

        let rules = StatusRules::default();
        let closed = bug_details(&record, &mapping, &rules, Some(BugStatus::Closed));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].title, "Reply resolved");
    }

    #[test]
    fn unmapped_modules_default_to_other() {
        let mapping = TestCaseMapping::default();
        let details = bug_details(&inbox(), &mapping, &StatusRules::default(), None);
        assert_eq!(details.len(), 4);
        assert!(details.iter().all(|d| d.priority == Priority::Other));
    }
}
