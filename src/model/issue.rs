use crate::model::normalize::{parse_count, split_list, text};
use crate::model::table::{RawTable, Schema};
use indexmap::IndexMap;
use std::fmt;

pub const MODULE: &str = "Module";
pub const P0_OPEN: &str = "P0 issues Open";
pub const P0_CLOSED: &str = "P0 issues closed";
pub const P1_OPEN: &str = "P1 Issues Open";
pub const P1_CLOSED: &str = "P1 Issues Closed";
pub const OTHER_OPEN: &str = "Rest Issues Open";
pub const OTHER_CLOSED: &str = "Rest Issues Closed";
pub const TEST_TYPE: &str = "Test Type";
pub const BUG_TITLES: &str = "Bug Titles";
pub const TEST_CASES: &str = "Test Cases";

pub const ISSUE_SCHEMA: Schema = Schema {
    name: "QA issues",
    required: &[
        MODULE,
        P0_OPEN,
        P0_CLOSED,
        P1_OPEN,
        P1_CLOSED,
        OTHER_OPEN,
        OTHER_CLOSED,
    ],
    optional: &[TEST_TYPE, BUG_TITLES, TEST_CASES],
};

/// Issue priority tier, most severe first.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Priority {
    P0,
    P1,
    Other,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::P0, Priority::P1, Priority::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::Other => "Other",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueRecord {
    pub module: String,
    pub open_p0: u64,
    pub closed_p0: u64,
    pub open_p1: u64,
    pub closed_p1: u64,
    pub open_other: u64,
    pub closed_other: u64,
    pub test_types: Vec<String>,
    pub bug_titles: Vec<String>,
    pub test_cases: Vec<String>,
    pub extra: IndexMap<String, String>,
}

// Create
impl IssueRecord {
    pub fn from_table(table: &RawTable) -> Vec<Self> {
        let known = ISSUE_SCHEMA.known_columns();
        table
            .records()
            .map(|record| Self {
                module: text(record.get(MODULE)),
                open_p0: parse_count(record.get(P0_OPEN)),
                closed_p0: parse_count(record.get(P0_CLOSED)),
                open_p1: parse_count(record.get(P1_OPEN)),
                closed_p1: parse_count(record.get(P1_CLOSED)),
                open_other: parse_count(record.get(OTHER_OPEN)),
                closed_other: parse_count(record.get(OTHER_CLOSED)),
                test_types: split_list(record.get(TEST_TYPE)),
                bug_titles: split_list(record.get(BUG_TITLES)),
                test_cases: split_list(record.get(TEST_CASES)),
                extra: record.extra(&known),
            })
            .collect()
    }
}

// Derived
impl IssueRecord {
    pub fn open(&self, priority: Priority) -> u64 {
        match priority {
            Priority::P0 => self.open_p0,
            Priority::P1 => self.open_p1,
            Priority::Other => self.open_other,
        }
    }

    pub fn closed(&self, priority: Priority) -> u64 {
        match priority {
            Priority::P0 => self.closed_p0,
            Priority::P1 => self.closed_p1,
            Priority::Other => self.closed_other,
        }
    }

    pub fn total_open(&self) -> u64 {
        self.open_p0
            .saturating_add(self.open_p1)
            .saturating_add(self.open_other)
    }

    pub fn total_closed(&self) -> u64 {
        self.closed_p0
            .saturating_add(self.closed_p1)
            .saturating_add(self.closed_other)
    }

    pub fn total(&self) -> u64 {
        self.total_open().saturating_add(self.total_closed())
    }
}
