use crate::model::normalize::{parse_date, parse_score, text};
use crate::model::table::{RawTable, Schema};
use chrono::NaiveDate;
use indexmap::IndexMap;

pub const NAME: &str = "QA_Name";
pub const MODULE: &str = "Module";
pub const MANAGER: &str = "EM_Name";
pub const SCORE: &str = "QA_Score";
pub const FEEDBACK: &str = "QA_Feedback";
pub const DATE: &str = "Date";

pub const KUDO_SCHEMA: Schema = Schema {
    name: "kudos",
    required: &[NAME, MODULE, MANAGER, SCORE],
    optional: &[FEEDBACK, DATE],
};

/// One kudo: a contributor's score for the work on one module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributorRecord {
    pub name: String,
    pub module: String,
    pub manager: String,
    pub score: f64,
    pub feedback: String,
    pub date: Option<NaiveDate>,
    pub extra: IndexMap<String, String>,
}

// Create
impl ContributorRecord {
    pub fn from_table(table: &RawTable) -> Vec<Self> {
        let known = KUDO_SCHEMA.known_columns();
        table
            .records()
            .map(|record| Self {
                name: text(record.get(NAME)),
                module: text(record.get(MODULE)),
                manager: text(record.get(MANAGER)),
                score: parse_score(record.get(SCORE)),
                feedback: text(record.get(FEEDBACK)),
                date: parse_date(record.get(DATE)),
                extra: record.extra(&known),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kudo_rows_normalize() {
        let table = RawTable::new(
            vec![NAME, MODULE, MANAGER, SCORE, FEEDBACK, DATE, "Team"],
            vec![
                vec!["Ana", "Inbox", "Sam", "92", "Thorough", "2024-05-02", "core"],
                vec!["Ben", "Voice", "Sam", "n/a", "", "soon", "edge"],
            ],
        );
        let records = ContributorRecord::from_table(&table);

        assert_eq!(records[0].name, "Ana");
        assert_eq!(records[0].score, 92.0);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(records[0].extra.get("Team").map(String::as_str), Some("core"));

        assert_eq!(records[1].score, 0.0);
        assert_eq!(records[1].feedback, "");
        assert_eq!(records[1].date, None);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let table = RawTable::new(
            vec![NAME, MODULE, MANAGER, SCORE],
            vec![vec!["Ana", "Inbox", "Sam", "80"]],
        );
        assert!(KUDO_SCHEMA.missing_columns(&table).is_empty());
        let records = ContributorRecord::from_table(&table);
        assert_eq!(records[0].feedback, "");
        assert!(records[0].extra.is_empty());
    }
}
