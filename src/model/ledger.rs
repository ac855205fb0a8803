use crate::model::normalize::{parse_real, text};
use crate::model::table::{RawTable, Schema};

pub const POINTS: &str = "Points";

pub const CONTRIBUTOR_LEDGER_SCHEMA: Schema = Schema {
    name: "contributor points",
    required: &[crate::model::contributor::NAME, POINTS],
    optional: &[],
};

pub const MANAGER_LEDGER_SCHEMA: Schema = Schema {
    name: "manager points",
    required: &[crate::model::contributor::MANAGER, POINTS],
    optional: &[],
};

/// Which point ledger a table belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LedgerKind {
    Contributor,
    Manager,
}

impl LedgerKind {
    pub fn schema(&self) -> &'static Schema {
        match self {
            LedgerKind::Contributor => &CONTRIBUTOR_LEDGER_SCHEMA,
            LedgerKind::Manager => &MANAGER_LEDGER_SCHEMA,
        }
    }

    fn name_column(&self) -> &'static str {
        self.schema().required[0]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointEvent {
    pub name: String,
    pub points: f64,
}

// Create
impl PointEvent {
    pub fn new(name: impl ToString, points: f64) -> Self {
        Self {
            name: name.to_string(),
            points,
        }
    }

    pub fn from_table(table: &RawTable, kind: LedgerKind) -> Vec<Self> {
        table
            .records()
            .map(|record| {
                Self::new(
                    text(record.get(kind.name_column())),
                    parse_real(record.get(POINTS)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ledgers_read_their_own_name_column() {
        let table = RawTable::new(
            vec!["QA_Name", "EM_Name", "Points"],
            vec![vec!["Ana", "Sam", "10"], vec!["Ben", "Sam", "bonus"]],
        );
        assert_eq!(
            PointEvent::from_table(&table, LedgerKind::Contributor),
            vec![PointEvent::new("Ana", 10.0), PointEvent::new("Ben", 0.0)]
        );
        assert_eq!(
            PointEvent::from_table(&table, LedgerKind::Manager),
            vec![PointEvent::new("Sam", 10.0), PointEvent::new("Sam", 0.0)]
        );
    }
}
