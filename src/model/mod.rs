pub mod contributor;
pub mod issue;
pub mod ledger;
pub mod mapping;
pub mod normalize;
pub mod table;

pub use contributor::ContributorRecord;
pub use issue::{IssueRecord, Priority};
pub use ledger::{LedgerKind, PointEvent};
pub use mapping::TestCaseMapping;
pub use table::{RawTable, Schema};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
