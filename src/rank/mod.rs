mod ranker;

pub use ranker::{critical_issues, ledger_standings, top_n_by, top_performers, LedgerStanding};
