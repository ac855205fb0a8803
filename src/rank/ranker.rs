use crate::analyze::{ContributorRollup, ModuleAnalyzed};
use crate::model::PointEvent;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Total points of one name in a point ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStanding {
    pub name: String,
    pub points: f64,
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// The `n` items with the largest `key`; ties keep input order.
pub fn top_n_by<T, F>(items: &[T], n: usize, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| descending(key(a), key(b)));
    ranked.truncate(n);
    ranked
}

/// Highest score first, then best P0 efficiency.
pub fn top_performers(contributors: &[ContributorRollup], n: usize) -> Vec<ContributorRollup> {
    let mut ranked = contributors.to_vec();
    ranked.sort_by(|a, b| {
        descending(a.score, b.score).then_with(|| descending(a.p0_efficiency, b.p0_efficiency))
    });
    ranked.truncate(n);
    ranked
}

/// Every module, most open P0 issues first.
pub fn critical_issues(modules: &[ModuleAnalyzed]) -> Vec<ModuleAnalyzed> {
    top_n_by(modules, modules.len(), |module| module.record.open_p0 as f64)
}

pub fn ledger_standings(events: &[PointEvent]) -> Vec<LedgerStanding> {
    let mut totals: IndexMap<&str, f64> = IndexMap::new();
    for event in events {
        *totals.entry(event.name.as_str()).or_insert(0.0) += event.points;
    }
    let standings = totals
        .into_iter()
        .map(|(name, points)| LedgerStanding {
            name: name.to_string(),
            points,
        })
        .collect::<Vec<_>>();
    top_n_by(&standings, standings.len(), |standing| standing.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn contributor(name: &str, score: f64, p0_efficiency: f64) -> ContributorRollup {
        ContributorRollup {
            name: name.to_string(),
            manager: "Sam".to_string(),
            own_modules: BTreeSet::new(),
            pool: BTreeSet::new(),
            score,
            feedback: String::new(),
            date: None,
            open_p0: 0,
            closed_p0: 0,
            total_open: 0,
            total_closed: 0,
            p0_efficiency,
            total_efficiency: 0.0,
        }
    }

    fn names(contributors: &[ContributorRollup]) -> Vec<&str> {
        contributors.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn ledger_points_are_summed_and_ranked() {
        let events = vec![
            PointEvent::new("Ana", 10.0),
            PointEvent::new("Ana", 5.0),
            PointEvent::new("Ben", 12.0),
        ];
        assert_eq!(
            ledger_standings(&events),
            vec![
                LedgerStanding { name: "Ana".to_string(), points: 15.0 },
                LedgerStanding { name: "Ben".to_string(), points: 12.0 },
            ]
        );
    }

    #[test]
    fn ledger_ties_keep_first_appearance() {
        let events = vec![
            PointEvent::new("Cy", 4.0),
            PointEvent::new("Ana", 9.0),
            PointEvent::new("Ben", 4.0),
        ];
        let order = ledger_standings(&events)
            .into_iter()
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["Ana", "Cy", "Ben"]);
        assert!(ledger_standings(&[]).is_empty());
    }

    #[test]
    fn performers_break_ties_on_p0_efficiency() {
        let contributors = vec![
            contributor("Ana", 80.0, 0.2),
            contributor("Ben", 95.0, 0.1),
            contributor("Cy", 80.0, 0.9),
            contributor("Dee", 60.0, 1.0),
        ];
        assert_eq!(names(&top_performers(&contributors, 3)), vec!["Ben", "Cy", "Ana"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let contributors = vec![
            contributor("Dee", 70.0, 0.5),
            contributor("Ana", 70.0, 0.5),
            contributor("Cy", 70.0, 0.5),
        ];
        assert_eq!(names(&top_performers(&contributors, 10)), vec!["Dee", "Ana", "Cy"]);
    }

    #[test]
    fn top_n_is_stable_and_bounded() {
        let values = vec![("a", 1.0), ("b", 3.0), ("c", 3.0), ("d", 2.0)];
        let top = top_n_by(&values, 3, |(_, v)| *v);
        assert_eq!(top, vec![("b", 3.0), ("c", 3.0), ("d", 2.0)]);
        assert!(top_n_by(&values, 0, |(_, v)| *v).is_empty());
        assert_eq!(top_n_by(&values, 9, |(_, v)| *v).len(), 4);
    }
}
