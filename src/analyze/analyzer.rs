use crate::analyze::bugs::{attribute_by_position, bug_details, StatusRules};
use crate::analyze::{
    Analysis, AnalysisOptions, AttributionStrategy, ContributorRollup, DataAnalysis,
    FeedbackRow, ManagerRollup, ModuleAnalyzed, QaOverview, Rankings, ScoreSummary,
};
use crate::model::{ContributorRecord, IssueRecord, Priority};
use crate::rank::{critical_issues, ledger_standings, top_n_by, top_performers};
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::BTreeSet;

pub trait Analyzer {
    fn analyze(&self, options: &AnalysisOptions) -> Analysis;
}

impl Analyzer for DataAnalysis {
    fn analyze(&self, options: &AnalysisOptions) -> Analysis {
        let selection = &options.selection;
        let issues = self
            .issues
            .iter()
            .filter(|issue| selection.includes_module(&issue.module))
            .collect::<Vec<_>>();
        let kudos = self
            .kudos
            .iter()
            .filter(|kudo| selection.includes_module(&kudo.module))
            .filter(|kudo| selection.includes_manager(&kudo.manager))
            .collect::<Vec<_>>();
        log::debug!(
            "analyzing {} of {} modules and {} of {} kudos",
            issues.len(),
            self.issues.len(),
            kudos.len(),
            self.kudos.len()
        );

        let index = IssueIndex::new(&issues);
        let rules = StatusRules::default();
        let modules = issues
            .iter()
            .map(|issue| self.analyze_module(issue, &rules, options))
            .collect::<Vec<_>>();
        let managers = manager_rollups(&kudos, &index);
        let contributors = contributor_rollups(&kudos, &index, options.strategy);

        let rankings = Rankings {
            top_open: top_n_by(&modules, options.top_n, |m| m.record.total_open() as f64),
            top_resolution: top_n_by(&modules, options.top_n, |m| m.efficiency),
            critical: critical_issues(&modules),
            top_performers: top_performers(&contributors, options.top_n),
            contributor_points: ledger_standings(&self.contributor_points),
            manager_points: ledger_standings(&self.manager_points),
        };

        Analysis {
            overview: overview(&issues),
            test_types: test_type_distribution(&issues, options),
            feedback: feedback_rows(&kudos, &index),
            scores_by_module: score_summaries(&kudos, |kudo| &kudo.module),
            scores_by_manager: score_summaries(&kudos, |kudo| &kudo.manager),
            modules,
            managers,
            contributors,
            rankings,
        }
    }
}

trait DataAnalysisExtension {
    fn analyze_module(
        &self,
        issue: &IssueRecord,
        rules: &StatusRules,
        options: &AnalysisOptions,
    ) -> ModuleAnalyzed;
}

impl DataAnalysisExtension for DataAnalysis {
    fn analyze_module(
        &self,
        issue: &IssueRecord,
        rules: &StatusRules,
        options: &AnalysisOptions,
    ) -> ModuleAnalyzed {
        let tier = |priority| efficiency(issue.closed(priority), issue.open(priority));
        ModuleAnalyzed {
            record: issue.clone(),
            p0_efficiency: tier(Priority::P0),
            p1_efficiency: tier(Priority::P1),
            other_efficiency: tier(Priority::Other),
            efficiency: efficiency(issue.total_closed(), issue.total_open()),
            attribution: attribute_by_position(issue),
            bugs: bug_details(issue, &self.test_cases, rules, options.bug_status),
        }
    }
}

/// `closed / (open + closed)`, or 0 when there is nothing to resolve.
pub fn efficiency(closed: u64, open: u64) -> f64 {
    let total = closed as f64 + open as f64;
    if total == 0.0 {
        0.0
    } else {
        closed as f64 / total
    }
}

/// Issue rows by module name. The first row wins when a module repeats.
struct IssueIndex<'a> {
    by_module: IndexMap<&'a str, &'a IssueRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PoolTotals {
    open_p0: u64,
    closed_p0: u64,
    total_open: u64,
    total_closed: u64,
}

impl<'a> IssueIndex<'a> {
    fn new(issues: &[&'a IssueRecord]) -> Self {
        let mut by_module = IndexMap::new();
        for &issue in issues {
            if by_module.contains_key(issue.module.as_str()) {
                log::warn!(
                    "module `{}` appears more than once, keeping the first row",
                    issue.module
                );
                continue;
            }
            by_module.insert(issue.module.as_str(), issue);
        }
        Self { by_module }
    }

    fn get(&self, module: &str) -> Option<&'a IssueRecord> {
        self.by_module.get(module).copied()
    }

    /// Sums over a module set; unknown modules contribute nothing.
    fn totals(&self, modules: &BTreeSet<String>) -> PoolTotals {
        modules
            .iter()
            .filter_map(|module| self.get(module))
            .fold(PoolTotals::default(), |mut acc, issue| {
                acc.open_p0 = acc.open_p0.saturating_add(issue.open_p0);
                acc.closed_p0 = acc.closed_p0.saturating_add(issue.closed_p0);
                acc.total_open = acc.total_open.saturating_add(issue.total_open());
                acc.total_closed = acc.total_closed.saturating_add(issue.total_closed());
                acc
            })
    }
}

fn overview(issues: &[&IssueRecord]) -> QaOverview {
    let total_open = issues
        .iter()
        .fold(0u64, |acc, issue| acc.saturating_add(issue.total_open()));
    let total_closed = issues
        .iter()
        .fold(0u64, |acc, issue| acc.saturating_add(issue.total_closed()));
    QaOverview {
        total_open,
        total_closed,
        resolution_rate: efficiency(total_closed, total_open),
    }
}

fn test_type_distribution(
    issues: &[&IssueRecord],
    options: &AnalysisOptions,
) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for test_type in issues.iter().flat_map(|issue| &issue.test_types) {
        if options.selection.includes_test_type(test_type) {
            *counts.entry(test_type.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Set union of the modules of every kudo that `matches`.
fn module_pool(
    kudos: &[&ContributorRecord],
    matches: impl Fn(&ContributorRecord) -> bool,
) -> BTreeSet<String> {
    kudos
        .iter()
        .filter(|kudo| matches(**kudo))
        .map(|kudo| kudo.module.clone())
        .collect()
}

fn manager_rollups(kudos: &[&ContributorRecord], index: &IssueIndex) -> Vec<ManagerRollup> {
    kudos
        .iter()
        .map(|kudo| kudo.manager.as_str())
        .unique()
        .map(|manager| {
            let team = kudos
                .iter()
                .filter(|kudo| kudo.manager == manager)
                .collect::<Vec<_>>();
            let modules = module_pool(kudos, |kudo| kudo.manager == manager);
            let totals = index.totals(&modules);
            ManagerRollup {
                manager: manager.to_string(),
                mean_score: mean(team.iter().map(|kudo| kudo.score)),
                total_open: totals.total_open,
                total_closed: totals.total_closed,
                efficiency: efficiency(totals.total_closed, totals.total_open),
                team_size: team.iter().map(|kudo| &kudo.name).unique().count(),
                modules,
            }
        })
        .collect()
}

fn contributor_rollups(
    kudos: &[&ContributorRecord],
    index: &IssueIndex,
    strategy: AttributionStrategy,
) -> Vec<ContributorRollup> {
    kudos
        .iter()
        .map(|kudo| kudo.name.as_str())
        .unique()
        .map(|name| {
            let records = kudos
                .iter()
                .filter(|kudo| kudo.name == name)
                .collect::<Vec<_>>();
            let own_modules = module_pool(kudos, |kudo| kudo.name == name);
            let pool = match strategy {
                AttributionStrategy::PerOwnModule => own_modules.clone(),
                AttributionStrategy::PerManagerPool => {
                    let managers = records.iter().map(|kudo| &kudo.manager).collect::<Vec<_>>();
                    module_pool(kudos, |kudo| managers.contains(&&kudo.manager))
                }
            };
            let totals = index.totals(&pool);
            let latest = records.iter().max_by_key(|kudo| kudo.date);
            ContributorRollup {
                name: name.to_string(),
                manager: records.first().map(|kudo| kudo.manager.clone()).unwrap_or_default(),
                score: mean(records.iter().map(|kudo| kudo.score)),
                feedback: latest.map(|kudo| kudo.feedback.clone()).unwrap_or_default(),
                date: latest.and_then(|kudo| kudo.date),
                open_p0: totals.open_p0,
                closed_p0: totals.closed_p0,
                total_open: totals.total_open,
                total_closed: totals.total_closed,
                p0_efficiency: efficiency(totals.closed_p0, totals.open_p0),
                total_efficiency: efficiency(totals.total_closed, totals.total_open),
                own_modules,
                pool,
            }
        })
        .collect()
}

fn feedback_rows(kudos: &[&ContributorRecord], index: &IssueIndex) -> Vec<FeedbackRow> {
    kudos
        .iter()
        .map(|kudo| {
            let issue = index.get(&kudo.module);
            FeedbackRow {
                record: (*kudo).clone(),
                total_open: issue.map_or(0, |issue| issue.total_open()),
                total_closed: issue.map_or(0, |issue| issue.total_closed()),
            }
        })
        .collect()
}

fn score_summaries<F>(kudos: &[&ContributorRecord], group: F) -> Vec<ScoreSummary>
where
    F: Fn(&ContributorRecord) -> &String,
{
    kudos
        .iter()
        .map(|kudo| group(*kudo))
        .unique()
        .map(|key| {
            let scores = kudos
                .iter()
                .filter(|kudo| group(**kudo) == key)
                .map(|kudo| kudo.score)
                .collect::<Vec<_>>();
            ScoreSummary {
                group: key.clone(),
                count: scores.len(),
                min: scores.iter().copied().fold(f64::INFINITY, f64::min),
                mean: mean(scores.iter().copied()),
                max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}
