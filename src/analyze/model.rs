use crate::analyze::bugs::{AttributedBug, BugDetail, BugStatus};
use crate::model::{ContributorRecord, IssueRecord, PointEvent, TestCaseMapping};
use crate::rank::LedgerStanding;
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Everything the pipeline reads, already normalized.
#[derive(Debug, Clone, Default)]
pub struct DataAnalysis {
    pub issues: Vec<IssueRecord>,
    pub kudos: Vec<ContributorRecord>,
    pub contributor_points: Vec<PointEvent>,
    pub manager_points: Vec<PointEvent>,
    pub test_cases: TestCaseMapping,
}

impl DataAnalysis {
    pub fn new(issues: Vec<IssueRecord>, kudos: Vec<ContributorRecord>) -> Self {
        Self {
            issues,
            kudos,
            ..Self::default()
        }
    }

    pub fn with_points(mut self, contributors: Vec<PointEvent>, managers: Vec<PointEvent>) -> Self {
        self.contributor_points = contributors;
        self.manager_points = managers;
        self
    }

    pub fn with_test_cases(mut self, test_cases: TestCaseMapping) -> Self {
        self.test_cases = test_cases;
        self
    }
}

/// Which modules' issues count towards a contributor.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum AttributionStrategy {
    /// Only the modules the contributor was scored on.
    PerOwnModule,
    /// Every module managed by the contributor's manager.
    #[default]
    PerManagerPool,
}

/// Module, manager and test type filters. `None` keeps everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub modules: Option<Vec<String>>,
    pub managers: Option<Vec<String>>,
    pub test_types: Option<Vec<String>>,
}

impl Selection {
    pub fn includes_module(&self, module: &str) -> bool {
        includes(&self.modules, module)
    }

    pub fn includes_manager(&self, manager: &str) -> bool {
        includes(&self.managers, manager)
    }

    pub fn includes_test_type(&self, test_type: &str) -> bool {
        includes(&self.test_types, test_type)
    }
}

fn includes(filter: &Option<Vec<String>>, value: &str) -> bool {
    filter
        .as_ref()
        .map_or(true, |values| values.iter().any(|v| v == value))
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub selection: Selection,
    pub strategy: AttributionStrategy,
    pub bug_status: Option<BugStatus>,
    pub top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            strategy: AttributionStrategy::default(),
            bug_status: None,
            top_n: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub overview: QaOverview,
    pub modules: Vec<ModuleAnalyzed>,
    pub test_types: IndexMap<String, usize>,
    pub managers: Vec<ManagerRollup>,
    pub contributors: Vec<ContributorRollup>,
    pub feedback: Vec<FeedbackRow>,
    pub scores_by_module: Vec<ScoreSummary>,
    pub scores_by_manager: Vec<ScoreSummary>,
    pub rankings: Rankings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QaOverview {
    pub total_open: u64,
    pub total_closed: u64,
    pub resolution_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleAnalyzed {
    pub record: IssueRecord,
    pub p0_efficiency: f64,
    pub p1_efficiency: f64,
    pub other_efficiency: f64,
    pub efficiency: f64,
    pub attribution: Vec<AttributedBug>,
    pub bugs: Vec<BugDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerRollup {
    pub manager: String,
    pub modules: BTreeSet<String>,
    pub mean_score: f64,
    pub total_open: u64,
    pub total_closed: u64,
    pub efficiency: f64,
    pub team_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributorRollup {
    pub name: String,
    pub manager: String,
    pub own_modules: BTreeSet<String>,
    pub pool: BTreeSet<String>,
    pub score: f64,
    pub feedback: String,
    pub date: Option<NaiveDate>,
    pub open_p0: u64,
    pub closed_p0: u64,
    pub total_open: u64,
    pub total_closed: u64,
    pub p0_efficiency: f64,
    pub total_efficiency: f64,
}

/// A kudo joined with the issue totals of its own module.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRow {
    pub record: ContributorRecord,
    pub total_open: u64,
    pub total_closed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub top_open: Vec<ModuleAnalyzed>,
    pub top_resolution: Vec<ModuleAnalyzed>,
    pub critical: Vec<ModuleAnalyzed>,
    pub top_performers: Vec<ContributorRollup>,
    pub contributor_points: Vec<LedgerStanding>,
    pub manager_points: Vec<LedgerStanding>,
}
