use crate::analyze::{Analysis, ContributorRollup, FeedbackRow, ManagerRollup, ModuleAnalyzed};
use crate::model::issue::{
    BUG_TITLES, MODULE, OTHER_CLOSED, OTHER_OPEN, P0_CLOSED, P0_OPEN, P1_CLOSED, P1_OPEN,
    TEST_CASES, TEST_TYPE,
};
use crate::model::{RawTable, Result};
use crate::rank::LedgerStanding;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

pub trait CsvExport {
    fn export_table(&self) -> RawTable;
}

pub fn ratio(value: f64) -> String {
    format!("{value:.4}")
}

fn score(value: f64) -> String {
    format!("{value:.2}")
}

fn join(values: &[String], separator: &str) -> String {
    values.join(separator)
}

/// Union of passthrough column names, in first-appearance order.
fn extra_columns<'a>(extras: impl Iterator<Item = &'a IndexMap<String, String>>) -> Vec<String> {
    extras.flat_map(|extra| extra.keys()).unique().cloned().collect()
}

fn extra_cells<'a>(
    columns: &'a [String],
    extra: &'a IndexMap<String, String>,
) -> impl Iterator<Item = String> + 'a {
    columns
        .iter()
        .map(|column| extra.get(column).cloned().unwrap_or_default())
}

fn modules(set: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    set.into_iter().map(|m| m.as_ref().to_string()).join("; ")
}

/// The selected issue rows with their derived totals; passthrough columns
/// sit between the source columns and the totals.
impl CsvExport for [ModuleAnalyzed] {
    fn export_table(&self) -> RawTable {
        let extra_columns = extra_columns(self.iter().map(|m| &m.record.extra));
        let headers = [
            MODULE, P0_OPEN, P0_CLOSED, P1_OPEN, P1_CLOSED, OTHER_OPEN, OTHER_CLOSED, TEST_TYPE,
            BUG_TITLES, TEST_CASES,
        ]
        .iter()
        .map(|h| h.to_string())
        .chain(extra_columns.iter().cloned())
        .chain(
            ["Total Open Issues", "Total Closed Issues", "Total Issues", "Resolution Rate"]
                .iter()
                .map(|h| h.to_string()),
        )
        .collect();
        let rows = self
            .iter()
            .map(|m| {
                let r = &m.record;
                let source = vec![
                    r.module.clone(),
                    r.open_p0.to_string(),
                    r.closed_p0.to_string(),
                    r.open_p1.to_string(),
                    r.closed_p1.to_string(),
                    r.open_other.to_string(),
                    r.closed_other.to_string(),
                    join(&r.test_types, ","),
                    join(&r.bug_titles, ","),
                    join(&r.test_cases, ","),
                ];
                let extra = extra_cells(&extra_columns, &r.extra);
                let derived = vec![
                    r.total_open().to_string(),
                    r.total_closed().to_string(),
                    r.total().to_string(),
                    ratio(m.efficiency),
                ];
                source.into_iter().chain(extra).chain(derived).collect::<Vec<_>>()
            })
            .collect();
        RawTable { headers, rows }
    }
}

/// One module's detail sheet.
impl CsvExport for ModuleAnalyzed {
    fn export_table(&self) -> RawTable {
        let r = &self.record;
        RawTable::new(
            vec![
                "Module", "Test Types", "P0 Open", "P0 Closed", "P1 Open", "P1 Closed",
                "Other Open", "Other Closed", "Bug Titles", "Test Cases",
            ],
            vec![vec![
                r.module.clone(),
                join(&r.test_types, ", "),
                r.open_p0.to_string(),
                r.closed_p0.to_string(),
                r.open_p1.to_string(),
                r.closed_p1.to_string(),
                r.open_other.to_string(),
                r.closed_other.to_string(),
                join(&r.bug_titles, ", "),
                join(&r.test_cases, ", "),
            ]],
        )
    }
}

impl CsvExport for [ManagerRollup] {
    fn export_table(&self) -> RawTable {
        RawTable::new(
            vec![
                "EM_Name",
                "Modules",
                "Team Size",
                "Mean Score",
                "Total Open Issues",
                "Total Closed Issues",
                "Efficiency",
            ],
            self.iter()
                .map(|m| {
                    vec![
                        m.manager.clone(),
                        modules(&m.modules),
                        m.team_size.to_string(),
                        score(m.mean_score),
                        m.total_open.to_string(),
                        m.total_closed.to_string(),
                        ratio(m.efficiency),
                    ]
                })
                .collect(),
        )
    }
}

impl CsvExport for [ContributorRollup] {
    fn export_table(&self) -> RawTable {
        RawTable::new(
            vec![
                "QA_Name", "EM_Name", "Modules", "Attributed Modules", "QA_Score", "QA_Feedback",
                "Date", "P0 Open", "P0 Closed", "P0 Efficiency", "Total Open Issues",
                "Total Closed Issues", "Total Efficiency",
            ],
            self.iter()
                .map(|c| {
                    vec![
                        c.name.clone(),
                        c.manager.clone(),
                        modules(&c.own_modules),
                        modules(&c.pool),
                        score(c.score),
                        c.feedback.clone(),
                        c.date.map(|d| d.to_string()).unwrap_or_default(),
                        c.open_p0.to_string(),
                        c.closed_p0.to_string(),
                        ratio(c.p0_efficiency),
                        c.total_open.to_string(),
                        c.total_closed.to_string(),
                        ratio(c.total_efficiency),
                    ]
                })
                .collect(),
        )
    }
}

impl CsvExport for [FeedbackRow] {
    fn export_table(&self) -> RawTable {
        let extra_columns = extra_columns(self.iter().map(|row| &row.record.extra));
        let headers = [
            "Module",
            "EM_Name",
            "QA_Name",
            "QA_Score",
            "QA_Feedback",
            "Total Open Issues",
            "Total Closed Issues",
            "Date",
        ]
        .iter()
        .map(|h| h.to_string())
        .chain(extra_columns.iter().cloned())
        .collect::<Vec<_>>();
        let rows = self
            .iter()
            .map(|row| {
                let r = &row.record;
                vec![
                    r.module.clone(),
                    r.manager.clone(),
                    r.name.clone(),
                    score(r.score),
                    r.feedback.clone(),
                    row.total_open.to_string(),
                    row.total_closed.to_string(),
                    r.date.map(|d| d.to_string()).unwrap_or_default(),
                ]
                .into_iter()
                .chain(extra_cells(&extra_columns, &r.extra))
                .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        RawTable::new(headers, rows)
    }
}

impl CsvExport for [LedgerStanding] {
    fn export_table(&self) -> RawTable {
        RawTable::new(
            vec!["Name", "Points"],
            self.iter()
                .map(|s| vec![s.name.clone(), s.points.to_string()])
                .collect(),
        )
    }
}

pub fn to_csv_bytes(table: &RawTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

pub fn write_csv(path: &Path, table: &RawTable) -> Result<()> {
    fs::write(path, to_csv_bytes(table)?)?;
    log::debug!("wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// `Builder - NLP` → `builder_-_nlp_details.csv`
pub fn module_file_name(module: &str) -> String {
    format!("{}_details.csv", module.to_lowercase().replace(' ', "_"))
}

pub fn export_all(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut tables = vec![
        ("qa_metrics.csv".to_string(), analysis.modules.export_table()),
        ("managers.csv".to_string(), analysis.managers.export_table()),
        ("contributors.csv".to_string(), analysis.contributors.export_table()),
        ("detailed_feedback.csv".to_string(), analysis.feedback.export_table()),
    ];
    for module in &analysis.modules {
        tables.push((module_file_name(&module.record.module), module.export_table()));
    }
    let points = &analysis.rankings;
    if !points.contributor_points.is_empty() {
        tables.push((
            "contributor_points.csv".to_string(),
            points.contributor_points.export_table(),
        ));
    }
    if !points.manager_points.is_empty() {
        tables.push(("manager_points.csv".to_string(), points.manager_points.export_table()));
    }

    let mut written = vec![];
    for (file_name, table) in tables {
        let path = dir.join(file_name);
        write_csv(&path, &table)?;
        written.push(path);
    }
    Ok(written)
}
