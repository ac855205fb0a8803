use crate::analyze::bugs::priority_summary;
use crate::analyze::{
    Analysis, ContributorRollup, FeedbackRow, ManagerRollup, ModuleAnalyzed, QaOverview,
    ScoreSummary,
};
use crate::model::{Priority, Result};
use crate::rank::LedgerStanding;
use indexmap::IndexMap;
use itertools::Itertools;
use markdown_builder::Markdown;
use markdown_table::{Heading, HeadingAlignment, MarkdownTable};
use std::fs;
use std::path::{Path, PathBuf};

pub const QA_REPORT: &str = "qa_report.md";
pub const KUDO_REPORT: &str = "kudo_report.md";

pub trait MarkdownReport {
    fn qa_report(&self) -> Result<String>;
    fn kudo_report(&self) -> Result<String>;
    fn report_create(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

impl MarkdownReport for Analysis {
    fn qa_report(&self) -> Result<String> {
        let mut doc = Markdown::new();
        doc.header1("QA Metrics");
        doc.add_overview(&self.overview);
        doc.add_module_distribution(&self.modules)?;
        doc.add_priority_analysis(&self.modules)?;
        doc.add_test_types(&self.test_types)?;
        for module in &self.modules {
            doc.add_bug_details(module)?;
        }
        doc.add_key_insights(self)?;
        Ok(doc.render())
    }

    fn kudo_report(&self) -> Result<String> {
        let mut doc = Markdown::new();
        doc.header1("QA Kudos");
        doc.add_score_distribution("Module", &self.scores_by_module)?;
        doc.add_score_distribution("Engineering Manager", &self.scores_by_manager)?;
        doc.add_top_performers(&self.rankings.top_performers);
        doc.add_managers(&self.managers)?;
        doc.add_contributors(&self.contributors)?;
        doc.add_feedback(&self.feedback)?;
        doc.add_standings("Points: QA Engineers", &self.rankings.contributor_points)?;
        doc.add_standings("Points: Engineering Managers", &self.rankings.manager_points)?;
        Ok(doc.render())
    }

    fn report_create(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = vec![];
        let reports = [
            (QA_REPORT, self.qa_report()?),
            (KUDO_REPORT, self.kudo_report()?),
        ];
        for (file_name, content) in reports {
            let path = dir.join(file_name);
            fs::write(&path, content)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn table(headings: &[&str], rows: Vec<Vec<String>>) -> Result<String> {
    if rows.is_empty() {
        return Ok("_No data._".to_string());
    }
    let header = headings
        .iter()
        .enumerate()
        .map(|(index, h)| {
            let alignment = (index > 0).then_some(HeadingAlignment::Center);
            Heading::new(h.to_string(), alignment)
        })
        .collect::<Vec<_>>();
    let mut md_table = MarkdownTable::new(rows);
    md_table.with_headings(header);
    let Ok(markdown) = md_table.as_markdown() else {
        return Err(format!("cannot render table `{}`", headings.join(", ")).into());
    };
    Ok(markdown)
}

trait MarkdownExt {
    fn add_overview(&mut self, overview: &QaOverview);
    fn add_module_distribution(&mut self, modules: &[ModuleAnalyzed]) -> Result<()>;
    fn add_priority_analysis(&mut self, modules: &[ModuleAnalyzed]) -> Result<()>;
    fn add_test_types(&mut self, test_types: &IndexMap<String, usize>) -> Result<()>;
    fn add_bug_details(&mut self, module: &ModuleAnalyzed) -> Result<()>;
    fn add_key_insights(&mut self, analysis: &Analysis) -> Result<()>;
    fn add_score_distribution(&mut self, group: &str, scores: &[ScoreSummary]) -> Result<()>;
    fn add_top_performers(&mut self, performers: &[ContributorRollup]);
    fn add_managers(&mut self, managers: &[ManagerRollup]) -> Result<()>;
    fn add_contributors(&mut self, contributors: &[ContributorRollup]) -> Result<()>;
    fn add_feedback(&mut self, feedback: &[FeedbackRow]) -> Result<()>;
    fn add_standings(&mut self, title: &str, standings: &[LedgerStanding]) -> Result<()>;
}

impl MarkdownExt for Markdown {
    fn add_overview(&mut self, overview: &QaOverview) {
        self.paragraph(format!(
            "**Total Open Issues:** {} · **Total Closed Issues:** {} · \
             **Issue Resolution Rate:** {}",
            overview.total_open,
            overview.total_closed,
            percent(overview.resolution_rate),
        ));
    }

    fn add_module_distribution(&mut self, modules: &[ModuleAnalyzed]) -> Result<()> {
        self.header2("Module-wise Issue Distribution".to_string());
        let rows = modules
            .iter()
            .map(|m| {
                vec![
                    cell(&m.record.module),
                    m.record.total_open().to_string(),
                    m.record.total_closed().to_string(),
                    m.record.total().to_string(),
                    percent(m.efficiency),
                ]
            })
            .collect();
        self.paragraph(table(&["Module", "Open", "Closed", "Total", "Resolution Rate"], rows)?);
        Ok(())
    }

    fn add_priority_analysis(&mut self, modules: &[ModuleAnalyzed]) -> Result<()> {
        self.header2("Priority Analysis".to_string());
        let rows = modules
            .iter()
            .map(|m| {
                let tiers = [
                    (Priority::P0, m.p0_efficiency),
                    (Priority::P1, m.p1_efficiency),
                    (Priority::Other, m.other_efficiency),
                ];
                let mut row = vec![cell(&m.record.module)];
                for (priority, efficiency) in tiers {
                    row.push(format!(
                        "{} open / {} closed ({})",
                        m.record.open(priority),
                        m.record.closed(priority),
                        percent(efficiency)
                    ));
                }
                row
            })
            .collect();
        self.paragraph(table(&["Module", "P0", "P1", "Other"], rows)?);
        Ok(())
    }

    fn add_test_types(&mut self, test_types: &IndexMap<String, usize>) -> Result<()> {
        self.header2("Test Types".to_string());
        let total = test_types.values().sum::<usize>();
        let rows = test_types
            .iter()
            .map(|(test_type, count)| {
                let share = if total == 0 { 0.0 } else { *count as f64 / total as f64 };
                vec![cell(test_type), count.to_string(), percent(share)]
            })
            .collect();
        self.paragraph(table(&["Test Type", "Modules", "Share"], rows)?);
        Ok(())
    }

    fn add_bug_details(&mut self, module: &ModuleAnalyzed) -> Result<()> {
        let record = &module.record;
        self.header2(format!(
            "{} - {} Open, {} Closed Issues",
            record.module,
            record.total_open(),
            record.total_closed()
        ));
        self.paragraph(format!("**Test Types:** {}", cell(&record.test_types.join(", "))));

        let rows = module
            .attribution
            .iter()
            .map(|bug| vec![bug.priority.to_string(), cell(&bug.title), bug.status.to_string()])
            .collect();
        self.paragraph(table(&["Priority", "Bug Title", "Status"], rows)?);

        let none = |cases: &[String]| {
            if cases.is_empty() {
                "None".to_string()
            } else {
                cell(&cases.join(", "))
            }
        };
        let rows = module
            .bugs
            .iter()
            .map(|bug| {
                vec![
                    cell(&bug.title),
                    bug.status.to_string(),
                    bug.priority.to_string(),
                    none(&bug.cases.p0),
                    none(&bug.cases.p1),
                    none(&bug.cases.other),
                ]
            })
            .collect();
        self.paragraph(table(
            &[
                "Bug Title",
                "Status",
                "Priority",
                "P0 Test Cases",
                "P1 Test Cases",
                "Other Test Cases",
            ],
            rows,
        )?);
        if !module.bugs.is_empty() {
            let summary = priority_summary(&module.bugs)
                .iter()
                .map(|(priority, count)| format!("{priority}: {count}"))
                .join(", ");
            self.paragraph(format!("**Summary:** {summary}"));
        }
        Ok(())
    }

    fn add_key_insights(&mut self, analysis: &Analysis) -> Result<()> {
        self.header2("Key Insights".to_string());
        let rankings = &analysis.rankings;

        self.paragraph("**Top Modules by Open Issues**".to_string());
        let rows = rankings
            .top_open
            .iter()
            .map(|m| vec![cell(&m.record.module), m.record.total_open().to_string()])
            .collect();
        self.paragraph(table(&["Module", "Total Open Issues"], rows)?);

        self.paragraph("**Top Modules by Resolution Rate**".to_string());
        let rows = rankings
            .top_resolution
            .iter()
            .map(|m| vec![cell(&m.record.module), percent(m.efficiency)])
            .collect();
        self.paragraph(table(&["Module", "Resolution Rate"], rows)?);

        self.paragraph("**Critical Issues (P0)**".to_string());
        let rows = rankings
            .critical
            .iter()
            .map(|m| vec![cell(&m.record.module), m.record.open_p0.to_string()])
            .collect();
        self.paragraph(table(&["Module", "P0 issues Open"], rows)?);
        Ok(())
    }

    fn add_score_distribution(&mut self, group: &str, scores: &[ScoreSummary]) -> Result<()> {
        self.header2(format!("QA Scores by {group}"));
        let rows = scores
            .iter()
            .map(|s| {
                vec![
                    cell(&s.group),
                    s.count.to_string(),
                    format!("{:.1}", s.min),
                    format!("{:.1}", s.mean),
                    format!("{:.1}", s.max),
                ]
            })
            .collect();
        self.paragraph(table(&[group, "Kudos", "Min", "Mean", "Max"], rows)?);
        Ok(())
    }

    fn add_top_performers(&mut self, performers: &[ContributorRollup]) {
        self.header2("Top Performers".to_string());
        if performers.is_empty() {
            self.paragraph("_No data._".to_string());
        }
        for (place, c) in performers.iter().enumerate() {
            self.paragraph(format!(
                "**{}. {}** - {}  \n**Score:** {:.1}/100  \n**Feedback:** {}  \n**EM:** {}  \n\
                 **Bug Metrics:** {} open, {} closed, P0 efficiency {}",
                place + 1,
                c.name,
                c.own_modules.iter().join(", "),
                c.score,
                c.feedback,
                c.manager,
                c.total_open,
                c.total_closed,
                percent(c.p0_efficiency),
            ));
        }
    }

    fn add_managers(&mut self, managers: &[ManagerRollup]) -> Result<()> {
        self.header2("Engineering Managers".to_string());
        let rows = managers
            .iter()
            .map(|m| {
                vec![
                    cell(&m.manager),
                    cell(&m.modules.iter().join(", ")),
                    m.team_size.to_string(),
                    format!("{:.1}", m.mean_score),
                    m.total_open.to_string(),
                    m.total_closed.to_string(),
                    percent(m.efficiency),
                ]
            })
            .collect();
        self.paragraph(table(
            &["EM", "Modules", "Team", "Mean Score", "Open", "Closed", "Efficiency"],
            rows,
        )?);
        Ok(())
    }

    fn add_contributors(&mut self, contributors: &[ContributorRollup]) -> Result<()> {
        self.header2("QA Engineers".to_string());
        let rows = contributors
            .iter()
            .map(|c| {
                vec![
                    cell(&c.name),
                    cell(&c.manager),
                    format!("{:.1}", c.score),
                    c.total_open.to_string(),
                    c.total_closed.to_string(),
                    percent(c.p0_efficiency),
                    percent(c.total_efficiency),
                ]
            })
            .collect();
        self.paragraph(table(
            &["QA", "EM", "Score", "Open", "Closed", "P0 Efficiency", "Efficiency"],
            rows,
        )?);
        Ok(())
    }

    fn add_feedback(&mut self, feedback: &[FeedbackRow]) -> Result<()> {
        self.header2("Detailed Feedback".to_string());
        let rows = feedback
            .iter()
            .map(|row| {
                let r = &row.record;
                vec![
                    cell(&r.module),
                    cell(&r.manager),
                    cell(&r.name),
                    format!("{:.1}", r.score),
                    cell(&r.feedback),
                    row.total_open.to_string(),
                    row.total_closed.to_string(),
                    r.date.map(|d| d.format("%d.%m.%Y").to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        self.paragraph(table(
            &["Module", "EM", "QA", "Score", "Feedback", "Open", "Closed", "Date"],
            rows,
        )?);
        Ok(())
    }

    fn add_standings(&mut self, title: &str, standings: &[LedgerStanding]) -> Result<()> {
        if standings.is_empty() {
            return Ok(());
        }
        self.header2(title.to_string());
        let rows = standings
            .iter()
            .enumerate()
            .map(|(place, s)| vec![(place + 1).to_string(), cell(&s.name), s.points.to_string()])
            .collect();
        self.paragraph(table(&["#", "Name", "Points"], rows)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{AnalysisOptions, Analyzer, DataAnalysis};
    use crate::model::{ContributorRecord, IssueRecord, PointEvent};

    fn analysis() -> Analysis {
        let inbox = IssueRecord {
            module: "Inbox".to_string(),
            open_p0: 2,
            closed_p0: 1,
            open_p1: 1,
            closed_other: 1,
            test_types: vec!["Smoke".into()],
            bug_titles: vec!["A".into(), "B|pipe".into(), "C fixed".into()],
            ..IssueRecord::default()
        };
        let kudo = ContributorRecord {
            name: "Ana".into(),
            module: "Inbox".into(),
            manager: "Sam".into(),
            score: 88.0,
            feedback: "Great catch".into(),
            ..ContributorRecord::default()
        };
        DataAnalysis::new(vec![inbox], vec![kudo])
            .with_points(vec![PointEvent::new("Ana", 7.0)], vec![])
            .analyze(&AnalysisOptions::default())
    }

    #[test]
    fn qa_report_lists_sections() {
        let report = analysis().qa_report().unwrap();
        assert!(report.contains("QA Metrics"));
        assert!(report.contains("Issue Resolution Rate:** 40.0%"));
        assert!(report.contains("Inbox - 3 Open, 2 Closed Issues"));
        assert!(report.contains("Key Insights"));
        assert!(report.contains("**Summary:** P0: 0, P1: 0, Other: 3"));
    }

    #[test]
    fn kudo_report_omits_empty_ledgers() {
        let report = analysis().kudo_report().unwrap();
        assert!(report.contains("**1. Ana** - Inbox"));
        assert!(report.contains("Points: QA Engineers"));
        assert!(!report.contains("Points: Engineering Managers"));
    }

    #[test]
    fn empty_tables_render_placeholder() {
        assert_eq!(table(&["Module"], vec![]).unwrap(), "_No data._");
    }

    #[test]
    fn reports_are_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let written = analysis().report_create(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join(QA_REPORT).exists());
        assert!(dir.path().join(KUDO_REPORT).exists());
    }
}
