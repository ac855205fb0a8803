mod analyze;
mod model;
mod rank;
mod report;
mod source;
mod utils;

use crate::analyze::bugs::BugStatus;
use crate::analyze::{AnalysisOptions, Analyzer, AttributionStrategy, DataAnalysis, Selection};
use crate::model::contributor::KUDO_SCHEMA;
use crate::model::issue::ISSUE_SCHEMA;
use crate::model::{
    ContributorRecord, IssueRecord, LedgerKind, PointEvent, RawTable, Result, Schema,
    TestCaseMapping,
};
use crate::report::{export_all, MarkdownReport};
use crate::source::{Loaded, SheetsClient, Source, SourceError};
use crate::utils::MultiProgressNew;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use std::fs;
use std::path::Path;

#[derive(Parser, Debug, Clone)]
#[command(about = "QA metrics and kudo reports from CSV files or Google Sheets")]
struct Args {
    #[arg(long = "qa", default_value = "qa_data_template.csv")]
    qa_path: String,
    #[arg(long = "kudo", default_value = "kudo_data.csv")]
    kudo_path: String,
    /// Read the tables named by `--qa_range`/`--kudo_range` from this spreadsheet.
    #[arg(long = "sheet_id")]
    sheet_id: Option<String>,
    #[arg(long = "qa_range", requires = "sheet_id")]
    qa_range: Option<String>,
    #[arg(long = "kudo_range", requires = "sheet_id")]
    kudo_range: Option<String>,
    #[arg(long = "sheets_token", env = "SHEETS_TOKEN", hide_env_values = true)]
    sheets_token: Option<String>,
    #[arg(long = "sheets_api_key", env = "SHEETS_API_KEY", hide_env_values = true)]
    sheets_api_key: Option<String>,
    #[arg(long = "contributor_points")]
    contributor_points_path: Option<String>,
    #[arg(long = "manager_points")]
    manager_points_path: Option<String>,
    /// JSON file mapping module → tier → test case ids.
    #[arg(long = "test_cases")]
    test_cases_path: Option<String>,
    #[arg(long = "out", default_value = "report")]
    out_dir: String,
    #[arg(long = "strategy", value_enum, default_value_t = AttributionStrategy::default())]
    strategy: AttributionStrategy,
    #[arg(long = "module")]
    modules: Vec<String>,
    #[arg(long = "manager")]
    managers: Vec<String>,
    #[arg(long = "test_type")]
    test_types: Vec<String>,
    #[arg(long = "bug_status", value_enum)]
    bug_status: Option<BugStatus>,
    #[arg(long = "top", default_value_t = 3)]
    top_n: usize,
}

impl Args {
    fn table_source(&self, path: &str, range: &Option<String>) -> Source {
        match (&self.sheet_id, range) {
            (Some(spreadsheet_id), Some(range)) => Source::Sheet {
                spreadsheet_id: spreadsheet_id.clone(),
                range: range.clone(),
            },
            _ => Source::Csv {
                path: path.to_string(),
            },
        }
    }

    fn options(&self) -> AnalysisOptions {
        let filter = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());
        AnalysisOptions {
            selection: Selection {
                modules: filter(&self.modules),
                managers: filter(&self.managers),
                test_types: filter(&self.test_types),
            },
            strategy: self.strategy,
            bug_status: self.bug_status,
            top_n: self.top_n,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(error) = run(&args).await {
        log::error!("{error}");
        eprintln!("❌ {error}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let Some(data_analysis) = load_data(args).await? else {
        return Ok(());
    };

    let options = args.options();
    log::info!("attributing contributor issues {:?}", options.strategy);
    let analysis = data_analysis.analyze(&options);

    let out_dir = Path::new(&args.out_dir);
    fs::create_dir_all(out_dir)?;
    let mut written = analysis.report_create(out_dir)?;
    written.extend(export_all(&analysis, out_dir)?);
    for path in &written {
        log::info!("wrote {}", path.display());
    }
    println!(
        "✅ Completed report for {} modules and {} kudos ({} files in `{}`)",
        analysis.modules.len(),
        analysis.feedback.len(),
        written.len(),
        args.out_dir
    );
    Ok(())
}

/// Reads every source concurrently. `None` when a required table has no data.
async fn load_data(args: &Args) -> Result<Option<DataAnalysis>> {
    let client = SheetsClient::new(args.sheets_token.clone(), args.sheets_api_key.clone());
    let multi_progress = MultiProgress::new();

    let qa_source = args.table_source(&args.qa_path, &args.qa_range);
    let kudo_source = args.table_source(&args.kudo_path, &args.kudo_range);
    let contributor_points = args
        .contributor_points_path
        .as_ref()
        .map(|path| Source::Csv { path: path.clone() });
    let manager_points = args
        .manager_points_path
        .as_ref()
        .map(|path| Source::Csv { path: path.clone() });

    let (issues, kudos, contributor_points, manager_points) = futures::join!(
        load_table(&qa_source, &ISSUE_SCHEMA, &client, &multi_progress),
        load_table(&kudo_source, &KUDO_SCHEMA, &client, &multi_progress),
        load_optional(
            contributor_points.as_ref(),
            LedgerKind::Contributor,
            &client,
            &multi_progress
        ),
        load_optional(
            manager_points.as_ref(),
            LedgerKind::Manager,
            &client,
            &multi_progress
        ),
    );

    let (Loaded::Table(issues), Loaded::Table(kudos)) = (issues?, kudos?) else {
        println!("No data found. Nothing to report.");
        return Ok(None);
    };
    let contributor_points = contributor_points?
        .map(|table| PointEvent::from_table(&table, LedgerKind::Contributor))
        .unwrap_or_default();
    let manager_points = manager_points?
        .map(|table| PointEvent::from_table(&table, LedgerKind::Manager))
        .unwrap_or_default();
    let test_cases = match &args.test_cases_path {
        Some(path) => TestCaseMapping::from_config(path)?,
        None => TestCaseMapping::default(),
    };

    let data_analysis = DataAnalysis::new(
        IssueRecord::from_table(&issues),
        ContributorRecord::from_table(&kudos),
    )
    .with_points(contributor_points, manager_points)
    .with_test_cases(test_cases);
    Ok(Some(data_analysis))
}

async fn load_table(
    source: &Source,
    schema: &Schema,
    client: &SheetsClient,
    multi_progress: &MultiProgress,
) -> std::result::Result<Loaded, SourceError> {
    let pb = multi_progress.add_spinner(format!("Read {} from `{}` ...", schema.name, source));
    let loaded = source.load(schema, client).await;
    finish(&pb, source, &loaded);
    loaded
}

async fn load_optional(
    source: Option<&Source>,
    kind: LedgerKind,
    client: &SheetsClient,
    multi_progress: &MultiProgress,
) -> std::result::Result<Option<RawTable>, SourceError> {
    let Some(source) = source else {
        return Ok(None);
    };
    match load_table(source, kind.schema(), client, multi_progress).await? {
        Loaded::Table(table) => Ok(Some(table)),
        Loaded::NoData => Ok(None),
    }
}

fn finish(pb: &ProgressBar, source: &Source, loaded: &std::result::Result<Loaded, SourceError>) {
    pb.finish_with_message(match loaded {
        Ok(Loaded::Table(table)) => {
            format!("✅ Completed reading `{}` (find {} rows)", source, table.rows.len())
        }
        Ok(Loaded::NoData) => format!("⚠️ No data in `{source}`"),
        Err(_) => format!("❌ Failed reading `{source}`"),
    });
}
