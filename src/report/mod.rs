pub mod csv_export;
pub mod markdown;

pub use csv_export::export_all;
pub use markdown::MarkdownReport;
