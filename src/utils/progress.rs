use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const ONLY_MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";

pub struct ProgressStyleTemplate;

impl ProgressStyleTemplate {
    pub fn only_message() -> ProgressStyle {
        ProgressStyle::with_template(ONLY_MESSAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

pub trait MultiProgressNew {
    fn add_spinner(&self, message: String) -> ProgressBar;
}

impl MultiProgressNew for MultiProgress {
    fn add_spinner(&self, message: String) -> ProgressBar {
        let pb = self.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyleTemplate::only_message());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
