use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};

use voxmod_client::ProgressReporter;

/// Progress bar template for bulk deletions.
const PB_TEMPLATE: &str = "{msg}\n[{bar:40.cyan/blue}] {pos}/{len}  [{elapsed_precise}]";

/// indicatif-backed reporter for bulk operations.
///
/// The bar is cleared once the batch ends rather than left on screen.
pub struct BarReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl BarReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }
}

impl ProgressReporter for BarReporter {
    fn on_batch_start(&self, total: usize, label: &str) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(PB_TEMPLATE)
                .unwrap()
                .progress_chars("##-"),
        );
        pb.set_message(label.to_string());
        *self.bar.borrow_mut() = Some(pb);
    }

    fn on_item_done(&self) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.inc(1);
        }
    }

    fn on_batch_end(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}
