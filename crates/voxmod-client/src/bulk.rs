//! Bulk deletion across one or many models.
//!
//! Deletions run strictly sequentially. The explicit-id path stops at the
//! first rejected deletion so a systemic failure (bad credentials, wrong
//! URL) does not cascade across the whole batch; the account-wide path
//! continues past individual rejections and tallies them instead.

use tracing::{info, warn};

use crate::account::AccountClient;
use crate::error::ClientResult;

/// How the caller selects models for bulk deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteSelection {
    /// Every model on the account, behind a confirmation gate.
    All,
    /// An explicit list of customization ids.
    Ids(Vec<String>),
}

impl DeleteSelection {
    /// A single `"all"` argument is the account-wide sentinel; anything
    /// else is a literal id list.
    pub fn from_args(ids: &[String]) -> Self {
        if ids.len() == 1 && ids[0] == "all" {
            Self::All
        } else {
            Self::Ids(ids.to_vec())
        }
    }
}

/// Per-item progress callbacks for long batches. Purely cosmetic; outcomes
/// are carried by [`BulkOutcome`].
pub trait ProgressReporter {
    fn on_batch_start(&self, total: usize, label: &str);
    fn on_item_done(&self);
    fn on_batch_end(&self);
}

/// Reporter that does nothing.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn on_batch_start(&self, _total: usize, _label: &str) {}
    fn on_item_done(&self) {}
    fn on_batch_end(&self) {}
}

/// Supplies answers to destructive-action confirmations.
pub trait ConfirmSource {
    fn ask(&mut self, prompt: &str) -> ClientResult<String>;
}

enum Answer {
    Yes,
    No,
    Unclear,
}

fn parse_answer(raw: &str) -> Answer {
    match raw.trim().to_lowercase().as_str() {
        "y" | "yes" => Answer::Yes,
        "n" | "no" => Answer::No,
        _ => Answer::Unclear,
    }
}

/// Outcome of one bulk delete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// The user answered "no" at the confirmation gate.
    Cancelled,
    /// The confirmation input was not recognised; nothing was deleted.
    Unrecognized,
    /// The account has no models.
    NothingToDelete,
    Completed { deleted: usize, failed: usize },
    /// Explicit-id fail-fast: the batch stopped when `failed_id` was rejected.
    Aborted { deleted: usize, failed_id: String },
}

/// Sequences delete operations across one or many models.
pub struct BulkDeleter<'a> {
    account: &'a AccountClient,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> BulkDeleter<'a> {
    pub fn new(account: &'a AccountClient, reporter: &'a dyn ProgressReporter) -> Self {
        Self { account, reporter }
    }

    pub fn delete_set(
        &self,
        selection: DeleteSelection,
        confirm: &mut dyn ConfirmSource,
    ) -> ClientResult<BulkOutcome> {
        match selection {
            DeleteSelection::All => self.delete_all(confirm),
            DeleteSelection::Ids(ids) => self.delete_ids(&ids),
        }
    }

    fn delete_all(&self, confirm: &mut dyn ConfirmSource) -> ClientResult<BulkOutcome> {
        let raw =
            confirm.ask("Are you sure you want to delete all of the trained models? (y/N): ")?;
        match parse_answer(&raw) {
            Answer::No => {
                info!("No models were deleted; action cancelled");
                Ok(BulkOutcome::Cancelled)
            }
            Answer::Unclear => {
                warn!("Could not understand the response; nothing was deleted");
                Ok(BulkOutcome::Unrecognized)
            }
            Answer::Yes => {
                let models = self.account.list_models()?;
                if models.is_empty() {
                    info!("No models to delete");
                    return Ok(BulkOutcome::NothingToDelete);
                }

                self.reporter.on_batch_start(models.len(), "Deleting all models");
                let mut deleted = 0;
                let mut failed = 0;
                for model in &models {
                    if self.account.delete_model(&model.customization_id)? {
                        deleted += 1;
                    } else {
                        failed += 1;
                    }
                    self.reporter.on_item_done();
                }
                self.reporter.on_batch_end();
                Ok(BulkOutcome::Completed { deleted, failed })
            }
        }
    }

    fn delete_ids(&self, ids: &[String]) -> ClientResult<BulkOutcome> {
        self.reporter
            .on_batch_start(ids.len(), "Deleting customization models");
        let mut deleted = 0;
        for id in ids {
            if !self.account.delete_model(id)? {
                self.reporter.on_batch_end();
                return Ok(BulkOutcome::Aborted {
                    deleted,
                    failed_id: id.clone(),
                });
            }
            deleted += 1;
            self.reporter.on_item_done();
        }
        self.reporter.on_batch_end();
        Ok(BulkOutcome::Completed { deleted, failed: 0 })
    }
}
