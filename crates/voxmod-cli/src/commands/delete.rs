use std::io::Write;

use voxmod_client::{
    AccountClient, BulkDeleter, BulkOutcome, ClientResult, ConfirmSource, DeleteSelection,
};

use crate::config::AppConfig;
use crate::progress::BarReporter;

/// Reads confirmation answers from stdin.
pub(crate) struct StdinConfirm;

impl ConfirmSource for StdinConfirm {
    fn ask(&mut self, prompt: &str) -> ClientResult<String> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line)
    }
}

/// Delete the given models, or the whole account for the "all" sentinel.
pub fn run(ids: &[String], config: &AppConfig) -> anyhow::Result<()> {
    let creds = config.credentials()?;
    let account = AccountClient::new(&creds)?.with_poll_config(config.probe_poll());
    let reporter = BarReporter::new();
    let deleter = BulkDeleter::new(&account, &reporter);

    let mut confirm = StdinConfirm;
    let outcome = deleter.delete_set(DeleteSelection::from_args(ids), &mut confirm)?;
    render(&outcome);
    Ok(())
}

pub(crate) fn render(outcome: &BulkOutcome) {
    match outcome {
        BulkOutcome::Cancelled => println!("No models were deleted. Action cancelled."),
        BulkOutcome::Unrecognized => println!("Could not understand response. Nothing was deleted."),
        BulkOutcome::NothingToDelete => println!("No models to delete."),
        BulkOutcome::Completed { deleted, failed: 0 } => println!("Deleted {deleted} model(s)."),
        BulkOutcome::Completed { deleted, failed } => println!(
            "Deleted {deleted} model(s); {failed} deletion(s) were rejected by the service."
        ),
        BulkOutcome::Aborted { deleted, failed_id } => println!(
            "Stopped after {deleted} deletion(s): the service rejected the delete for '{failed_id}'."
        ),
    }
}
