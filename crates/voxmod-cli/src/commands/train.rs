use std::path::Path;

use voxmod_client::{Credentials, ModelHandle, PollConfig, TrainingOutcome};

use crate::config::AppConfig;

/// Create a model, attach the corpus, and drive training to completion.
pub fn run(
    name: &str,
    descr: &str,
    corpus: &Path,
    base_model: &str,
    timeout_secs: Option<u64>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let creds = config.credentials()?;
    execute(&creds, config.train_poll(timeout_secs), name, descr, corpus, base_model)
}

/// Shared by the `train` subcommand and the interactive runner.
pub(crate) fn execute(
    creds: &Credentials,
    poll: PollConfig,
    name: &str,
    descr: &str,
    corpus: &Path,
    base_model: &str,
) -> anyhow::Result<()> {
    let mut model = ModelHandle::new(creds)?.with_poll_config(poll);

    let id = model.create(name, descr, Some(base_model))?;
    println!("Model created with id: {id}");

    let corpus_name = model.add_corpus(corpus)?;
    println!("Corpus '{corpus_name}' successfully added");

    match model.train()? {
        TrainingOutcome::CorpusRequired => {
            println!("The model has no corpus yet; add one before training.");
        }
        TrainingOutcome::Completed(ack) => {
            println!("Training has finished.");
            if !ack.is_null() {
                println!("{}", serde_json::to_string_pretty(&ack)?);
            }
        }
    }
    Ok(())
}
