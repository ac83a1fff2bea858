//! Prompt-driven session: gather credentials, then run any combination of
//! train / evaluate / list / delete against the account.
//!
//! Reaching end-of-input at any prompt cancels the current sequence cleanly
//! ("Action cancelled."), without a stack trace. Nothing in flight on the
//! service is rolled back by a cancel.

use std::io::{self, BufRead, Write};

use voxmod_client::{
    AccountClient, BulkDeleter, ClientError, ClientResult, ConfirmSource, Credentials,
    DeleteSelection, ModelHandle, ModelRecord,
};

use crate::commands::{delete, evaluate, train};
use crate::config::{save_credentials, AppConfig};
use crate::progress::BarReporter;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    match session(&mut input, config) {
        Ok(()) => Ok(()),
        Err(SessionEnd::Cancelled) => {
            println!("Action cancelled.");
            Ok(())
        }
        Err(SessionEnd::Failed(err)) => Err(err),
    }
}

/// Why a session stopped early.
enum SessionEnd {
    /// End-of-input at a prompt; the user backed out.
    Cancelled,
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for SessionEnd {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(err)
    }
}

impl From<ClientError> for SessionEnd {
    fn from(err: ClientError) -> Self {
        Self::Failed(err.into())
    }
}

impl From<io::Error> for SessionEnd {
    fn from(err: io::Error) -> Self {
        Self::Failed(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Train,
    Evaluate,
    List,
    Delete,
}

fn session(input: &mut impl BufRead, config: &AppConfig) -> Result<(), SessionEnd> {
    let creds = gather_credentials(input, config)?;
    let actions = pick_actions(input)?;
    for action in actions {
        match action {
            Action::Train => train_flow(input, &creds, config)?,
            Action::Evaluate => evaluate_flow(input, &creds)?,
            Action::List => list_flow(&creds)?,
            Action::Delete => delete_flow(input, &creds, config)?,
        }
    }
    Ok(())
}

/// Ask for the URL and API key. Blank keeps the configured value; a typed
/// value is saved back to the user config file for future runs.
fn gather_credentials(
    input: &mut impl BufRead,
    config: &AppConfig,
) -> Result<Credentials, SessionEnd> {
    let typed_url = prompt(input, "Service URL (blank keeps the configured value): ")?;
    let url = if typed_url.is_empty() {
        if config.service.url.is_empty() {
            return Err(SessionEnd::Failed(anyhow::anyhow!(
                "no service URL configured and none entered"
            )));
        }
        println!("Using the configured URL.");
        config.service.url.clone()
    } else {
        typed_url.clone()
    };

    let typed_key = prompt(input, "API key (blank keeps the configured value): ")?;
    let api_key = if typed_key.is_empty() {
        if config.service.api_key.is_empty() {
            return Err(SessionEnd::Failed(anyhow::anyhow!(
                "no API key configured and none entered"
            )));
        }
        println!("Using the configured API key.");
        config.service.api_key.clone()
    } else {
        typed_key.clone()
    };

    if !typed_url.is_empty() || !typed_key.is_empty() {
        let path = save_credentials(&url, &api_key)?;
        println!("Credentials saved to {}", path.display());
    }

    Ok(Credentials::new(&url, &api_key))
}

fn pick_actions(input: &mut impl BufRead) -> Result<Vec<Action>, SessionEnd> {
    println!("\nSelect one or more actions (comma-separated):");
    println!("  1) Train a new model");
    println!("  2) Evaluate a model against an audio file");
    println!("  3) See available models");
    println!("  4) Delete models");
    loop {
        let raw = prompt(input, "> ")?;
        if let Some(actions) = parse_actions(&raw) {
            return Ok(actions);
        }
        println!("Choose at least one of 1-4.");
    }
}

fn parse_actions(raw: &str) -> Option<Vec<Action>> {
    let mut actions = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let action = match part {
            "1" => Action::Train,
            "2" => Action::Evaluate,
            "3" => Action::List,
            "4" => Action::Delete,
            _ => return None,
        };
        if !actions.contains(&action) {
            actions.push(action);
        }
    }
    if actions.is_empty() {
        None
    } else {
        Some(actions)
    }
}

fn train_flow(
    input: &mut impl BufRead,
    creds: &Credentials,
    config: &AppConfig,
) -> Result<(), SessionEnd> {
    let name = prompt(input, "Provide a name for your model: ")?;
    let descr = prompt(input, "Provide a brief description for your model: ")?;
    let corpus = prompt(input, "Provide the file path for the training corpus: ")?;
    train::execute(
        creds,
        config.train_poll(None),
        &name,
        &descr,
        corpus.as_ref(),
        voxmod_client::DEFAULT_BASE_MODEL,
    )?;
    Ok(())
}

fn evaluate_flow(input: &mut impl BufRead, creds: &Credentials) -> Result<(), SessionEnd> {
    let audio = prompt(input, "Provide a file path for the audio file: ")?;

    let account = AccountClient::new(creds)?;
    let models = account.list_models_newest_first()?;
    if models.is_empty() {
        println!("The account has no models to evaluate.");
        return Ok(());
    }

    let ids = pick_models(input, &models, "evaluate")?;
    for id in ids {
        let handle = ModelHandle::bound(creds, id.clone())?;
        let transcription = handle.transcribe(audio.as_ref())?;
        evaluate::print_transcription(&id, &transcription);
    }
    Ok(())
}

fn list_flow(creds: &Credentials) -> Result<(), SessionEnd> {
    let account = AccountClient::new(creds)?;
    let models = account.list_models()?;
    if models.is_empty() {
        println!("No customization models on this account.");
        return Ok(());
    }
    for model in &models {
        println!(
            "{} -- {} -- {} -- created {}",
            model.customization_id, model.name, model.description, model.created
        );
    }
    Ok(())
}

fn delete_flow(
    input: &mut impl BufRead,
    creds: &Credentials,
    config: &AppConfig,
) -> Result<(), SessionEnd> {
    let account = AccountClient::new(creds)?.with_poll_config(config.probe_poll());
    let reporter = BarReporter::new();
    let deleter = BulkDeleter::new(&account, &reporter);

    let answer = prompt(input, "Do you want to delete all models? (y/N): ")?;
    let selection = match answer.to_lowercase().as_str() {
        "y" | "yes" => DeleteSelection::All,
        "n" | "no" => {
            let models = account.list_models_newest_first()?;
            if models.is_empty() {
                println!("No models to delete.");
                return Ok(());
            }
            DeleteSelection::Ids(pick_models(input, &models, "delete")?)
        }
        _ => {
            println!("Could not understand response.");
            return Ok(());
        }
    };

    let mut confirm = ReaderConfirm { input };
    let outcome = deleter.delete_set(selection, &mut confirm)?;
    delete::render(&outcome);
    Ok(())
}

/// Numbered picker over the (newest-first) model list.
fn pick_models(
    input: &mut impl BufRead,
    models: &[ModelRecord],
    verb: &str,
) -> Result<Vec<String>, SessionEnd> {
    for (index, model) in models.iter().enumerate() {
        println!(
            "  {}) {} -- {} -- created {}",
            index + 1,
            model.name,
            model.description,
            model.created
        );
    }
    loop {
        let raw = prompt(input, &format!("Models to {verb} (comma-separated numbers): "))?;
        if let Some(indices) = parse_selection(&raw, models.len()) {
            return Ok(indices
                .into_iter()
                .map(|i| models[i - 1].customization_id.clone())
                .collect());
        }
        println!("Enter numbers between 1 and {}.", models.len());
    }
}

fn parse_selection(raw: &str, len: usize) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index: usize = part.parse().ok()?;
        if index < 1 || index > len {
            return None;
        }
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    if indices.is_empty() {
        None
    } else {
        Some(indices)
    }
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<String, SessionEnd> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Err(SessionEnd::Cancelled);
    }
    Ok(line.trim().to_string())
}

/// Confirmation answers read from the same prompt stream as the session.
struct ReaderConfirm<'a, R: BufRead> {
    input: &'a mut R,
}

impl<R: BufRead> ConfirmSource for ReaderConfirm<'_, R> {
    fn ask(&mut self, prompt: &str) -> ClientResult<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}
