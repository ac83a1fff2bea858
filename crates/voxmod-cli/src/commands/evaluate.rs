use std::path::Path;

use tracing::info;

use voxmod_client::{AccountClient, Credentials, ModelHandle, Transcription};

use crate::config::AppConfig;

/// Transcribe an audio file against one model.
///
/// `model` is either a customization id or the sentinel `latest`, which
/// resolves to the most recently created model on the account.
pub fn run(model: &str, audio: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let creds = config.credentials()?;
    let id = resolve_model_id(model, &creds)?;

    let handle = ModelHandle::bound(&creds, id.clone())?;
    let transcription = handle.transcribe(audio)?;
    print_transcription(&id, &transcription);
    Ok(())
}

fn resolve_model_id(model: &str, creds: &Credentials) -> anyhow::Result<String> {
    if model != "latest" {
        return Ok(model.to_string());
    }
    let account = AccountClient::new(creds)?;
    let latest = account
        .latest_model()?
        .ok_or_else(|| anyhow::anyhow!("the account has no models to evaluate"))?;
    info!(
        customization_id = %latest.customization_id,
        name = %latest.name,
        "Resolved 'latest'"
    );
    Ok(latest.customization_id)
}

pub(crate) fn print_transcription(id: &str, transcription: &Transcription) {
    println!("\n{}", "*".repeat(60));
    println!("Transcription results from model {id}:");
    if transcription.results.is_empty() {
        println!("  (no hypotheses returned)");
    }
    for result in &transcription.results {
        for alt in &result.alternatives {
            match alt.confidence {
                Some(confidence) => println!("  {confidence:<5.2}  {}", alt.transcript.trim()),
                None => println!("         {}", alt.transcript.trim()),
            }
        }
    }
    println!("{}", "*".repeat(60));
}
