use voxmod_client::AccountClient;

use crate::config::AppConfig;

/// Print the full account model inventory.
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let creds = config.credentials()?;
    let account = AccountClient::new(&creds)?;

    let models = account.list_models()?;

    if models.is_empty() {
        println!("No customization models on this account.");
        println!("Use `voxmod train` to create and train one.");
        return Ok(());
    }

    println!(
        "{:<38} {:<24} {:<10} {:<26} DESCRIPTION",
        "CUSTOMIZATION ID", "NAME", "STATUS", "CREATED"
    );
    println!("{}", "-".repeat(112));
    for model in &models {
        println!(
            "{:<38} {:<24} {:<10} {:<26} {}",
            model.customization_id, model.name, model.status, model.created, model.description
        );
    }
    println!("\n{} model(s) on the account", models.len());

    Ok(())
}
