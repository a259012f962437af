use std::error::Error;

use crate::core::config::Config;
use crate::core::providers::load_providers;

pub fn list_providers() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let default_provider = config.default_provider;

    println!("Available providers:\n");
    println!("| Provider | Display Name | Default Model | Base URL | Streaming |");
    println!("|---|---|---|---|:---:|");

    for provider in load_providers() {
        let provider_id = if default_provider
            .as_ref()
            .is_some_and(|d| d.eq_ignore_ascii_case(&provider.id))
        {
            format!("{}*", provider.id)
        } else {
            provider.id.clone()
        };

        println!(
            "| {} | {} | {} | {} | {} |",
            provider_id,
            provider.display_name,
            provider.default_model,
            provider.base_url.as_deref().unwrap_or("(backend default)"),
            if provider.streaming { "yes" } else { "no" }
        );
    }

    if default_provider.is_some() {
        println!("\n* = default provider");
    }

    Ok(())
}
