use anyhow::{Context, Result};
use ref_converter::config::AppConfig;
use ref_converter::logic::{format_bytes, LogObserver, ReferenceConverter};
use ref_converter::model::total_references;
use ref_converter::store::HttpDocumentStore;
use std::sync::Arc;

/// One-shot scan and conversion driven entirely by configuration.
///
/// `REFCONV_CONVERTER__MODE=weak-to-strong REFCONV_CONVERTER__DRY_RUN=true convert-references`
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = HttpDocumentStore::new(&config.store, config.store_token())?;
    let mut converter = ReferenceConverter::new(store, config.converter.clone())?
        .with_observer(Arc::new(LogObserver));

    println!(
        "Scanning {} for references to convert ({})...",
        config.store.dataset, config.converter.mode
    );

    let groups = converter.scan().await?;
    if groups.is_empty() {
        println!("No matching references found. Nothing to do.");
        return Ok(());
    }
    println!(
        "Found {} reference(s) in {} document(s)",
        total_references(groups),
        groups.len()
    );

    let result = converter.convert().await?;

    println!(
        "{}Converted {} document(s), estimated space saved: {}",
        if result.dry_run { "[dry run] " } else { "" },
        result.converted_count,
        format_bytes(result.space_saved_estimate_bytes)
    );
    if result.has_errors() {
        println!("{} document(s) failed:", result.failed_count());
        for error in &result.errors {
            println!("  {}", error);
        }
        anyhow::bail!("{} document(s) could not be converted", result.failed_count());
    }

    Ok(())
}
