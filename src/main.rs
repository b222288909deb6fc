use axum::serve;
use ref_converter::api::routes::create_router;
use ref_converter::config::AppConfig;
use ref_converter::logic::{LogObserver, ReferenceConverter};
use ref_converter::store::HttpDocumentStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to keep HTTP client noise down
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .parse_default_env()
        .init();

    println!("Reference converter service");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, store={} (dataset {})",
        config.server.host, config.server.port, config.store.base_url, config.store.dataset
    );

    let store = HttpDocumentStore::new(&config.store, config.store_token())?;
    let converter = ReferenceConverter::new(store, config.converter.clone())?
        .with_observer(Arc::new(LogObserver));

    let state = Arc::new(Mutex::new(converter));
    let app: axum::Router = create_router().with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Reference converter running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
