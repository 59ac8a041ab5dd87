use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sectioner::db::Database;
use sectioner::model::OllamaClient;
use sectioner::ocr::LocalTextExtraction;
use sectioner::pipeline::Dispatcher;
use sectioner::storage::{FsObjectStore, ObjectStore};

#[tokio::main]
async fn main() -> sectioner::Result<()> {
    // Bridge `log` macros (db layer) into tracing, then install the
    // subscriber. RUST_LOG overrides the default level.
    tracing_log::LogTracer::init().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting sectioner v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => sectioner::load_config(path)?,
        None => sectioner::Config::default_local(),
    };

    let db_path = config
        .database_path()
        .unwrap_or_else(|| PathBuf::from("sectioner.db"));
    let db = Database::open(&db_path)?;

    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&config.store_directory));
    let events = store.subscribe();

    let ocr = Arc::new(LocalTextExtraction::new(Arc::clone(&store)));
    let model = Arc::new(OllamaClient::new(
        config.model.endpoint.clone(),
        config.model.name.clone(),
    ));

    let dispatcher = Dispatcher::new(db, store, ocr, model, config.pipeline());
    let dispatcher_task = tokio::spawn(dispatcher.run(events));

    tracing::info!(
        store = %config.store_directory.display(),
        "watching for storage events; Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await.ok();

    tracing::info!("shutting down");
    dispatcher_task.abort();
    Ok(())
}
