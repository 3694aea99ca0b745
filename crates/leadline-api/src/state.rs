//! Application state wiring the event store, sync engine and suggestions.
//!
//! AppState holds the concrete instances used by both the consoles and the
//! HTTP server. Core services are generic over collaborator traits; AppState
//! pins them to the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use leadline_core::identity::{IdentityService, NoVisitorStore};
use leadline_core::suggest::SuggestionService;
use leadline_core::sync::SyncEngine;
use leadline_infra::config::load_global_config;
use leadline_infra::filesystem::{FileVisitorStore, resolve_data_dir};
use leadline_infra::llm::build_generator;
use leadline_infra::llm::openai_compat::OpenAiCompatGenerator;
use leadline_infra::sqlite::{DEFAULT_TAIL_INTERVAL, SqliteEventStore};
use leadline_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteEngine = SyncEngine<SqliteEventStore>;

pub type ConcreteSuggestionService = SuggestionService<OpenAiCompatGenerator>;

/// Visitor identity for the terminal widget (state in `{data_dir}/visitor.json`).
pub type LocalIdentityService = IdentityService<SqliteEventStore, FileVisitorStore>;

/// Visitor identity for HTTP callers, which keep their own state.
pub type RemoteIdentityService = IdentityService<SqliteEventStore, NoVisitorStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: ConcreteEngine,
    pub suggestions: Arc<ConcreteSuggestionService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: load config, open the database,
    /// and configure the suggestion generator.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let store = SqliteEventStore::open_in(&data_dir).await?;
        let generator = build_generator(&config.suggestions);

        Ok(Self::new(store, config, data_dir, generator))
    }

    /// Wire state from already-built parts.
    pub fn new(
        store: SqliteEventStore,
        config: GlobalConfig,
        data_dir: PathBuf,
        generator: Option<OpenAiCompatGenerator>,
    ) -> Self {
        let engine = SyncEngine::new(Arc::new(store), config.sync.reconnect.clone());
        let suggestions = SuggestionService::new(generator, config.suggestions.clone());
        Self {
            engine,
            suggestions: Arc::new(suggestions),
            config: Arc::new(config),
            data_dir,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &SqliteEventStore {
        self.engine.store()
    }

    pub fn local_identity(&self) -> LocalIdentityService {
        IdentityService::new(self.engine.clone(), FileVisitorStore::new(&self.data_dir))
    }

    pub fn remote_identity(&self) -> RemoteIdentityService {
        IdentityService::new(self.engine.clone(), NoVisitorStore)
    }

    /// Pick up writes made by other processes sharing the database.
    ///
    /// Long-running commands (consoles, server) call this once.
    pub async fn start_change_tail(&self) -> anyhow::Result<()> {
        self.store()
            .spawn_tail(DEFAULT_TAIL_INTERVAL, self.shutdown.child_token())
            .await?;
        Ok(())
    }

    /// Stop background tasks started from this state.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
