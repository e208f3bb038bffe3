use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::interview::store::SessionStore;
use crate::llm_client::transcription::Transcriber;
use crate::llm_client::ChatCompletion;
use crate::storage::DocumentStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Used directly by the CRUD handlers (jobs, applications, resumes, interviews).
    pub db: PgPool,
    pub sessions: Arc<dyn SessionStore>,
    pub llm: Arc<dyn ChatCompletion>,
    pub transcriber: Arc<dyn Transcriber>,
    pub storage: Arc<dyn DocumentStorage>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory doubles. The pool is lazy and never connects
    /// unless a CRUD handler is exercised.
    pub fn for_tests(sessions: Arc<dyn SessionStore>, llm: Arc<dyn ChatCompletion>) -> Self {
        use crate::llm_client::transcription::testing::FixedTranscriber;
        use crate::storage::testing::MemoryStorage;

        let config = Config::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool from a valid URL");
        Self {
            db,
            sessions,
            llm,
            transcriber: Arc::new(FixedTranscriber::new("transcribed answer")),
            storage: Arc::new(MemoryStorage::default()),
            config,
        }
    }
}
