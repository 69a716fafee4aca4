use std::{fmt, sync::Arc};

use studyhall_core::{
    application::{
        AppUnitOfWork, DynCommentService, DynPostService, DynSavedPostService,
    },
    database::{InMemoryStore, PostgresDatabase},
};

use crate::infra::config::{Config, PaginationConfig};

#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<DynPostService>,
    pub comment_service: Arc<DynCommentService>,
    pub saved_post_service: Arc<DynSavedPostService>,
    pub config: Arc<Config>,
    /// Present when the server runs against PostgreSQL.
    pub postgres: Option<Arc<PostgresDatabase>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.postgres.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        unit_of_work: AppUnitOfWork,
        config: Arc<Config>,
        postgres: Option<Arc<PostgresDatabase>>,
    ) -> Self {
        Self {
            post_service: Arc::new(unit_of_work.post_service()),
            comment_service: Arc::new(unit_of_work.comment_service()),
            saved_post_service: Arc::new(unit_of_work.saved_post_service()),
            config,
            postgres,
        }
    }

    pub fn from_postgres(db: Arc<PostgresDatabase>, config: Arc<Config>) -> Self {
        Self::new(AppUnitOfWork::from_postgres(&db), config, Some(db))
    }

    pub fn in_memory(store: &InMemoryStore, config: Arc<Config>) -> Self {
        Self::new(AppUnitOfWork::in_memory(store), config, None)
    }

    pub fn posts(&self) -> &DynPostService {
        &self.post_service
    }

    pub fn comments(&self) -> &DynCommentService {
        &self.comment_service
    }

    pub fn saved_posts(&self) -> &DynSavedPostService {
        &self.saved_post_service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn page_limits(&self) -> &PaginationConfig {
        &self.config.pagination
    }

    pub fn postgres(&self) -> Option<&Arc<PostgresDatabase>> {
        self.postgres.as_ref()
    }
}
