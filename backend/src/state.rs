use crate::{config::Config, db::connection::DbPool, utils::email::Mailer};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, mailer: Mailer) -> Self {
        Self {
            pool,
            config,
            mailer,
        }
    }
}
