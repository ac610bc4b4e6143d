use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::auth::TokenSigner;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let tokens = TokenSigner::new(config.token_secret.clone());
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            tokens,
        }
    }
}
