//! Server settings from the environment.

use std::net::SocketAddr;
use std::sync::Arc;

use api::{Backend, BackendConfig, SupabaseBackend};

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// `None` when `SUPABASE_URL` or `SUPABASE_ANON_KEY` is missing. The
    /// server still starts and answers every request with a 500.
    pub backend: Option<BackendConfig>,
}

impl ServerConfig {
    /// Load `.env`, then read `PORT`, `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let port = std::env::var("PORT").ok();
        let backend = BackendConfig::from_values(
            std::env::var("SUPABASE_URL").ok(),
            std::env::var("SUPABASE_ANON_KEY").ok(),
            None,
        );
        Self::from_parts(port.as_deref(), backend.ok())
    }

    pub fn from_parts(port: Option<&str>, backend: Option<BackendConfig>) -> Self {
        let port = match port.map(str::parse::<u16>) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid PORT: {e}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };
        Self { port, backend }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn backend(&self) -> Option<Arc<dyn Backend>> {
        self.backend
            .clone()
            .map(|config| Arc::new(SupabaseBackend::new(config)) as Arc<dyn Backend>)
    }
}
