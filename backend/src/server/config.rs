//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use postboard::domain::ports::{DocumentStore, ProfileCache};
use postboard::inbound::http::session_config::SessionSettings;

/// Everything [`create_server`](super::create_server) needs to start.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) profile_cache: Option<Arc<dyn ProfileCache>>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            session,
            bind_addr,
            store,
            profile_cache: None,
        }
    }

    /// Serve profile lookups through `cache`.
    #[must_use]
    pub fn with_profile_cache(mut self, cache: Arc<dyn ProfileCache>) -> Self {
        self.profile_cache = Some(cache);
        self
    }
}
