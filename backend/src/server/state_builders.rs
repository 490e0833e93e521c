//! Builders for the document store and the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use postboard::domain::ports::{DocumentStore, PasswordHasher, ProfileCache};
use postboard::domain::{
    AccountService, AccountStore, FollowGraph, IdentityResolver, PostService, PostStore,
};
use postboard::inbound::http::state::HttpState;
use postboard::outbound::cache::MokaProfileCache;
use postboard::outbound::persistence::{
    DbPool, DieselDocumentStore, InMemoryDocumentStore, PoolConfig,
};
use postboard::outbound::security::Argon2PasswordHasher;
use postboard::settings::AppSettings;

/// PostgreSQL when a database URL is configured, process memory otherwise.
///
/// # Errors
/// Pool construction or schema setup failures.
pub(crate) async fn build_document_store(
    settings: &AppSettings,
) -> std::io::Result<Arc<dyn DocumentStore>> {
    let Some(url) = settings.database_url() else {
        info!("no database url configured; using the in-memory document store");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    };
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let store = DieselDocumentStore::new(pool);
    store
        .ensure_schema()
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!("using the PostgreSQL document store");
    Ok(Arc::new(store))
}

/// Profile cache per settings, or `None` when disabled.
pub(crate) fn build_profile_cache(settings: &AppSettings) -> Option<Arc<dyn ProfileCache>> {
    settings.profile_cache_capacity().map(|capacity| {
        Arc::new(MokaProfileCache::new(capacity, settings.profile_cache_ttl()))
            as Arc<dyn ProfileCache>
    })
}

/// Wire the core services over one store and expose them as driving ports.
pub(crate) fn build_http_state(
    store: Arc<dyn DocumentStore>,
    profile_cache: Option<Arc<dyn ProfileCache>>,
) -> web::Data<HttpState> {
    build_http_state_with_hasher(store, profile_cache, Arc::new(Argon2PasswordHasher))
}

fn build_http_state_with_hasher(
    store: Arc<dyn DocumentStore>,
    profile_cache: Option<Arc<dyn ProfileCache>>,
    hasher: Arc<dyn PasswordHasher>,
) -> web::Data<HttpState> {
    let resolver = match profile_cache {
        Some(cache) => IdentityResolver::new(store.clone()).with_cache(cache),
        None => IdentityResolver::new(store.clone()),
    };
    let graph = FollowGraph::new(store.clone(), resolver.clone());
    let accounts = AccountService::new(
        AccountStore::new(store.clone(), resolver.clone()),
        resolver.clone(),
        graph.clone(),
        hasher,
    );
    let posts = PostService::new(PostStore::new(store), resolver);
    web::Data::new(HttpState::from_services(accounts, graph, posts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho_config::OrthoConfig;
    use postboard::domain::{LoginCredentials, SignupDetails, SignupInput};
    use postboard::outbound::security::PlaintextPasswordHasher;
    use rstest::rstest;
    use std::ffi::OsString;

    fn settings(capacity: Option<u64>) -> AppSettings {
        let _guard = env_lock::lock_env([
            ("POSTBOARD_DATABASE_URL", None::<String>),
            ("POSTBOARD_PROFILE_CACHE_CAPACITY", None::<String>),
        ]);
        let mut settings =
            AppSettings::load_from_iter([OsString::from("postboard")]).expect("settings");
        settings.profile_cache_capacity = capacity;
        settings
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(0), false)]
    #[case(Some(32), true)]
    fn cache_follows_capacity(#[case] capacity: Option<u64>, #[case] enabled: bool) {
        assert_eq!(build_profile_cache(&settings(capacity)).is_some(), enabled);
    }

    #[rstest]
    #[tokio::test]
    async fn memory_store_is_selected_without_a_database_url() {
        let store = build_document_store(&settings(None)).await.expect("store");
        let state = build_http_state(store, None);
        assert!(state.posts_query.all_posts().await.expect("posts").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn services_share_one_store() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let state = build_http_state_with_hasher(store, None, Arc::new(PlaintextPasswordHasher));
        let details = SignupDetails::parse(SignupInput {
            email: "ada@example.com",
            password: "correct horse",
            confirm_password: "correct horse",
            first_name: "Ada",
            last_name: "Lovelace",
        })
        .expect("valid signup");
        let id = state.accounts.signup(&details).await.expect("signup");

        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", "correct horse").expect("creds");
        let profile = state.accounts.authenticate(&credentials).await.expect("login");
        assert_eq!(profile.id, id);
        assert_eq!(state.profiles.profile(&id).await.expect("profile").id, id);
    }
}
