//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountsCommand, FollowCommand, FollowQuery, PostsCommand, PostsQuery, ProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountsCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub follows: Arc<dyn FollowCommand>,
    pub follows_query: Arc<dyn FollowQuery>,
    pub posts: Arc<dyn PostsCommand>,
    pub posts_query: Arc<dyn PostsQuery>,
}

impl HttpState {
    /// Wire every port from one shared set of services.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use postboard::domain::{
    ///     AccountService, AccountStore, FollowGraph, IdentityResolver, PostService, PostStore,
    /// };
    /// use postboard::inbound::http::state::HttpState;
    /// use postboard::outbound::persistence::InMemoryDocumentStore;
    /// use postboard::outbound::security::Argon2PasswordHasher;
    ///
    /// let store = Arc::new(InMemoryDocumentStore::new());
    /// let resolver = IdentityResolver::new(store.clone());
    /// let graph = FollowGraph::new(store.clone(), resolver.clone());
    /// let accounts = AccountService::new(
    ///     AccountStore::new(store.clone(), resolver.clone()),
    ///     resolver.clone(),
    ///     graph.clone(),
    ///     Arc::new(Argon2PasswordHasher),
    /// );
    /// let posts = PostService::new(PostStore::new(store), resolver);
    ///
    /// let state = HttpState::from_services(accounts, graph, posts);
    /// let _ = state.accounts.clone();
    /// ```
    pub fn from_services<A, F, P>(accounts: A, graph: F, posts: P) -> Self
    where
        A: AccountsCommand + ProfileQuery + 'static,
        F: FollowCommand + FollowQuery + 'static,
        P: PostsCommand + PostsQuery + 'static,
    {
        let accounts = Arc::new(accounts);
        let graph = Arc::new(graph);
        let posts = Arc::new(posts);
        Self {
            accounts: accounts.clone(),
            profiles: accounts,
            follows: graph.clone(),
            follows_query: graph,
            posts: posts.clone(),
            posts_query: posts,
        }
    }
}
