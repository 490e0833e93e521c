//! Follow-graph maintenance across two user records.
//!
//! An edge A → B lives in two places: B's handle in A's `following` list and
//! A's handle in B's `followers` list. Both writes are issued together and
//! both run to completion. The store offers no multi-document transaction, so
//! when exactly one of them fails the other stays applied and the caller gets
//! [`SocialError::PartialMutationFailure`]. Set union and difference are
//! idempotent, so retrying the whole operation repairs the gap.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, try_join};
use tracing::{debug, error};

use super::account_store::{FOLLOWERS_FIELD, FOLLOWING_FIELD};
use super::identity_resolver::IdentityResolver;
use super::ports::{
    Collection, DocumentHandle, DocumentStore, DocumentStoreError, FollowCommand, FollowQuery,
};
use super::{Error, SocialError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeChange {
    Insert,
    Remove,
}

impl EdgeChange {
    const fn verb(self) -> &'static str {
        match self {
            Self::Insert => "follow",
            Self::Remove => "unfollow",
        }
    }
}

/// Inserts, removes and queries follow edges.
#[derive(Clone)]
pub struct FollowGraph {
    store: Arc<dyn DocumentStore>,
    resolver: IdentityResolver,
}

impl FollowGraph {
    /// Build a follow graph over `store`, resolving ids through `resolver`.
    pub fn new(store: Arc<dyn DocumentStore>, resolver: IdentityResolver) -> Self {
        Self { store, resolver }
    }

    /// Record that `follower` follows `followee`.
    ///
    /// # Errors
    /// - [`SocialError::SelfFollowRejected`] when both ids are equal, checked
    ///   before any lookup.
    /// - [`SocialError::NotFound`] when either id is unknown; nothing is
    ///   written.
    /// - [`SocialError::PartialMutationFailure`] when exactly one side's write
    ///   failed.
    /// - The follower-side error when both writes failed.
    pub async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), SocialError> {
        self.change_edge(follower, followee, EdgeChange::Insert).await
    }

    /// Remove the edge `follower` → `followee`. Same checks and failure
    /// profile as [`FollowGraph::follow`].
    pub async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), SocialError> {
        self.change_edge(follower, followee, EdgeChange::Remove).await
    }

    /// Whether `a` currently follows `b`, judged from `a`'s `following` list.
    pub async fn is_following(&self, a: &UserId, b: &UserId) -> Result<bool, SocialError> {
        let (account, b_handle) =
            try_join(self.resolver.load_account(a), self.resolver.resolve(b)).await?;
        Ok(account.follows(&b_handle))
    }

    async fn change_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
        change: EdgeChange,
    ) -> Result<(), SocialError> {
        if follower == followee {
            return Err(SocialError::SelfFollowRejected);
        }

        let (follower_handle, followee_handle) =
            try_join(self.resolver.resolve(follower), self.resolver.resolve(followee)).await?;

        let (follower_side, followee_side) = futures_util::join!(
            self.write_edge(change, &follower_handle, FOLLOWING_FIELD, &followee_handle),
            self.write_edge(change, &followee_handle, FOLLOWERS_FIELD, &follower_handle),
        );

        match (follower_side, followee_side) {
            (Ok(()), Ok(())) => {
                debug!(%follower, %followee, action = change.verb(), "follow edge updated");
                Ok(())
            }
            (Err(first), Err(second)) => {
                error!(
                    %follower,
                    %followee,
                    action = change.verb(),
                    follower_error = %first,
                    followee_error = %second,
                    "both sides of follow edge failed"
                );
                Err(first.into())
            }
            (Err(err), Ok(())) => Err(partial(change, follower, followee, FOLLOWING_FIELD, &err)),
            (Ok(()), Err(err)) => Err(partial(change, follower, followee, FOLLOWERS_FIELD, &err)),
        }
    }

    fn write_edge<'a>(
        &'a self,
        change: EdgeChange,
        owner: &'a DocumentHandle,
        field: &'a str,
        other: &'a DocumentHandle,
    ) -> BoxFuture<'a, Result<(), DocumentStoreError>> {
        match change {
            EdgeChange::Insert => {
                self.store
                    .array_union(Collection::Users, owner, field, other.as_str())
            }
            EdgeChange::Remove => {
                self.store
                    .array_remove(Collection::Users, owner, field, other.as_str())
            }
        }
    }
}

fn partial(
    change: EdgeChange,
    follower: &UserId,
    followee: &UserId,
    failed_field: &str,
    err: &DocumentStoreError,
) -> SocialError {
    error!(
        %follower,
        %followee,
        action = change.verb(),
        failed_field,
        error = %err,
        "follow edge applied to one side only"
    );
    SocialError::PartialMutationFailure {
        message: format!("{} failed on `{failed_field}`: {err}", change.verb()),
    }
}

#[async_trait]
impl FollowCommand for FollowGraph {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        FollowGraph::follow(self, follower, followee)
            .await
            .map_err(Error::from)
    }

    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        FollowGraph::unfollow(self, follower, followee)
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl FollowQuery for FollowGraph {
    async fn is_following(&self, follower: &UserId, followee: &UserId) -> Result<bool, Error> {
        FollowGraph::is_following(self, follower, followee)
            .await
            .map_err(Error::from)
    }
}
