//! Account use-cases behind [`AccountsCommand`] and [`ProfileQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use super::account_store::AccountStore;
use super::follow_graph::FollowGraph;
use super::identity_resolver::IdentityResolver;
use super::ports::{
    AccountsCommand, PasswordHashError, PasswordHasher, ProfileQuery, ProfileUpdate, ProfileView,
};
use super::{
    AccountField, Error, LoginCredentials, PasswordHash, Profile, SignupDetails, SocialError,
    UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Signup, login, profile edits and profile views.
#[derive(Clone)]
pub struct AccountService {
    accounts: AccountStore,
    resolver: IdentityResolver,
    graph: FollowGraph,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Assemble the service from the core components.
    pub fn new(
        accounts: AccountStore,
        resolver: IdentityResolver,
        graph: FollowGraph,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            accounts,
            resolver,
            graph,
            hasher,
        }
    }

    /// Hash off the async worker; Argon2 is deliberately CPU-bound.
    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| hashing_task_failed(&err))?
            .map_err(|err| hashing_failed(&err))
    }

    async fn verify_password(&self, password: &str, hash: &PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.clone();
        spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|err| hashing_task_failed(&err))?
            .map_err(|err| hashing_failed(&err))
    }
}

fn hashing_failed(err: &PasswordHashError) -> Error {
    error!(error = %err, "password hasher failed");
    Error::internal("password hashing failed")
}

fn hashing_task_failed(err: &JoinError) -> Error {
    error!(error = %err, "password hashing task failed");
    Error::internal("password hashing failed")
}

fn email_conflict(err: SocialError) -> Error {
    match err {
        SocialError::AlreadyExists { .. } => Error::conflict("email already registered"),
        other => other.into(),
    }
}

#[async_trait]
impl AccountsCommand for AccountService {
    async fn signup(&self, details: &SignupDetails) -> Result<UserId, Error> {
        let hash = self.hash_password(details.password()).await?;
        let id = self
            .accounts
            .create(
                details.email().clone(),
                hash,
                details.first_name().clone(),
                details.last_name().clone(),
            )
            .await
            .map_err(email_conflict)?;
        Ok(id)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Profile, Error> {
        let account = match self.accounts.find_by_email(credentials.email()).await {
            Ok(account) => account,
            Err(SocialError::NotFound { .. }) => {
                info!("login rejected: unknown email");
                return Err(Error::unauthorized(INVALID_CREDENTIALS));
            }
            Err(err) => return Err(err.into()),
        };

        if self
            .verify_password(credentials.password(), &account.password_hash)
            .await?
        {
            Ok(account.profile)
        } else {
            info!(user_id = %account.id(), "login rejected: wrong password");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<Profile, Error> {
        if update.is_empty() {
            warn!(user_id = %id, "profile update without changes");
            return self.profile(id).await;
        }

        let handle = self.resolver.resolve(id).await?;
        let changes: [(AccountField, Option<&str>); 3] = [
            (AccountField::Email, update.email.as_ref().map(AsRef::as_ref)),
            (
                AccountField::FirstName,
                update.first_name.as_ref().map(AsRef::as_ref),
            ),
            (
                AccountField::LastName,
                update.last_name.as_ref().map(AsRef::as_ref),
            ),
        ];
        for (field, value) in changes {
            if let Some(value) = value {
                self.accounts
                    .update_field(&handle, field, value)
                    .await
                    .map_err(email_conflict)?;
            }
        }

        let account = self.accounts.find_by_opaque_id(id).await?;
        Ok(account.profile)
    }
}

#[async_trait]
impl ProfileQuery for AccountService {
    async fn profile(&self, id: &UserId) -> Result<Profile, Error> {
        let entry = self.resolver.resolve_profile(id).await?;
        Ok(entry.profile)
    }

    async fn view_profile(&self, viewer: &UserId, target: &UserId) -> Result<ProfileView, Error> {
        let entry = self.resolver.resolve_profile(target).await?;
        let is_me = viewer == target;
        let is_following = if is_me {
            false
        } else {
            self.graph.is_following(viewer, target).await?
        };
        Ok(ProfileView {
            name: entry.profile.display_name(),
            id: entry.profile.id,
            is_me,
            is_following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DocumentStore, MockPasswordHasher};
    use crate::domain::{ErrorCode, PasswordHash, SignupInput};
    use crate::outbound::persistence::InMemoryDocumentStore;
    use crate::outbound::security::PlaintextPasswordHasher;
    use rstest::{fixture, rstest};

    fn service_with(store: Arc<dyn DocumentStore>, hasher: Arc<dyn PasswordHasher>) -> AccountService {
        let resolver = IdentityResolver::new(store.clone());
        AccountService::new(
            AccountStore::new(store.clone(), resolver.clone()),
            resolver.clone(),
            FollowGraph::new(store, resolver),
            hasher,
        )
    }

    #[fixture]
    fn service() -> AccountService {
        service_with(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(PlaintextPasswordHasher),
        )
    }

    fn signup_details(email: &str, first: &str) -> SignupDetails {
        SignupDetails::parse(SignupInput {
            email,
            password: "correct horse",
            confirm_password: "correct horse",
            first_name: first,
            last_name: "Tester",
        })
        .expect("valid signup")
    }

    fn login(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid login")
    }

    #[rstest]
    #[tokio::test]
    async fn signup_then_login_returns_the_profile(service: AccountService) {
        let id = service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");

        let profile = service
            .authenticate(&login("ada@example.com", "correct horse"))
            .await
            .expect("login");
        assert_eq!(profile.id, id);
        assert_eq!(profile.display_name(), "Ada Tester");
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_signup_is_a_conflict(service: AccountService) {
        service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("first signup");
        let err = service
            .signup(&signup_details("ada@example.com", "Other"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("ada@example.com", "wrong password")]
    #[case("nobody@example.com", "correct horse")]
    #[tokio::test]
    async fn bad_credentials_are_unauthorized(
        service: AccountService,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");

        let err = service
            .authenticate(&login(email, password))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn hasher_failures_are_internal_errors() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(PasswordHashError::hash("out of memory")));
        let service = service_with(Arc::new(InMemoryDocumentStore::new()), Arc::new(hasher));

        let err = service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect_err("hash failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_internal_error() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok(PasswordHash::new("garbage")));
        hasher
            .expect_verify()
            .returning(|_, _| Err(PasswordHashError::malformed("not a PHC string")));
        let service = service_with(Arc::new(InMemoryDocumentStore::new()), Arc::new(hasher));
        service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");

        let err = service
            .authenticate(&login("ada@example.com", "correct horse"))
            .await
            .expect_err("verify failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn update_profile_overwrites_present_fields_only(service: AccountService) {
        let id = service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");
        let update = ProfileUpdate {
            first_name: Some(crate::domain::PersonName::parse("Augusta", "firstName").expect("name")),
            ..ProfileUpdate::default()
        };

        let profile = service.update_profile(&id, &update).await.expect("update");
        assert_eq!(profile.display_name(), "Augusta Tester");
        assert_eq!(profile.email.as_ref(), "ada@example.com");
        assert_eq!(service.profile(&id).await.expect("profile"), profile);
    }

    #[rstest]
    #[tokio::test]
    async fn update_profile_rejects_a_taken_email(service: AccountService) {
        service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup ada");
        let grace = service
            .signup(&signup_details("grace@example.com", "Grace"))
            .await
            .expect("signup grace");
        let update = ProfileUpdate {
            email: Some(crate::domain::EmailAddress::new("ada@example.com").expect("email")),
            ..ProfileUpdate::default()
        };

        let err = service
            .update_profile(&grace, &update)
            .await
            .expect_err("taken");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn view_profile_reports_relationship(service: AccountService) {
        let ada = service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup ada");
        let grace = service
            .signup(&signup_details("grace@example.com", "Grace"))
            .await
            .expect("signup grace");

        let before = service.view_profile(&ada, &grace).await.expect("view");
        assert!(!before.is_me);
        assert!(!before.is_following);
        assert_eq!(before.name, "Grace Tester");

        service.graph.follow(&ada, &grace).await.expect("follow");
        let after = service.view_profile(&ada, &grace).await.expect("view");
        assert!(after.is_following);

        let own = service.view_profile(&ada, &ada).await.expect("own view");
        assert!(own.is_me);
        assert!(!own.is_following);
    }

    #[rstest]
    #[tokio::test]
    async fn viewing_an_unknown_profile_is_not_found(service: AccountService) {
        let viewer = service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");
        let err = service
            .view_profile(&viewer, &UserId::random())
            .await
            .expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    /// Records the thread each hashing call ran on.
    #[derive(Default)]
    struct ThreadRecordingHasher {
        threads: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl ThreadRecordingHasher {
        fn record(&self) {
            self.threads
                .lock()
                .expect("threads lock")
                .push(std::thread::current().id());
        }
    }

    impl PasswordHasher for ThreadRecordingHasher {
        fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
            self.record();
            PlaintextPasswordHasher.hash(password)
        }

        fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
            self.record();
            PlaintextPasswordHasher.verify(password, hash)
        }
    }

    #[tokio::test]
    async fn hashing_runs_off_the_async_worker() {
        let hasher = Arc::new(ThreadRecordingHasher::default());
        let service = service_with(Arc::new(InMemoryDocumentStore::new()), hasher.clone());

        service
            .signup(&signup_details("ada@example.com", "Ada"))
            .await
            .expect("signup");
        service
            .authenticate(&login("ada@example.com", "correct horse"))
            .await
            .expect("login");

        let worker = std::thread::current().id();
        let threads = hasher.threads.lock().expect("threads lock").clone();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|thread| *thread != worker));
    }
}
