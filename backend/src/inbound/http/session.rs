//! Typed access to the cookie session.
//!
//! Handlers never touch raw session keys: login stores the caller's id and
//! display name, everything else reads them back through [`SessionContext`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Profile, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const DISPLAY_NAME_KEY: &str = "display_name";

/// The authenticated caller as recorded at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
}

#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record a successful login. The session id is renewed first so a
    /// pre-login cookie cannot be replayed.
    pub fn persist_login(&self, profile: &Profile) -> Result<(), Error> {
        self.0.renew();
        self.store(USER_ID_KEY, profile.id.as_ref())?;
        self.store(DISPLAY_NAME_KEY, &profile.display_name())
    }

    /// Refresh the cached display name after a profile edit.
    pub fn refresh_name(&self, profile: &Profile) -> Result<(), Error> {
        self.store(DISPLAY_NAME_KEY, &profile.display_name())
    }

    /// Drop everything and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Current caller, if logged in. A tampered or stale id reads as
    /// logged out.
    pub fn user(&self) -> Result<Option<SessionUser>, Error> {
        let Some(raw) = self.load(USER_ID_KEY)? else {
            return Ok(None);
        };
        let id = match UserId::new(raw) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let name = self.load(DISPLAY_NAME_KEY)?.unwrap_or_default();
        Ok(Some(SessionUser { id, name }))
    }

    /// The caller or `401 login required`.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.require_user().map(|user| user.id)
    }

    fn store(&self, key: &str, value: &str) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|err| Error::internal(format!("failed to write session: {err}")))
    }

    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::sample_profile;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let user = session.require_user()?;
        Ok(HttpResponse::Ok().body(format!("{} {}", user.id, user.name)))
    }

    #[actix_web::test]
    async fn login_round_trips_id_and_name() {
        let profile = sample_profile();
        let expected = format!("{} {}", profile.id, profile.display_name());
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::post().to(move |session: SessionContext| {
                        let profile = profile.clone();
                        async move {
                            session.persist_login(&profile)?;
                            Ok::<_, Error>(HttpResponse::NoContent())
                        }
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, expected);
    }

    #[actix_web::test]
    async fn missing_or_tampered_ids_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/tamper",
                    web::post().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, "not-a-uuid").expect("insert");
                        HttpResponse::NoContent()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res =
            test::call_service(&app, test::TestRequest::post().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
