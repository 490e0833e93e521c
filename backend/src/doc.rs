//! OpenAPI document for the postboard API.
//!
//! Served through Swagger UI in debug builds and written to stdout by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    LoginRequest, ProfileResponse, SessionProfileResponse, SignupRequest, SignupResponse,
    UpdateProfileRequest,
};
use crate::inbound::http::posts::CreatePostRequest;
use crate::inbound::http::schemas::{PostResponse, StatusResponse};
use crate::inbound::http::users::{FollowingStatusResponse, ProfileViewResponse};

struct SessionCookieScheme;

impl Modify for SessionCookieScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default)
            .add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Private session cookie issued by POST /api/v1/login.",
                ))),
            );
    }
}

/// OpenAPI document covering accounts, users, posts and health probes.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieScheme),
    info(
        title = "postboard API",
        description = "Accounts, follows and posts over cookie sessions."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::users::view_profile,
        crate::inbound::http::users::follow,
        crate::inbound::http::users::unfollow,
        crate::inbound::http::users::following_status,
        crate::inbound::http::users::user_posts,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignupRequest,
        SignupResponse,
        LoginRequest,
        SessionProfileResponse,
        UpdateProfileRequest,
        ProfileResponse,
        ProfileViewResponse,
        FollowingStatusResponse,
        CreatePostRequest,
        PostResponse,
        StatusResponse,
    )),
    tags(
        (name = "accounts", description = "Signup, login and the caller's profile"),
        (name = "users", description = "Profiles and the follow graph"),
        (name = "posts", description = "Publishing and reading posts"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;
