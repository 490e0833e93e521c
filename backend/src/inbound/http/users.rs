//! Profile and follow-graph HTTP handlers.
//!
//! ```text
//! GET  /api/v1/users/{id}
//! POST /api/v1/users/{id}/follow
//! POST /api/v1/users/{id}/unfollow
//! GET  /api/v1/users/{id}/following-status
//! GET  /api/v1/users/{id}/posts
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{ApiResult, Error, UserId};
use crate::inbound::http::schemas::{PostResponse, StatusResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Another user's profile as seen by the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewResponse {
    pub id: String,
    #[schema(example = "Grace Hopper")]
    pub name: String,
    pub is_me: bool,
    pub is_following: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FollowingStatusResponse {
    pub following: bool,
}

/// Path ids that are not UUIDs name no user.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        debug!(id = raw, error = %err, "malformed user id in path");
        Error::not_found("user not found")
    })
}

/// View a profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile", body = ProfileViewResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "viewProfile"
)]
#[get("/users/{id}")]
pub async fn view_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileViewResponse>> {
    let viewer = session.require_user_id()?;
    let target = parse_user_id(&path)?;
    let view = state.profiles.view_profile(&viewer, &target).await?;
    Ok(web::Json(ProfileViewResponse {
        id: view.id.to_string(),
        name: view.name,
        is_me: view.is_me,
        is_following: view.is_following,
    }))
}

/// Follow a user.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/follow",
    params(("id" = String, Path, description = "User to follow")),
    responses(
        (status = 200, description = "Following", body = StatusResponse),
        (status = 400, description = "Cannot follow yourself", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Only one side was written; retry", body = Error)
    ),
    tags = ["users"],
    operation_id = "follow"
)]
#[post("/users/{id}/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<StatusResponse>> {
    let follower = session.require_user_id()?;
    let followee = parse_user_id(&path)?;
    state.follows.follow(&follower, &followee).await?;
    Ok(web::Json(StatusResponse::success()))
}

/// Stop following a user.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/unfollow",
    params(("id" = String, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "Not following", body = StatusResponse),
        (status = 400, description = "Cannot unfollow yourself", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "unfollow"
)]
#[post("/users/{id}/unfollow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<StatusResponse>> {
    let follower = session.require_user_id()?;
    let followee = parse_user_id(&path)?;
    state.follows.unfollow(&follower, &followee).await?;
    Ok(web::Json(StatusResponse::success()))
}

/// Whether the caller follows the user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/following-status",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Relationship", body = FollowingStatusResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "followingStatus"
)]
#[get("/users/{id}/following-status")]
pub async fn following_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowingStatusResponse>> {
    let caller = session.require_user_id()?;
    let target = parse_user_id(&path)?;
    let following = state.follows_query.is_following(&caller, &target).await?;
    Ok(web::Json(FollowingStatusResponse { following }))
}

/// Posts written by a user, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/posts",
    params(("id" = String, Path, description = "Author id")),
    responses(
        (status = 200, description = "Posts", body = [PostResponse]),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["posts"],
    operation_id = "postsByUser"
)]
#[get("/users/{id}/posts")]
pub async fn user_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    session.require_user_id()?;
    let author = parse_user_id(&path)?;
    let posts = state.posts_query.posts_by(&author).await?;
    Ok(web::Json(posts.into_iter().map(PostResponse::from).collect()))
}
