//! Post HTTP handlers.
//!
//! ```text
//! POST /api/v1/posts {"content":"..."}
//! GET  /api/v1/posts
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{ApiResult, Error, PostContent};
use crate::inbound::http::schemas::PostResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePostRequest {
    #[schema(example = "Hello, world")]
    pub content: String,
}

/// Publish a post as the logged-in caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Blank content", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let content = PostContent::new(payload.into_inner().content).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "content", "code": "empty_content" }))
    })?;
    let post = state.posts.publish(&author, content).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// Every post, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    responses(
        (status = 200, description = "Posts", body = [PostResponse]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    session.require_user_id()?;
    let posts = state.posts_query.all_posts().await?;
    Ok(web::Json(posts.into_iter().map(PostResponse::from).collect()))
}
