//! Account HTTP handlers.
//!
//! ```text
//! POST  /api/v1/signup  {"email","password","confirmPassword","firstName","lastName"}
//! POST  /api/v1/login   {"email","password"}
//! POST  /api/v1/logout
//! GET   /api/v1/me
//! PATCH /api/v1/me      {"email"?, "firstName"?, "lastName"?}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdate;
use crate::domain::{
    ApiResult, CredentialsValidationError, EmailAddress, Error, LoginCredentials, PersonName,
    SignupDetails, SignupInput,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The caller as recorded in the session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SessionProfileResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

/// Profile fields to overwrite. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Profile returned after an edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub(crate) fn validation_error(err: &CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.code() }))
}

impl TryFrom<&UpdateProfileRequest> for ProfileUpdate {
    type Error = CredentialsValidationError;

    fn try_from(value: &UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: value.email.as_deref().map(EmailAddress::new).transpose()?,
            first_name: value
                .first_name
                .as_deref()
                .map(|raw| PersonName::parse(raw, "firstName"))
                .transpose()?,
            last_name: value
                .last_name
                .as_deref()
                .map(|raw| PersonName::parse(raw, "lastName"))
                .transpose()?,
        })
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let details = SignupDetails::parse(SignupInput {
        email: &payload.email,
        password: &payload.password,
        confirm_password: &payload.confirm_password,
        first_name: &payload.first_name,
        last_name: &payload.last_name,
    })
    .map_err(|err| validation_error(&err))?;

    let id = state.accounts.signup(&details).await?;
    info!(user_id = %id, "account created");
    Ok(HttpResponse::Created().json(SignupResponse { id: id.to_string() }))
}

/// Authenticate and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionProfileResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| validation_error(&err))?;
    let profile = state.accounts.authenticate(&credentials).await?;
    session.persist_login(&profile)?;
    Ok(web::Json(SessionProfileResponse {
        id: profile.id.to_string(),
        name: profile.display_name(),
    }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The logged-in caller's id and display name.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Session profile", body = SessionProfileResponse),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(session: SessionContext) -> ApiResult<web::Json<SessionProfileResponse>> {
    let user = session.require_user()?;
    Ok(web::Json(SessionProfileResponse {
        id: user.id.to_string(),
        name: user.name,
    }))
}

/// Overwrite the caller's email or names.
#[utoipa::path(
    patch,
    path = "/api/v1/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[patch("/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let update = ProfileUpdate::try_from(&payload.into_inner()).map_err(|err| validation_error(&err))?;
    let profile = state.accounts.update_profile(&user_id, &update).await?;
    session.refresh_name(&profile)?;
    Ok(web::Json(ProfileResponse {
        id: profile.id.to_string(),
        email: profile.email.to_string(),
        first_name: profile.first_name.to_string(),
        last_name: profile.last_name.to_string(),
    }))
}
