//! Account administration (admin only).
//!
//! Accounts are created with a plain `password` that is hashed before it
//! reaches the store; responses never include the hash.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Account, AccountFilter, Principal, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource;
use crate::inbound::http::schemas::{AccountForm, MessageResponse, UserSaved};
use crate::inbound::http::state::HttpState;

/// Optional role filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    #[param(value_type = Option<String>, example = "teacher")]
    pub role: Option<Role>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Accounts ordered by last then first name", body = [Account]),
        (status = 403, description = "Admins only", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    query: web::Query<UserQuery>,
) -> ApiResult<HttpResponse> {
    let filter = AccountFilter {
        role: query.into_inner().role,
    };
    resource::list::<Account>(&state, &principal, filter).await
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Account", body = Account),
        (status = 404, description = "User not found.", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::detail::<Account>(&state, &principal, &id).await
}

#[utoipa::path(
    post,
    path = "/api/users/create",
    request_body = AccountForm,
    responses(
        (status = 201, description = "User created successfully.", body = UserSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users/create")]
pub async fn create_user(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<HttpResponse> {
    resource::create::<Account>(&state, &body).await
}

/// Replaces every profile column; the credential only changes when
/// `password` is present.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = AccountForm,
    responses(
        (status = 200, description = "User updated successfully.", body = UserSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "User not found.", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::update::<Account>(&state, &id, &body).await
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted successfully.", body = MessageResponse),
        (status = 404, description = "User not found.", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(state: web::Data<HttpState>, id: web::Path<String>) -> ApiResult<HttpResponse> {
    resource::delete::<Account>(&state, &id).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}
