//! Request handling shared by every collection.
//!
//! Collection modules only declare routes, query parameters and OpenAPI
//! metadata; the steps in between (id parsing, role scoping, validation,
//! persistence and response shaping) live here once.

use actix_web::{HttpResponse, web};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::resource::not_found_message;
use crate::domain::{DeleteOutcome, Error, Principal, Resource, Saved};

use super::ApiResult;
use super::state::{HttpState, Served};

/// Parse a path id; anything that is not a valid id reads as unknown.
///
/// # Errors
/// `404` with the record kind's not-found message.
pub fn parse_id<R: Resource>(raw: &str) -> Result<R::Id, Error> {
    raw.parse::<R::Id>()
        .map_err(|_| Error::not_found(not_found_message::<R>()))
}

/// Decode a request body leniently.
///
/// Malformed JSON becomes `null`, which validation reports against `_body`.
pub fn body_value(body: &web::Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Filter actually applied to a list request.
///
/// Scoped principals never choose their own filters.
pub fn effective_filter<R: Resource>(principal: &Principal, requested: R::Filter) -> R::Filter {
    match R::scope_for(principal) {
        Some(scope) => {
            if requested != R::Filter::default() && requested != scope {
                warn!(
                    noun = R::NOUN,
                    role = %principal.role,
                    "ignoring list filters outside the caller's scope"
                );
            }
            scope
        }
        None => requested,
    }
}

/// `GET /api/<collection>`.
///
/// # Errors
/// Store failures.
pub async fn list<R: Served>(
    state: &HttpState,
    principal: &Principal,
    requested: R::Filter,
) -> ApiResult<HttpResponse> {
    let filter = effective_filter::<R>(principal, requested);
    let records = R::gateway(state).get_all(&filter).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// `GET /api/<collection>/{id}`.
///
/// # Errors
/// `404` for unknown ids; `403` when the record lies outside the caller's
/// scope.
pub async fn detail<R: Served>(
    state: &HttpState,
    principal: &Principal,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    let id = parse_id::<R>(raw_id)?;
    let gateway = R::gateway(state);
    let record = gateway
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found(not_found_message::<R>()))?;
    if let Some(scope) = R::scope_for(principal) {
        let visible = gateway.get_all(&scope).await?;
        if !visible.iter().any(|r| r.id() == id) {
            return Err(Error::forbidden("Forbidden"));
        }
    }
    Ok(HttpResponse::Ok().json(record))
}

/// `POST /api/<collection>/create`.
///
/// # Errors
/// `400` with every failing field; store failures.
pub async fn create<R: Served>(state: &HttpState, body: &web::Bytes) -> ApiResult<HttpResponse> {
    let saved = R::gateway(state).create(&body_value(body)).await?;
    Ok(HttpResponse::Created().json(saved_body(saved)?))
}

/// `PUT /api/<collection>/{id}`; overwrites every column.
///
/// # Errors
/// `404` for unknown ids, `400` for invalid bodies, store failures.
pub async fn update<R: Served>(
    state: &HttpState,
    raw_id: &str,
    body: &web::Bytes,
) -> ApiResult<HttpResponse> {
    let id = parse_id::<R>(raw_id)?;
    let saved = R::gateway(state)
        .update(id, &body_value(body))
        .await?
        .ok_or_else(|| Error::not_found(not_found_message::<R>()))?;
    Ok(HttpResponse::Ok().json(saved_body(saved)?))
}

/// `DELETE /api/<collection>/{id}`.
///
/// # Errors
/// `404` for unknown ids, store failures.
pub async fn delete<R: Served>(state: &HttpState, raw_id: &str) -> ApiResult<HttpResponse> {
    let id = parse_id::<R>(raw_id)?;
    match R::gateway(state).delete(id).await? {
        DeleteOutcome::Deleted(message) => Ok(HttpResponse::Ok().json(message_body(message))),
        DeleteOutcome::NotFound(message) => Err(Error::not_found(message)),
    }
}

/// `{"message": ...}`.
#[must_use]
pub fn message_body(message: String) -> Value {
    let mut body = Map::new();
    body.insert("message".to_owned(), Value::String(message));
    Value::Object(body)
}

fn saved_body<R: Resource>(saved: Saved<R>) -> Result<Value, Error> {
    let record = serde_json::to_value(&saved.record)
        .map_err(|err| Error::internal(format!("failed to encode {}: {err}", R::KEY)))?;
    let Value::Object(mut body) = message_body(saved.message) else {
        return Err(Error::internal("message body is not an object"));
    };
    body.insert(R::KEY.to_owned(), record);
    Ok(Value::Object(body))
}
