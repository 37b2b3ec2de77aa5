//! HTTP boundary glue: header extraction and outcome rendering
//!
//! The core returns transport-independent [`Outcome`] values; this module
//! maps them onto status codes and headers:
//!
//! - **200** read ok, **201** created, **202** precondition-carrying update
//! - **204** delete / HEAD success, **304** not modified
//! - **404 / 410** not found, transient or permanent per resource policy
//! - **409** conflict on create, **412** precondition failed or lost race
//! - **500** internal fault, **501** unsupported operation
//!
//! Responses that carry a version always carry the quoted `ETag`.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::Method;
use serde::Serialize;

use crate::etag::EntityTag;
use crate::model::Outcome;
use crate::policy::ResourcePolicy;

/// Error body rendered for non-2xx outcomes.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn response(status: StatusCode, error: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorBody {
                error: error.into(),
            }),
        )
            .into_response()
    }
}

/// Parse a conditional header into an entity tag.
///
/// Values that are neither quoted tokens nor the wildcard are carried as
/// opaque tokens; they simply never match.
pub fn conditional_header(headers: &HeaderMap, name: header::HeaderName) -> Option<EntityTag> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(EntityTag::parse)
}

/// The `If-Match` tag, if supplied.
pub fn if_match_header(headers: &HeaderMap) -> Option<EntityTag> {
    conditional_header(headers, header::IF_MATCH)
}

/// The `If-None-Match` tag, if supplied.
pub fn if_none_match_header(headers: &HeaderMap) -> Option<EntityTag> {
    conditional_header(headers, header::IF_NONE_MATCH)
}

/// Render an outcome as an HTTP response.
///
/// `id` is the path identifier for verbs that have one; POST outcomes carry
/// their server-generated id instead.
pub fn render<M: Serialize>(
    method: &Method,
    id: Option<&str>,
    outcome: Outcome<M>,
    policy: &ResourcePolicy,
) -> Response {
    match outcome {
        Outcome::Ok { value, created, id: generated } => {
            let resource_id = generated.as_deref().or(id);
            let tag = match (value.version(), resource_id) {
                (Some(version), Some(resource_id)) => Some(EntityTag::from_version(
                    version,
                    &policy.scope_for(resource_id),
                )),
                _ => None,
            };
            let status = if *method == Method::POST {
                StatusCode::CREATED
            } else if *method == Method::PUT {
                if created {
                    StatusCode::CREATED
                } else {
                    StatusCode::ACCEPTED
                }
            } else if *method == Method::HEAD {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::OK
            };
            let mut response = if *method == Method::HEAD {
                status.into_response()
            } else {
                (status, Json(value.model())).into_response()
            };
            if let Some(tag) = tag {
                if let Ok(header_value) = HeaderValue::from_str(&tag.quoted()) {
                    response.headers_mut().insert(header::ETAG, header_value);
                }
            }
            if let Some(generated) = generated {
                let location = format!("{}/{}", policy.scope(), generated);
                if let Ok(header_value) = HeaderValue::from_str(&location) {
                    response
                        .headers_mut()
                        .insert(header::LOCATION, header_value);
                }
            }
            response
        }
        Outcome::Deleted => StatusCode::NO_CONTENT.into_response(),
        Outcome::NotModified => StatusCode::NOT_MODIFIED.into_response(),
        Outcome::NotFound { gone } => {
            let status = if gone {
                StatusCode::GONE
            } else {
                StatusCode::NOT_FOUND
            };
            ErrorBody::response(status, "resource not found")
        }
        Outcome::PreconditionFailed => {
            ErrorBody::response(StatusCode::PRECONDITION_FAILED, "precondition failed")
        }
        Outcome::Conflict => ErrorBody::response(StatusCode::CONFLICT, "resource already exists"),
        Outcome::UnsupportedOperation => {
            ErrorBody::response(StatusCode::NOT_IMPLEMENTED, "operation not implemented")
        }
        Outcome::InternalFault(message) => {
            tracing::error!(fault = %message, "internal fault while handling request");
            ErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, "internal fault")
        }
    }
}

/// Render the OPTIONS response: 204 with the policy's `Allow` set.
pub fn render_options(policy: &ResourcePolicy) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(header_value) = HeaderValue::from_str(&policy.allow_header()) {
        response.headers_mut().insert(header::ALLOW, header_value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etag;
    use crate::model::ModelVersion;

    fn policy() -> ResourcePolicy {
        ResourcePolicy::new("/note/v1")
    }

    fn ok(version: i64, created: bool, id: Option<&str>) -> Outcome<&'static str> {
        Outcome::Ok {
            value: ModelVersion::new("body", version),
            created,
            id: id.map(str::to_string),
        }
    }

    #[test]
    fn get_ok_carries_quoted_etag() {
        let response = render(&Method::GET, Some("abc"), ok(3, false, None), &policy());
        assert_eq!(response.status(), StatusCode::OK);
        let etag_header = response.headers().get(header::ETAG).unwrap();
        let expected = format!("\"{}\"", etag::encode(3, "/note/v1/abc"));
        assert_eq!(etag_header.to_str().unwrap(), expected);
    }

    #[test]
    fn head_ok_is_no_content_with_etag() {
        let response = render(&Method::HEAD, Some("abc"), ok(1, false, None), &policy());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(header::ETAG));
    }

    #[test]
    fn put_status_splits_on_created() {
        let created = render(&Method::PUT, Some("abc"), ok(1, true, None), &policy());
        assert_eq!(created.status(), StatusCode::CREATED);
        let updated = render(&Method::PUT, Some("abc"), ok(2, false, None), &policy());
        assert_eq!(updated.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn post_ok_carries_location() {
        let response = render(&Method::POST, None, ok(1, true, Some("gen-1")), &policy());
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location.to_str().unwrap(), "/note/v1/gen-1");
    }

    #[test]
    fn not_found_variants() {
        let transient = render::<&str>(&Method::GET, Some("x"), Outcome::NotFound { gone: false }, &policy());
        assert_eq!(transient.status(), StatusCode::NOT_FOUND);
        let permanent = render::<&str>(&Method::GET, Some("x"), Outcome::NotFound { gone: true }, &policy());
        assert_eq!(permanent.status(), StatusCode::GONE);
    }

    #[test]
    fn remaining_status_mapping() {
        let cases: [(Outcome<&str>, StatusCode); 5] = [
            (Outcome::Deleted, StatusCode::NO_CONTENT),
            (Outcome::NotModified, StatusCode::NOT_MODIFIED),
            (Outcome::PreconditionFailed, StatusCode::PRECONDITION_FAILED),
            (Outcome::Conflict, StatusCode::CONFLICT),
            (Outcome::UnsupportedOperation, StatusCode::NOT_IMPLEMENTED),
        ];
        for (outcome, status) in cases {
            let response = render(&Method::GET, Some("x"), outcome, &policy());
            assert_eq!(response.status(), status);
        }
        let fault = render::<&str>(
            &Method::GET,
            Some("x"),
            Outcome::InternalFault("store broke".to_string()),
            &policy(),
        );
        assert_eq!(fault.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn options_advertises_allowed_methods() {
        let response = render_options(&policy());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let allow = response.headers().get(header::ALLOW).unwrap().to_str().unwrap();
        assert!(allow.contains("GET"));
        assert!(allow.contains("DELETE"));
    }

    #[test]
    fn conditional_headers_parse_quoted_and_wildcard() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MATCH, HeaderValue::from_static("\"abc123\""));
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert_eq!(
            if_match_header(&headers),
            Some(EntityTag::Token("abc123".to_string()))
        );
        assert_eq!(if_none_match_header(&headers), Some(EntityTag::Wildcard));
        assert_eq!(if_match_header(&HeaderMap::new()), None);
    }
}
