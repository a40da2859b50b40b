//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, page route
//! matching, and response dispatch.

use crate::config::AppState;
use crate::handler::pages::{self, PageStore};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for page serving
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let is_head = method == Method::HEAD;

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        method.to_string(),
        uri.path().to_string(),
    );
    entry.query = uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_value(&req, hyper::header::REFERER);
    entry.user_agent = header_value(&req, hyper::header::USER_AGENT);

    let response = if let Some(resp) = check_http_method(&method) {
        resp
    } else {
        let ctx = RequestContext {
            path: uri.path(),
            is_head,
        };
        route_request(&ctx, &state.store).await
    };

    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if state.config.logging.access_log {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and answer non-GET/HEAD methods directly
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request to the page registered for its exact path
async fn route_request(ctx: &RequestContext<'_>, store: &PageStore) -> Response<Full<Bytes>> {
    match pages::find_page(ctx.path) {
        Some(route) => pages::serve_page(ctx, store, route).await,
        None => http::build_404_response(),
    }
}

fn header_value(req: &Request<Incoming>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_head_pass_the_method_gate() {
        assert!(check_http_method(&Method::GET).is_none());
        assert!(check_http_method(&Method::HEAD).is_none());
    }

    #[test]
    fn options_is_answered_directly() {
        let resp = check_http_method(&Method::OPTIONS).expect("OPTIONS response");
        assert_eq!(resp.status(), 204);
        assert_eq!(
            resp.headers().get("Allow").expect("allow header"),
            "GET, HEAD, OPTIONS"
        );
    }

    #[test]
    fn mutating_methods_are_not_allowed() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let resp = check_http_method(&method).expect("405 response");
            assert_eq!(resp.status(), 405);
        }
    }

    #[tokio::test]
    async fn unregistered_path_is_404() {
        let store = PageStore::new("templates");
        let ctx = RequestContext {
            path: "/no-such-page",
            is_head: false,
        };
        let resp = route_request(&ctx, &store).await;
        assert_eq!(resp.status(), 404);
    }

    #[test]
    fn version_labels_match_the_log_format() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
