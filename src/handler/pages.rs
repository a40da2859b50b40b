//! Static page serving module
//!
//! Holds the fixed route-to-resource table and the page store that reads
//! the bundled HTML documents from the assets directory.

use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::PathBuf;
use tokio::fs;

/// Immutable pairing of a URL path and a bundled resource file name.
///
/// The table is fixed at build time; no entry is created, mutated, or
/// removed while the server runs.
pub struct PageRoute {
    pub path: &'static str,
    pub resource: &'static str,
}

/// The pages this server exposes
pub const PAGE_ROUTES: &[PageRoute] = &[
    PageRoute {
        path: "/",
        resource: "index.html",
    },
    PageRoute {
        path: "/listing",
        resource: "listing.html",
    },
];

/// Find the page registered for an exact request path
pub fn find_page(path: &str) -> Option<&'static PageRoute> {
    PAGE_ROUTES.iter().find(|route| route.path == path)
}

/// Lookup-by-name access to the bundled page documents
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(assets_dir: &str) -> Self {
        Self {
            root: PathBuf::from(assets_dir),
        }
    }

    /// Read a page and decode it as UTF-8 text.
    ///
    /// The whole file is read in a single call, so the handle closes on
    /// every exit path. Malformed UTF-8 is replaced rather than rejected;
    /// the only failure mode is the read itself.
    pub async fn read_page(&self, resource: &str) -> io::Result<String> {
        let bytes = fs::read(self.root.join(resource)).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Serve one registered page.
///
/// Every request performs a fresh read of the underlying file. Success is
/// 200 with the decoded text as the full body; any locate/open/read failure
/// collapses into a generic 500 with no partial content.
pub async fn serve_page(
    ctx: &RequestContext<'_>,
    store: &PageStore,
    route: &PageRoute,
) -> Response<Full<Bytes>> {
    match store.read_page(route.resource).await {
        Ok(body) => http::build_html_response(body, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read page '{}' for route '{}': {e}",
                route.resource, route.path
            ));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs as std_fs;
    use std::path::Path;

    fn assets_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("staticpages-{name}-{}", std::process::id()));
        let _ = std_fs::remove_dir_all(&dir);
        std_fs::create_dir_all(&dir).expect("test assets dir");
        dir
    }

    fn store_for(dir: &Path) -> PageStore {
        PageStore::new(dir.to_str().expect("utf-8 temp path"))
    }

    fn ctx(path: &str, is_head: bool) -> RequestContext<'_> {
        RequestContext { path, is_head }
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[test]
    fn the_two_fixed_routes_are_registered() {
        assert_eq!(PAGE_ROUTES.len(), 2);
        assert_eq!(find_page("/").expect("index route").resource, "index.html");
        assert_eq!(
            find_page("/listing").expect("listing route").resource,
            "listing.html"
        );
        assert!(find_page("/other").is_none());
        // Prefixes are not exact matches
        assert!(find_page("/listing/extra").is_none());
    }

    #[tokio::test]
    async fn read_page_returns_exact_file_content() {
        let dir = assets_dir("read-exact");
        std_fs::write(dir.join("index.html"), "<html>Home</html>").expect("write fixture");

        let store = store_for(&dir);
        let text = store.read_page("index.html").await.expect("read");
        assert_eq!(text, "<html>Home</html>");
    }

    #[tokio::test]
    async fn read_page_missing_file_is_an_io_error() {
        let dir = assets_dir("read-missing");
        let store = store_for(&dir);

        let err = store.read_page("index.html").await.expect_err("no file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_utf8_is_replaced_not_rejected() {
        let dir = assets_dir("read-lossy");
        std_fs::write(dir.join("index.html"), b"<p>\xff</p>").expect("write fixture");

        let store = store_for(&dir);
        let text = store.read_page("index.html").await.expect("read");
        assert_eq!(text, "<p>\u{fffd}</p>");
    }

    #[tokio::test]
    async fn serve_page_success_is_200_html() {
        let dir = assets_dir("serve-ok");
        std_fs::write(dir.join("listing.html"), "<html>Listing</html>").expect("write fixture");

        let store = store_for(&dir);
        let route = find_page("/listing").expect("listing route");
        let resp = serve_page(&ctx("/listing", false), &store, route).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Type").expect("content type"),
            "text/html; charset=utf-8"
        );
        assert_eq!(body_string(resp).await, "<html>Listing</html>");
    }

    #[tokio::test]
    async fn head_gets_headers_without_a_body() {
        let dir = assets_dir("serve-head");
        std_fs::write(dir.join("index.html"), "<html>Home</html>").expect("write fixture");

        let store = store_for(&dir);
        let route = find_page("/").expect("index route");
        let resp = serve_page(&ctx("/", true), &store, route).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Length").expect("length"),
            &"<html>Home</html>".len().to_string()
        );
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn missing_resource_is_500_with_generic_body() {
        let dir = assets_dir("serve-missing");
        let store = store_for(&dir);
        let route = find_page("/listing").expect("listing route");

        let resp = serve_page(&ctx("/listing", false), &store, route).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_string(resp).await, "500 Internal Server Error");
    }

    #[tokio::test]
    async fn routes_fail_independently() {
        let dir = assets_dir("serve-independent");
        std_fs::write(dir.join("index.html"), "<html>Home</html>").expect("write fixture");
        // listing.html deliberately absent

        let store = store_for(&dir);
        let index = find_page("/").expect("index route");
        let listing = find_page("/listing").expect("listing route");

        let resp = serve_page(&ctx("/listing", false), &store, listing).await;
        assert_eq!(resp.status(), 500);

        let resp = serve_page(&ctx("/", false), &store, index).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_string(resp).await, "<html>Home</html>");
    }

    #[tokio::test]
    async fn repeated_requests_return_identical_bodies() {
        let dir = assets_dir("serve-idempotent");
        std_fs::write(dir.join("index.html"), "<html>Home</html>").expect("write fixture");

        let store = store_for(&dir);
        let route = find_page("/").expect("index route");

        let first = body_string(serve_page(&ctx("/", false), &store, route).await).await;
        let second = body_string(serve_page(&ctx("/", false), &store, route).await).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fresh_read_sees_changed_file_content() {
        let dir = assets_dir("serve-fresh");
        std_fs::write(dir.join("index.html"), "<html>v1</html>").expect("write fixture");

        let store = store_for(&dir);
        let route = find_page("/").expect("index route");
        let first = body_string(serve_page(&ctx("/", false), &store, route).await).await;
        assert_eq!(first, "<html>v1</html>");

        std_fs::write(dir.join("index.html"), "<html>v2</html>").expect("rewrite fixture");
        let second = body_string(serve_page(&ctx("/", false), &store, route).await).await;
        assert_eq!(second, "<html>v2</html>");
    }
}
