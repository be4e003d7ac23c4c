//! Static client assets served from disk.
//!
//! `GET /` answers with `index.html`; any other unmatched path is looked up
//! relative to the static directory.

use std::path::Path;

use tower_http::services::ServeDir;

/// File service rooted at `dir`.
pub fn static_service(dir: &Path) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(true)
}
