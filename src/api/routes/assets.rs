//! Static assets
//!
//! - GET /css/style.css

use axum::{http::header, response::IntoResponse};

const STYLESHEET: &str = r#"
:root { --sand: #f4ede4; --terracotta: #c0704f; --ink: #3b2f2a; }
body { margin: 0; font-family: Georgia, serif; color: var(--ink); background: var(--sand); }
header, footer { padding: 1rem 2rem; background: #fff; }
main { padding: 2rem; min-height: 60vh; }
a { color: var(--terracotta); }
.btn { padding: .5rem 1rem; border: 1px solid var(--ink); background: none; cursor: pointer; }
.btn-primary { background: var(--terracotta); border-color: var(--terracotta); color: #fff; }
.product-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1.5rem; }
.product-card img { width: 100%; }
.field .error { color: #a33; font-size: .9rem; }
#toast .toast { position: fixed; right: 1rem; bottom: 1rem; padding: 1rem; background: #fff; }
#toast .toast.error { border-left: 4px solid #a33; }
#toast .toast.success { border-left: 4px solid #4a7; }
"#;

/// GET /css/style.css
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
