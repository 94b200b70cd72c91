//! Static homepage handler.

use axum::response::Html;

/// Serves the embedded chat page.
pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
