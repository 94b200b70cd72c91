pub mod chat;
pub mod home;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
