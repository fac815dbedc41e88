pub mod network;
pub mod platform;
pub mod users;

pub async fn health() -> &'static str {
    "OK"
}
