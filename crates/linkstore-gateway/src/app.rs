//! Router assembly and shared state.

use crate::handlers::{self, network, platform, users};
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use linkstore_core::{
    ConfigEntries, ConnectionService, KvAdapter, LockManager, NetworkConfig, NetworkInsights, ProfileService,
    ServiceRegistry, UserDirectory,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// One instance of every service, all sharing the same store handle.
pub struct AppState {
    pub users: UserDirectory,
    pub config_entries: ConfigEntries,
    pub registry: ServiceRegistry,
    pub locks: LockManager,
    pub profiles: ProfileService,
    pub connections: ConnectionService,
    pub insights: NetworkInsights,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(kv: KvAdapter, network: &NetworkConfig) -> Self {
        Self {
            users: UserDirectory::new(kv.clone()),
            config_entries: ConfigEntries::new(kv.clone()),
            registry: ServiceRegistry::new(kv.clone()),
            locks: LockManager::new(kv.clone()),
            profiles: ProfileService::new(kv.clone(), network),
            connections: ConnectionService::new(kv.clone()),
            insights: NetworkInsights::new(kv, network),
        }
    }
}

pub fn build_app(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // users
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/buscar", get(users::search_users))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // platform
        .route("/config/:key", get(platform::get_config).put(platform::put_config))
        .route("/servicos/registrar", post(platform::register_service))
        .route("/servicos/:name", get(platform::list_service))
        .route("/servicos/:name/:instance", axum::routing::delete(platform::deregister_service))
        .route(
            "/lock/:resource",
            post(platform::acquire_lock)
                .get(platform::inspect_lock)
                .delete(platform::release_lock),
        )
        // network
        .route("/perfis", post(network::create_profile).get(network::list_profiles))
        .route(
            "/perfis/:id",
            get(network::get_profile)
                .put(network::update_profile)
                .delete(network::delete_profile),
        )
        .route("/perfis/:id/recomendacoes", get(network::recommendations))
        .route("/perfis/:id/conexoes", get(network::profile_connections))
        .route("/buscar/habilidade/:skill", get(network::search_by_skill))
        .route("/habilidades", get(network::list_skills))
        .route(
            "/conexoes",
            post(network::create_connection).get(network::list_connections),
        )
        .route(
            "/conexoes/:id",
            get(network::get_connection)
                .put(network::update_connection)
                .delete(network::delete_connection),
        )
        .route("/dashboard", get(network::dashboard))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(cors)
}

async fn log_request(ConnectInfo(addr): ConnectInfo<SocketAddr>, request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        target: "linkstore::gateway",
        client = %addr,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
