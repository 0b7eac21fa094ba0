//! Savvy Web Server
//!
//! Axum-based REST API for the Savvy savings leaderboard.
//!
//! Security features:
//! - Trusted-proxy header, API key, or trusted-network authentication (use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Audit logging for every authenticated request
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use savvy_core::source::{AggregatorClient, TransactionSource};
use savvy_core::Database;

mod handlers;

/// Maximum audit log page size
pub const MAX_AUDIT_LIMIT: i64 = 1000;

/// Header carrying the user identity asserted by the authenticating proxy
pub const AUTH_USER_HEADER: &str = "x-authenticated-user";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as `Authorization: Bearer <key>`
    pub api_keys: Vec<String>,
    /// Networks whose clients skip authentication (e.g. "192.168.1.0/24")
    pub trusted_networks: Vec<ipnet::IpNet>,
    /// Proxies whose user, X-Forwarded-For and X-Real-IP headers are believed
    pub trusted_proxies: Vec<ipnet::IpNet>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            trusted_networks: vec![],
            trusted_proxies: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Bank transaction source; `None` when no aggregator is configured
    pub source: Option<Arc<dyn TransactionSource>>,
}

/// Identity used when no user is asserted (auth disabled or trusted network)
pub const LOCAL_USER: &str = "local-dev";

/// Identity given to `Bearer` API key callers
pub const API_KEY_USER: &str = "api-key";

/// How a request's identity was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `x-authenticated-user` set by a trusted proxy
    ProxyHeader,
    TrustedNetwork,
    ApiKey,
    /// Authentication disabled
    None,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ProxyHeader => "proxy_header",
            AuthMethod::TrustedNetwork => "trusted_network",
            AuthMethod::ApiKey => "api_key",
            AuthMethod::None => "none",
        }
    }
}

/// The caller, resolved once by `auth_middleware` and stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub method: AuthMethod,
}

impl Identity {
    fn new(user: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            user: user.into(),
            method,
        }
    }
}

/// Authentication middleware for the protected API routes
///
/// Accepts, in order:
/// 1. A non-empty `x-authenticated-user` header, only when the TCP peer is a trusted proxy
/// 2. Clients inside `trusted_networks` (peer address, or X-Forwarded-For from a trusted proxy)
/// 3. `Authorization: Bearer <key>` matching a configured API key (constant-time compare)
///
/// With auth disabled the user header is taken as-is for local development.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<axum::extract::ConnectInfo<std::net::SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = if state.config.require_auth {
        match authenticate(&state.config, &request, connect_info.as_ref()) {
            Some(identity) => identity,
            None => {
                warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
                return AppError::unauthorized("Authentication required").into_response();
            }
        }
    } else {
        let user = header_user(request.headers()).unwrap_or(LOCAL_USER);
        Identity::new(user, AuthMethod::None)
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn authenticate(
    config: &ServerConfig,
    request: &Request,
    connect_info: Option<&axum::extract::ConnectInfo<std::net::SocketAddr>>,
) -> Option<Identity> {
    let path = request.uri().path();
    let peer_ip = connect_info.map(|ci| ci.0.ip());

    if let Some(user) = header_user(request.headers()) {
        let from_proxy = peer_ip
            .map(|ip| is_ip_trusted(&ip, &config.trusted_proxies))
            .unwrap_or(false);
        if from_proxy {
            info!(user = %user, path = %path, "Authenticated via proxy header");
            return Some(Identity::new(user, AuthMethod::ProxyHeader));
        }
        warn!(?peer_ip, path = %path, "Ignoring user header from untrusted peer");
    }

    if !config.trusted_networks.is_empty() {
        let client_ip = get_client_ip(request, connect_info, &config.trusted_proxies);
        tracing::debug!(?client_ip, path = %path, "Checking trusted network auth");

        if let Some(ip) = client_ip {
            if is_ip_trusted(&ip, &config.trusted_networks) {
                info!(ip = %ip, path = %path, "Authenticated via trusted network");
                return Some(Identity::new(LOCAL_USER, AuthMethod::TrustedNetwork));
            }
        }
    }

    let api_key_valid = bearer_token(request.headers())
        .map(|key| validate_api_key(key, &config.api_keys))
        .unwrap_or(false);
    if api_key_valid {
        info!(user = API_KEY_USER, path = %path, "Authenticated via API key");
        return Some(Identity::new(API_KEY_USER, AuthMethod::ApiKey));
    }

    None
}

fn header_user(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

/// Validate an API key against the configured keys in constant time
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();
    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Extract client IP address, respecting trusted proxies
///
/// X-Forwarded-For and X-Real-IP are only read when the TCP peer is a trusted
/// proxy; otherwise the peer address is used as-is.
pub(crate) fn get_client_ip(
    request: &Request,
    connect_info: Option<&axum::extract::ConnectInfo<std::net::SocketAddr>>,
    trusted_proxies: &[ipnet::IpNet],
) -> Option<std::net::IpAddr> {
    let peer_ip = connect_info.map(|ci| ci.0.ip())?;

    if !trusted_proxies.iter().any(|net| net.contains(&peer_ip)) {
        return Some(peer_ip);
    }

    // "client, proxy1, proxy2": the first hop is the original client
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());
    if forwarded.is_some() {
        return forwarded;
    }

    request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok())
        .or(Some(peer_ip))
}

fn is_ip_trusted(ip: &std::net::IpAddr, trusted_networks: &[ipnet::IpNet]) -> bool {
    trusted_networks.iter().any(|network| network.contains(ip))
}

/// Parse a comma-separated list of IP addresses and CIDR networks
///
/// Examples:
/// - "192.168.1.0/24" - entire subnet
/// - "10.0.0.5" - single IP (/32 for IPv4, /128 for IPv6)
/// - "192.168.1.0/24,10.0.0.0/8" - multiple networks
pub fn parse_trusted_networks(input: &str) -> Vec<ipnet::IpNet> {
    input
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(net) = s.parse::<ipnet::IpNet>() {
                return Some(net);
            }
            if let Ok(ip) = s.parse::<std::net::IpAddr>() {
                return Some(ipnet::IpNet::from(ip));
            }
            warn!(input = s, "Failed to parse trusted network entry");
            None
        })
        .collect()
}

/// Identity used for data ownership and audit logging
///
/// Reads the `Identity` attached by `auth_middleware`; requests that never
/// passed through it count as the local user.
pub fn get_username(request: &Request) -> String {
    request
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.user.clone())
        .unwrap_or_else(|| LOCAL_USER.to_string())
}

/// Create the application router, using the aggregator configured in the environment
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let source = AggregatorClient::from_env().map(|c| Arc::new(c) as Arc<dyn TransactionSource>);
    if source.is_none() {
        info!("ℹ️  Bank aggregator not configured (set PLAID_CLIENT_ID and PLAID_SECRET to enable bank insights)");
    }
    create_router_with_source(db, config, source)
}

/// Create the application router with an explicit transaction source (for testing)
pub fn create_router_with_source(
    db: Database,
    config: ServerConfig,
    source: Option<Arc<dyn TransactionSource>>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        source,
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/leaderboard", get(handlers::get_leaderboard));

    let protected_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Scores
        .route("/score", post(handlers::submit_score))
        .route("/financial-data", post(handlers::submit_financial_data))
        .route("/financial-data/recent", get(handlers::get_recent_financial_data))
        // Profile
        .route(
            "/profile",
            get(handlers::get_profile).post(handlers::update_profile),
        )
        // Learning
        .route("/lessons", get(handlers::get_lessons))
        .route("/badges", get(handlers::get_badges))
        // Insight engine
        .route("/insights/summary", post(handlers::summarize_transactions))
        .route("/insights/trends", post(handlers::analyze_transaction_trends))
        // Connected bank
        .route("/bank/link", put(handlers::link_bank))
        .route("/bank/disconnect", post(handlers::disconnect_bank))
        .route("/bank/transactions", get(handlers::get_bank_transactions))
        .route("/bank/insights", get(handlers::get_bank_insights))
        // Audit log
        .route("/audit", get(handlers::list_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
    let allowed_headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::HeaderName::from_static(AUTH_USER_HEADER),
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Same-origin only
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server with the default (authenticated) configuration
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    let app = create_router(db, config)
        .into_make_service_with_connect_info::<std::net::SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn bad_gateway(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_GATEWAY, msg)
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    /// Map a core error, exposing validation messages and hiding the rest
    pub fn from_core(err: savvy_core::Error) -> Self {
        use savvy_core::Error;

        match err {
            Error::InvalidData(msg) => Self::bad_request(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Source(_) | Error::Http(_) => Self {
                internal: Some(err.into()),
                ..Self::bad_gateway("Failed to fetch bank transactions")
            },
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Generic message to the client, full error to the log
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}
