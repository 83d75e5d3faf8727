use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use persistence::blog_store::BlogStore;
use shared::jwt::JwtError;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin, admin_blog, admin_newsletter, ai, blog, health, leads, newsletter, tools,
};
use crate::services::{AiClient, AiError, AdminSessions, DripDispatcher, EmailError, EmailService};

/// Failures while wiring services from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("email service: {0}")]
    Email(#[from] EmailError),

    #[error("AI client: {0}")]
    Ai(#[from] AiError),

    #[error("admin sessions: {0}")]
    Session(#[from] JwtError),
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub email: EmailService,
    pub ai: AiClient,
    pub blog: BlogStore,
    pub sessions: AdminSessions,
    pub drip: DripDispatcher,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, StartupError> {
        let rate_limiter = RateLimiterState::new(
            config.security.rate_limit_per_minute,
            config.security.trust_forwarded_for,
        )
        .map(Arc::new);

        let email = EmailService::new(config.email.clone())?;
        let ai = AiClient::new(config.ai.clone())?;
        let sessions = AdminSessions::new(&config.admin)?;
        let blog = BlogStore::new(&config.content.blog_dir);
        let drip = DripDispatcher::new(
            pool.clone(),
            email.clone(),
            config.site.clone(),
            config.drip.batch_size,
        );

        Ok(Self {
            pool,
            config: Arc::new(config),
            rate_limiter,
            email,
            ai,
            blog,
            sessions,
            drip,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Forms, calculators and AI: rate limited per client IP.
    let limited_routes = Router::new()
        .route("/api/tools/loan", post(tools::loan))
        .route("/api/tools/savings", post(tools::savings))
        .route("/api/tools/tax", post(tools::tax))
        .route("/api/tools/resp", post(tools::resp))
        .route("/api/tools/cpp", post(tools::cpp))
        .route("/api/tools/lead", post(leads::submit_tool_lead))
        .route("/api/contact", post(leads::submit_contact))
        .route("/api/ai/summary", post(ai::summarize))
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
        .route("/api/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/blog", get(blog::list_posts))
        .route("/api/blog/:slug", get(blog::get_post))
        .route("/metrics", get(metrics_handler));

    // Login is rate limited too, against password guessing.
    let session_routes = Router::new()
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/leads", get(admin::list_leads))
        .route("/api/admin/leads/:id", patch(admin::update_lead))
        .route("/api/admin/events", get(admin::list_events))
        .route(
            "/api/admin/blog",
            get(admin_blog::list_posts).post(admin_blog::create_post),
        )
        .route(
            "/api/admin/blog/:slug",
            get(admin_blog::get_post)
                .put(admin_blog::update_post)
                .delete(admin_blog::delete_post),
        )
        .route(
            "/api/admin/newsletter/subscribers",
            get(admin_newsletter::list_subscribers),
        )
        .route(
            "/api/admin/newsletter/posts",
            get(admin_newsletter::list_posts).post(admin_newsletter::create_post),
        )
        .route(
            "/api/admin/newsletter/posts/:id",
            put(admin_newsletter::update_post).delete(admin_newsletter::delete_post),
        )
        .route(
            "/api/admin/newsletter/posts/:id/send",
            post(admin_newsletter::send_post),
        )
        .route("/api/admin/drip/process", post(admin::process_drip))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(limited_routes)
        .merge(session_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            config.security.hsts_enabled,
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
