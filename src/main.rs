use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tutorexam_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/google", post(routes::auth::google_login));

    let account_api = Router::new()
        .route(
            "/api/auth/me",
            get(routes::auth::me).patch(routes::auth::update_me),
        )
        .route("/api/auth/password", put(routes::auth::change_password))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let tutor_api = Router::new()
        .route(
            "/api/exams",
            get(routes::exams::list_exams).post(routes::exams::create_exam),
        )
        .route(
            "/api/exams/:id",
            get(routes::exams::get_exam)
                .patch(routes::exams::update_exam)
                .delete(routes::exams::delete_exam),
        )
        .route(
            "/api/exams/:id/responses",
            get(routes::responses::list_exam_responses),
        )
        .route("/api/exams/:id/stats", get(routes::reports::exam_stats))
        .route("/api/responses/:id", get(routes::responses::get_response))
        .route(
            "/api/responses/:id/score",
            axum::routing::patch(routes::responses::set_score),
        )
        .route("/api/reports/overview", get(routes::reports::overview))
        .route("/api/reports/students", get(routes::reports::students))
        .layer(axum::middleware::from_fn(middleware::auth::require_tutor));

    let public_api = Router::new()
        .route(
            "/api/public/exams/:token",
            get(routes::public::get_exam_by_token),
        )
        .route(
            "/api/public/exams/:token/submit",
            post(routes::public::submit_response),
        );

    let app = base_routes
        .merge(auth_api)
        .merge(account_api)
        .merge(tutor_api)
        .merge(public_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
