use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use tokio::task::JoinHandle;

use crate::configuration::Settings;
use crate::logger::LoggerMiddleware;
use crate::middleware::{JwtMiddleware, SessionCheckMiddleware};
use crate::routes::{
    get_current_user, health_check, home, json_error_handler, login, logout, not_found, refresh,
    register,
};
use crate::session::{self, Authenticator, SessionStore, SWEEP_INTERVAL};

pub fn run(listener: TcpListener, pool: PgPool, settings: &Settings) -> Result<Server, std::io::Error> {
    let authenticator = Authenticator::new(pool.clone(), &settings.jwt, settings.session.mode);

    let pool = web::Data::new(pool);
    let authenticator_data = web::Data::new(authenticator.clone());
    let application = web::Data::new(settings.application.clone());

    tracing::info!(mode = ?settings.session.mode, "Session mode configured");

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())      // Access log
            .wrap(LoggerMiddleware)       // Request id + timing

            // Shared state
            .app_data(pool.clone())
            .app_data(authenticator_data.clone())
            .app_data(application.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))

            // Public routes
            .route("/", web::get().to(home))
            .route("/healthz", web::get().to(health_check))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/users", web::post().to(register))

            // Protected routes: access token first, then the server-side session
            .service(
                web::scope("/users")
                    .wrap(SessionCheckMiddleware::new(authenticator.clone()))
                    .wrap(JwtMiddleware::new(authenticator.clone()))
                    .route("/me", web::get().to(get_current_user)),
            )

            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Start the hourly expired-session sweep over `pool`.
pub fn spawn_session_sweeper(pool: PgPool) -> JoinHandle<()> {
    session::spawn_session_sweeper(SessionStore::new(pool), SWEEP_INTERVAL)
}
