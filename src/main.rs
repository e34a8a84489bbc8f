use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;

use desprendibles::config::{Config, StoreBackend};
use desprendibles::db::init_db;
use desprendibles::docs::ApiDoc;
use desprendibles::repository::{
    MemoryPayslipRepository, MySqlPayslipRepository, PayslipRepository,
};
use desprendibles::routes;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Desprendibles de nómina"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = ?config.store_backend, api_path = %config.api_path, "Server starting...");

    let repo: Arc<dyn PayslipRepository> = match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = init_db(url)
                .await
                .context("Failed to connect to database")?;
            Arc::new(MySqlPayslipRepository::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory payslip store; uploads are lost on restart");
            Arc::new(MemoryPayslipRepository::new())
        }
    };

    let server_addr = config.server_addr.clone();
    let repo = Data::from(repo);
    let limiter = routes::build_limiter(config.rate_per_min);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(repo.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, limiter.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
