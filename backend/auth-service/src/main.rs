use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use redis_utils::RedisPool;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_service::config::Config;
use auth_service::grpc::{auth::auth_service_server::AuthServiceServer, AuthServiceImpl};
use auth_service::{AuthService, SessionStore};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,auth_service=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn ready(pool: web::Data<PgPool>, redis: web::Data<RedisPool>) -> impl Responder {
    if let Err(e) = sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        tracing::warn!("Readiness check failed (database): {}", e);
        return HttpResponse::ServiceUnavailable().body("database unavailable");
    }
    if let Err(e) = redis.ping().await {
        tracing::warn!("Readiness check failed (redis): {:#}", e);
        return HttpResponse::ServiceUnavailable().body("redis unavailable");
    }
    HttpResponse::Ok().body("READY")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting auth-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}, grpc_port={}, session_ttl={}s",
        config.app.env, config.app.http_port, config.grpc.port, config.session.ttl_secs
    );

    let pg_pool = db_pool::connect(&config.database)
        .await
        .context("Failed to initialize database")?;

    let redis = RedisPool::connect(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    let sessions = SessionStore::new(redis.manager(), config.session.ttl_secs);
    let service = AuthService::new(pg_pool.clone(), sessions);

    let grpc_addr = format!("{}:{}", config.app.host, config.grpc.port)
        .parse()
        .context("Invalid gRPC address")?;
    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);

    info!("  - HTTP health checks: http://{}", http_addr);
    info!("  - gRPC service: grpc://{}", grpc_addr);

    let mut join_set = JoinSet::new();

    let http_pool = pg_pool.clone();
    let http_redis = redis.clone();
    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(http_pool.clone()))
            .app_data(web::Data::new(http_redis.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(ready))
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .disable_signals()
    .run();

    let http_handle = http_server.handle();
    join_set.spawn(async move {
        http_server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;

    let grpc_service = AuthServiceImpl::new(service);
    join_set.spawn(async move {
        Server::builder()
            .add_service(health_service)
            .add_service(AuthServiceServer::new(grpc_service))
            .serve_with_shutdown(grpc_addr, shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))?;
        // gRPC stopped on signal; take the health server down with it
        http_handle.stop(true).await;
        Ok::<(), anyhow::Error>(())
    });

    info!("auth-service is running");

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("Task failed: {:#}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::error!("Task panicked: {:#}", e);
                return Err(anyhow::anyhow!("Task panicked: {}", e));
            }
        }
    }

    info!("auth-service shut down");
    Ok(())
}
