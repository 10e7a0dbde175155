use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::task::JoinSet;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_service::config::Config;
use image_service::grpc::{image::image_service_server::ImageServiceServer, ImageServiceImpl};
use image_service::ImageStore;

/// Headroom over the image limit for the rest of the protobuf message
const MESSAGE_OVERHEAD: usize = 64 * 1024;

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
        .unwrap_or_else(|_| "info,image_service=debug".into());
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

async fn ready(dir: web::Data<PathBuf>) -> impl Responder {
    match tokio::fs::metadata(dir.get_ref()).await {
        Ok(meta) if meta.is_dir() => HttpResponse::Ok().body("READY"),
        Ok(_) => HttpResponse::ServiceUnavailable().body("storage is not a directory"),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().body("storage unavailable")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting image-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}, grpc_port={}, max_bytes={}",
        config.app.env, config.app.http_port, config.grpc.port, config.storage.max_bytes
    );

    let store = ImageStore::open(&config.storage)
        .await
        .context("Failed to open image storage")?;
    let storage_dir = store.dir().clone();

    let grpc_addr = format!("{}:{}", config.app.host, config.grpc.port)
        .parse()
        .context("Invalid gRPC address")?;
    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);

    info!("  - HTTP health checks: http://{}", http_addr);
    info!("  - gRPC service: grpc://{}", grpc_addr);

    let mut join_set = JoinSet::new();

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage_dir.clone()))
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
        .set_serving::<ImageServiceServer<ImageServiceImpl>>()
        .await;

    let message_limit = config.storage.max_bytes + MESSAGE_OVERHEAD;
    let grpc_service = ImageServiceServer::new(ImageServiceImpl::new(store))
        .max_decoding_message_size(message_limit)
        .max_encoding_message_size(message_limit);

    join_set.spawn(async move {
        Server::builder()
            .add_service(health_service)
            .add_service(grpc_service)
            .serve_with_shutdown(grpc_addr, shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))?;
        // gRPC stopped on signal; take the health server down with it
        http_handle.stop(true).await;
        Ok::<(), anyhow::Error>(())
    });

    info!("image-service is running");

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

    info!("image-service shut down");
    Ok(())
}
