use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_gateway::clients::ServiceClients;
use api_gateway::config::Config;
use api_gateway::csrf::CsrfTokens;
use api_gateway::middleware::{CsrfMiddleware, SessionMiddleware, SessionValidator};
use api_gateway::rest_api::{self, ApiSettings};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,api_gateway=debug".into());
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

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting api-gateway");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, port={}, secure_cookies={}, csrf_ttl={}s",
        config.server.env, config.server.port, config.cookies.secure, config.csrf.ttl_secs
    );

    let clients = ServiceClients::new(&config.services, config.upload.max_bytes)
        .context("Failed to build service clients")?;
    let validator: Arc<dyn SessionValidator> = Arc::new(clients.clone());
    let csrf_tokens = Arc::new(
        CsrfTokens::new(config.csrf.secret.as_bytes(), config.csrf.ttl_secs)
            .context("Failed to initialize CSRF tokens")?,
    );
    let settings = ApiSettings {
        secure_cookies: config.cookies.secure,
        max_upload_bytes: config.upload.max_bytes,
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("  - REST API: http://{}/api/v1", bind_addr);
    info!("  - auth-service: {}", config.services.auth_url);
    info!("  - user-service: {}", config.services.user_url);
    info!("  - event-service: {}", config.services.event_url);
    info!("  - image-service: {}", config.services.image_url);
    info!("  - csat-service: {}", config.services.csat_url);

    HttpServer::new(move || {
        App::new()
            // Session must resolve before the CSRF check runs
            .wrap(CsrfMiddleware::new(csrf_tokens.clone(), settings.secure_cookies))
            .wrap(SessionMiddleware::new(validator.clone()))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(clients.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(api_gateway::json_config())
            .app_data(api_gateway::query_config())
            .route("/health", web::get().to(api_gateway::health))
            .configure(rest_api::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("api-gateway shut down");
    Ok(())
}
