use actix_web::{middleware, web, App, HttpServer};
use messaging_service::{
    config::Config,
    db,
    handlers::{
        conversations::register_routes as register_conversations,
        messages::register_routes as register_messages,
    },
    metrics,
    state::AppState,
};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting messaging service");

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let db_pool = match db::init_pool(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Successfully connected to database");
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Database connection failed",
            ));
        }
    };

    // Schema is owned by this service; apply pending migrations before binding.
    db::MIGRATOR.run(&db_pool).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        io::Error::new(io::ErrorKind::Other, "Database migration failed")
    })?;

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let state = AppState {
        db: db_pool,
        config: Arc::new(config),
    };

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(|cfg| {
                register_conversations(cfg);
                register_messages(cfg);
            })
    })
    .bind(&addr)?
    .run()
    .await
}
