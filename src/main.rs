//! Newsroom - a small news publishing site

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsroom::{
    config::Config,
    db,
    services::mail::transport_from_config,
    theme::ThemeEngine,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroom=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Newsroom...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize theme engine
    let theme = ThemeEngine::new(config.templates.path.as_deref())?;
    tracing::info!("Templates loaded");

    let mail_transport = transport_from_config(&config.mail)?;
    tracing::info!("Mail transport: {:?}", config.mail.transport);

    let state = AppState::new(pool.clone(), &config, theme, mail_transport);

    let created = state
        .category_service
        .ensure_defaults(&config.site.default_categories)
        .await?;
    if created > 0 {
        tracing::info!("Created {} default categories", created);
    }

    #[cfg(feature = "demo")]
    seed_demo(&state).await?;

    // Purge expired sessions periodically
    {
        let user_service = state.user_service.clone();
        let every = Duration::from_secs(config.session.cleanup_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = web::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Demo mode: a demo account and a few published items on an empty site
#[cfg(feature = "demo")]
async fn seed_demo(state: &AppState) -> Result<()> {
    use newsroom::models::{CreateNewsInput, NewsFilter};
    use newsroom::services::user::RegisterInput;

    if state.user_service.get_by_username("demo").await?.is_none() {
        tracing::info!("Demo mode: Creating demo user (demo/demo-password)");
        state
            .user_service
            .register(RegisterInput::new("demo", "demo-password"))
            .await?;
    }

    let existing = state
        .news_service
        .list_published(&NewsFilter::published(), None)
        .await?;
    if existing.total > 0 {
        return Ok(());
    }

    let category = match state.category_service.list().await?.into_iter().next() {
        Some(category) => category,
        None => state.category_service.create("General").await?,
    };

    for n in 1..=3 {
        state
            .news_service
            .create(CreateNewsInput::new(
                format!("Demo story {}", n),
                "Nothing happened today, in some detail.",
                category.id,
            ))
            .await?;
    }
    tracing::info!("Demo mode: Seeded demo news");
    Ok(())
}
