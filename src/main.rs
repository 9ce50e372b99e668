use std::{process, sync::Arc};

use pageinsight::{
    application::{
        acquisition::build_source, browse::BrowseService, error::AppError, page::PageService,
        repos::RepoSet,
    },
    cache::{self, CacheConfig},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        insights::build_generator,
        telemetry,
    },
};
use sqlx::PgPool;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    migrate(&pool).await?;
    info!(target = "pageinsight::migrate", "Migrations applied");
    pool.close().await;
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    migrate(&pool).await?;
    let repositories = Arc::new(PostgresRepositories::new(pool));
    repositories
        .health_check()
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let cache = cache::connect(&CacheConfig::from(&settings.cache)).await?;
    let source = build_source(&settings.acquisition.options())
        .map_err(|err| AppError::from(InfraError::http_client(err.to_string())))?;
    let insights = build_generator(&settings.insights)?;
    if settings.insights.api_key.is_none() {
        warn!(
            target = "pageinsight::insights",
            "insights.api_key is not set; insight generation will fail"
        );
    }

    let repos = RepoSet::shared(repositories.clone());
    let state = ApiState::new(
        PageService::new(cache, repos.clone(), source, insights),
        BrowseService::new(repos),
    );

    let result = serve_http(&settings, state).await;
    repositories.close().await;
    result
}

async fn connect_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    PostgresRepositories::run_migrations(pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "pageinsight::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal(grace: std::time::Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(
        target = "pageinsight::http",
        grace_seconds = grace.as_secs(),
        "Shutdown requested; draining connections"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "pageinsight::http",
            "Graceful shutdown timed out; exiting"
        );
        process::exit(1);
    });
}
