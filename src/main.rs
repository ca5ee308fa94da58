use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use media_processor::application::services::{
    Dispatcher, JobLifecycle, JobService, PoolContext, PriorityRouter,
};
use media_processor::infrastructure::observability::{TracingConfig, init_tracing};
use media_processor::infrastructure::persistence::RepositoryFactory;
use media_processor::infrastructure::workload::SimulatedWorkload;
use media_processor::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));

    let repositories = RepositoryFactory::create(&settings.database)
        .await
        .context("Failed to initialize job store")?;

    let lifecycle = Arc::new(JobLifecycle::new(Arc::clone(&repositories.jobs)));
    let router = PriorityRouter::new(
        settings.scheduler.high_priority_workers,
        settings.scheduler.low_priority_workers,
    );

    let shutdown = CancellationToken::new();
    let (dispatcher, workers) = Dispatcher::start(
        router,
        settings.scheduler.queue_capacity,
        PoolContext {
            lifecycle: Arc::clone(&lifecycle),
            metrics_repository: Arc::clone(&repositories.metrics),
            workload: Arc::new(SimulatedWorkload::from_settings(&settings.workload)),
            shutdown: shutdown.clone(),
        },
    );
    let dispatcher = Arc::new(dispatcher);

    let job_service = Arc::new(JobService::new(
        lifecycle,
        Arc::clone(&repositories.jobs),
        Arc::clone(&repositories.metrics),
        Arc::clone(&dispatcher),
    ));

    job_service
        .recover()
        .await
        .context("Failed to recover jobs from a previous run")?;

    let app = create_router(AppState {
        job_service,
        dispatcher,
    });

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(
        %addr,
        workers = workers.worker_count(),
        environment = %environment,
        "Listening"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    tracing::info!("Waiting for in-flight jobs to finish");
    workers.wait_for_shutdown().await;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
