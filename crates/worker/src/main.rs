//! One-shot runner: process at most one queued transformation and exit.
//!
//! Meant for cron or a scheduler tick. Exit status is `0` when the queue was
//! empty or the job completed, `1` when the claimed job failed, and `2` when
//! the run could not start or the claim itself failed.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restyle_events::{EmailConfig, EmailDelivery, Notifier, NotificationDispatcher};
use restyle_imagegen::{ImageGenConfig, OpenAiImageClient};
use restyle_pipeline::{PgJobStore, Pipeline, RunOutcome};
use restyle_storage::StorageConfig;

/// How long to wait for the preview email before exiting.
const NOTIFY_GRACE: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restyle_worker=debug,restyle_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(RunOutcome::Idle) => {
            tracing::info!("nothing to do");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Completed(job)) => {
            tracing::info!(job_id = %job.job_id, preview_url = %job.preview_url, "processed");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Failed { job_id, error }) => {
            tracing::error!(%job_id, %error, "job failed");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "worker run failed");
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<RunOutcome> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = restyle_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    restyle_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let storage_config = StorageConfig::from_env().context("Invalid storage configuration")?;
    let objects = restyle_storage::connect(&storage_config)
        .await
        .context("Failed to initialise object storage")?;

    let imagegen_config = ImageGenConfig::from_env().context("OPENAI_API_KEY must be set")?;
    let transformer = Arc::new(OpenAiImageClient::new(imagegen_config));

    let notifier: Option<Arc<dyn Notifier>> = match EmailConfig::from_env() {
        Some(config) => Some(Arc::new(
            EmailDelivery::new(config).context("Failed to build email client")?,
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set, preview emails are disabled");
            None
        }
    };
    let notifications = NotificationDispatcher::new(notifier);

    let pipeline = Pipeline::new(
        Arc::new(PgJobStore::new(pool)),
        objects,
        transformer,
        notifications.clone(),
    );

    let outcome = pipeline.run_once().await.context("Failed to claim a job")?;

    // Sends are detached; give them a chance before the runtime goes away.
    notifications.shutdown(NOTIFY_GRACE).await;

    Ok(outcome)
}
