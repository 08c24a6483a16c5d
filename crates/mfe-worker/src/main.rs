//! Moment publishing worker binary.
//!
//! Drains the job queue once and exits: 0 when the queue is empty,
//! 1 after the first failure has been escalated.

use std::process::ExitCode;

use tracing::{info, warn};

use mfe_queue::SnsNotifier;
use mfe_worker::context::load_aws_config;
use mfe_worker::logging::init_tracing;
use mfe_worker::{
    escalate, run_to_completion, Credentials, Escalation, Services, WorkerConfig, WorkerContext,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    dotenvy::dotenv().ok();
    init_tracing();

    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting mfe-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let sdk_config = load_aws_config(&config.aws_region).await;
    let startup_notifier = SnsNotifier::new(&sdk_config);

    let credentials = match Credentials::load(&config.credentials_path) {
        Ok(credentials) => credentials,
        Err(e) => {
            let escalation = Escalation::without_job(e);
            return escalate(&startup_notifier, &config.job_failed_topic, &escalation)
                .await
                .into();
        }
    };

    let services = match Services::connect(&sdk_config, &config, &credentials) {
        Ok(services) => services,
        Err(e) => {
            let escalation = Escalation::without_job(e);
            return escalate(&startup_notifier, &config.job_failed_topic, &escalation)
                .await
                .into();
        }
    };

    let ctx = WorkerContext::new(config, credentials, services);
    run_to_completion(&ctx).await.into()
}
