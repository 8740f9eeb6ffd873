use clap::Parser;
use tracing::{error, info};

use codeartifact_dependabot_rotator::auth::AppTokenMinter;
use codeartifact_dependabot_rotator::codeartifact::TokenSource;
use codeartifact_dependabot_rotator::config::Settings;
use codeartifact_dependabot_rotator::error::AppError;
use codeartifact_dependabot_rotator::github::GitHubClient;
use codeartifact_dependabot_rotator::metrics;
use codeartifact_dependabot_rotator::rotation::Rotator;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("codeartifact_dependabot_rotator=info".parse().unwrap()),
        )
        .init();

    let settings = Settings::parse();
    settings.validate()?;

    let recorder = metrics::init_metrics(&settings.metrics_addr)?;

    let minter = AppTokenMinter::new(&settings.github_app_id, &settings.github_private_key)?;
    let github = GitHubClient::new(minter);

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let tokens = TokenSource::new(
        &sdk_config,
        &settings.codeartifact_domain,
        &settings.codeartifact_domain_owner,
        settings.token_duration,
    );

    let rotator = Rotator::new(
        tokens,
        github,
        settings.organization.clone(),
        settings.organization_owner.clone(),
        recorder,
    );

    info!(
        org = %settings.organization,
        domain = %settings.codeartifact_domain,
        "starting dependabot secret rotation loop"
    );

    if let Err(e) = rotator.run_forever(shutdown_signal()).await {
        error!(error = %e, "rotation loop aborted");
        return Err(e);
    }

    info!("rotator shut down cleanly");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
