mod cli;

use std::process::ExitCode;

use clap::Parser;

use env_logger::Builder;
use log::{error, info};

use route53_geo_pruner::{
    config::RunParameters,
    provider::{Route53Provider, Route53ProviderConfig},
    pruner::{PruneError, Pruner},
};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    Builder::new().filter_level(cli.loglevel.into()).init();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), PruneError> {
    // Validate everything before talking to AWS
    let params = RunParameters::try_new(
        cli.zone_id.as_deref(),
        cli.domain_name.as_deref(),
        cli.load_balancer_dns.as_deref(),
    )?;

    if cli.dry_run {
        info!("Running in dry-run mode, no records will be deleted");
    }

    let provider = Route53Provider::from_config(&Route53ProviderConfig {
        region: cli.aws_region.as_deref(),
    })
    .await;
    info!("Created Route53 client");

    let summary = Pruner::new(provider.as_ref(), cli.dry_run)
        .prune_geolocation_records(&params)
        .await?;

    info!(
        "Completed, {} of {} records {}",
        summary.deleted.len(),
        summary.fetched,
        if summary.dry_run {
            "would have been deleted"
        } else {
            "deleted"
        }
    );
    Ok(())
}
