use clap::{Parser, ValueEnum};
use log::LevelFilter;

// GitHub Actions passes action inputs as INPUT_<NAME>, with the name uppercased and hyphens kept
macro_rules! env_prefix {
    () => {
        "INPUT_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Id of the Route53 hosted zone holding the records
    #[arg(
        long = "route53-hosted-zone-id",
        value_name = "ZONE_ID",
        env = concat!(env_prefix!(), "ROUTE53-HOSTED-ZONE-ID")
    )]
    pub zone_id: Option<String>,

    /// Domain whose geolocation records are pruned, spelled as stored in the zone (usually with a trailing dot)
    #[arg(
        long,
        value_name = "DOMAIN",
        env = concat!(env_prefix!(), "DOMAIN-NAME")
    )]
    pub domain_name: Option<String>,

    /// DNS name of the load balancer the stale geolocation records point at
    #[arg(
        long,
        value_name = "DNS_NAME",
        env = concat!(env_prefix!(), "LOAD-BALANCER-DNS")
    )]
    pub load_balancer_dns: Option<String>,

    /// AWS region to send Route53 requests to.
    /// Uses the default AWS region chain if not specified
    #[arg(
        long,
        value_name = "REGION",
        env = concat!(env_prefix!(), "AWS-REGION")
    )]
    pub aws_region: Option<String>,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// Do not delete any records, only show what would be deleted
    #[arg(
        long,
        short = 'd',
        action,
        default_value_t = false,
        env = concat!(env_prefix!(), "DRY-RUN")
    )]
    pub dry_run: bool,
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn should_be_valid_command() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_flags() {
        let cli = Cli::try_parse_from([
            "route53-geo-pruner",
            "--route53-hosted-zone-id",
            "Z0123",
            "--domain-name",
            "app.example.com.",
            "--load-balancer-dns",
            "lb.example.com.",
            "--loglevel",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.zone_id.as_deref(), Some("Z0123"));
        assert_eq!(cli.domain_name.as_deref(), Some("app.example.com."));
        assert_eq!(cli.load_balancer_dns.as_deref(), Some("lb.example.com."));
        assert_eq!(LevelFilter::from(cli.loglevel), LevelFilter::Debug);
        assert!(cli.dry_run);
    }
}
