use thiserror::Error;

/// Names under which the run inputs are supplied
pub const ZONE_ID_INPUT: &str = "route53-hosted-zone-id";
pub const DOMAIN_NAME_INPUT: &str = "domain-name";
pub const LOAD_BALANCER_DNS_INPUT: &str = "load-balancer-dns";

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputError {
    #[error("Input required and not supplied: {0}")]
    Missing(&'static str),
}

/// The validated inputs for a single pruning run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunParameters {
    /// Hosted zone id, used verbatim
    pub zone_id: String,
    /// Lowercased domain name. Must match the provider's spelling, including any trailing dot
    pub domain_name: String,
    /// Lowercased DNS name of the load balancer the geolocation records point at
    pub load_balancer_dns: String,
}

impl RunParameters {
    /// Validate and normalize the raw inputs.
    /// Surrounding whitespace is trimmed and blank inputs count as missing.
    pub fn try_new(
        zone_id: Option<&str>,
        domain_name: Option<&str>,
        load_balancer_dns: Option<&str>,
    ) -> Result<RunParameters, InputError> {
        Ok(RunParameters {
            zone_id: required(ZONE_ID_INPUT, zone_id)?.to_owned(),
            domain_name: required(DOMAIN_NAME_INPUT, domain_name)?.to_lowercase(),
            load_balancer_dns: required(LOAD_BALANCER_DNS_INPUT, load_balancer_dns)?
                .to_lowercase(),
        })
    }
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, InputError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(InputError::Missing(name))
}
