mod traits;

use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};
use aws_sdk_route53::{
    config::Region,
    error::DisplayErrorContext,
    types::{Change, ChangeAction, ChangeBatch, ResourceRecordSet, RrType},
    Client,
};
use log::{debug, trace};

use super::{DnsRecord, PageCursor, Provider, ProviderError, RecordPage, RecordType};

// Route53 is a global service. Its API is served from this region
const ROUTE53_HOME_REGION: &str = "us-east-1";

/// A [`Provider`] connecting to the AWS Route53 API for listing and deleting resource record sets.
///
/// Credentials are taken from the standard AWS provider chain (environment, profile, instance role, ...).
/// To create a provider, use the [`Route53Provider::from_config()`] function,
/// or wrap an existing client with [`Route53Provider::new()`].
#[non_exhaustive]
pub struct Route53Provider {
    client: Client,
}

/// Configuration object for a [`Route53Provider`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Route53ProviderConfig<'a> {
    /// AWS region to send requests to.
    /// Falls back to the default region chain, then to the Route53 home region
    pub region: Option<&'a str>,
}

impl Route53Provider {
    pub async fn from_config(config: &Route53ProviderConfig<'_>) -> Box<dyn Provider> {
        let region = RegionProviderChain::first_try(config.region.map(|r| Region::new(r.to_owned())))
            .or_default_provider()
            .or_else(Region::new(ROUTE53_HOME_REGION));
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        debug!("Using AWS region {:?}", sdk_config.region());

        Box::new(Route53Provider::new(Client::new(&sdk_config)))
    }

    pub fn new(client: Client) -> Self {
        Route53Provider { client }
    }
}

#[async_trait]
impl Provider for Route53Provider {
    async fn list_records(
        &self,
        zone_id: &str,
        cursor: &PageCursor,
    ) -> Result<RecordPage, ProviderError> {
        trace!("Listing records in zone {} starting at {:?}", zone_id, cursor);
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(cursor.name.as_str())
            .start_record_type(RrType::from(cursor.record_type.as_str()))
            .set_start_record_identifier(cursor.identifier.clone())
            .send()
            .await
            .map_err(|e| {
                ProviderError::from(format!(
                    "Could not list records in zone {}: {}",
                    zone_id,
                    DisplayErrorContext(e)
                ))
            })?;

        let next = next_cursor(
            output.is_truncated,
            output.next_record_name,
            output.next_record_type,
            output.next_record_identifier,
        );
        let records = output
            .resource_record_sets
            .into_iter()
            .map(DnsRecord::from)
            .collect::<Vec<_>>();
        trace!("Listed {} records, next page: {:?}", records.len(), next);

        Ok(RecordPage { records, next })
    }

    async fn delete_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), ProviderError> {
        let change = Change::builder()
            .action(ChangeAction::Delete)
            .resource_record_set(ResourceRecordSet::try_from(record)?)
            .build()?;
        let batch = ChangeBatch::builder().changes(change).build()?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                ProviderError::from(format!(
                    "Could not delete record {} from zone {}: {}",
                    record,
                    zone_id,
                    DisplayErrorContext(e)
                ))
            })?;
        debug!("Deleted record {} from zone {}", record, zone_id);
        Ok(())
    }
}

// Route53 only hands out a next record name and type while the listing is truncated.
// Both are needed to continue, the identifier is only set inside a run of records with set identifiers
fn next_cursor(
    is_truncated: bool,
    name: Option<String>,
    record_type: Option<RrType>,
    identifier: Option<String>,
) -> Option<PageCursor> {
    match (is_truncated, name, record_type) {
        (true, Some(name), Some(record_type)) => Some(PageCursor {
            name,
            record_type: RecordType::from(record_type.as_str()),
            identifier,
        }),
        _ => None,
    }
}
