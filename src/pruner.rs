//! A [`Pruner`] performs the complete set of actions of a single run:
//! fetch the records of a domain, select the stale geolocation records and delete them.

use futures::{future::join_all, stream, Stream, TryStreamExt};
use itertools::{Either, Itertools};
use log::{debug, error, info};
use thiserror::Error;

use crate::{
    config::{InputError, RunParameters},
    plan::Plan,
    provider::{DnsRecord, PageCursor, Provider, ProviderError, RecordType},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PruneError {
    #[error("`{0}`")]
    Input(InputError),
    #[error("`{0}`")]
    Provider(ProviderError),
    #[error("Failed to delete {} of {} records", .failures.len(), .total)]
    Deletion {
        total: usize,
        failures: Vec<DeletionFailure>,
    },
}
impl From<InputError> for PruneError {
    fn from(i: InputError) -> Self {
        PruneError::Input(i)
    }
}
impl From<ProviderError> for PruneError {
    fn from(p: ProviderError) -> Self {
        PruneError::Provider(p)
    }
}

/// A record that could not be deleted, along with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub record: DnsRecord,
    pub error: ProviderError,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    /// Number of records found for the domain
    pub fetched: usize,
    /// Records that were deleted, or would have been in a dry run
    pub deleted: Vec<DnsRecord>,
    pub dry_run: bool,
}

/// Lazily page through the records of a zone, starting at `start`.
///
/// Each page is only requested once the previous one has been consumed, using the cursor it returned.
/// The stream ends after the first page without a cursor, or after the first error.
pub fn record_pages<'a>(
    provider: &'a dyn Provider,
    zone_id: &'a str,
    start: PageCursor,
) -> impl Stream<Item = Result<Vec<DnsRecord>, ProviderError>> + 'a {
    stream::try_unfold(Some(start), move |cursor| async move {
        let Some(cursor) = cursor else {
            return Ok(None);
        };
        provider
            .list_records(zone_id, &cursor)
            .await
            .map(|page| {
                debug!(
                    "Fetched page of {} records starting at {} {}",
                    page.records.len(),
                    cursor.name,
                    cursor.record_type
                );
                Some((page.records, page.next))
            })
    })
}

pub struct Pruner<'a> {
    provider: &'a dyn Provider,
    dry_run: bool,
}

impl<'a> Pruner<'a> {
    /// Create a new pruner working against the given provider.
    /// In dry-run mode, records are selected but never deleted.
    pub fn new(provider: &'a dyn Provider, dry_run: bool) -> Pruner<'a> {
        Pruner { provider, dry_run }
    }

    /// Fetch all records named exactly `domain_name` from the zone.
    ///
    /// The listing starts at the A records of `domain_name`, but the provider keeps returning
    /// whatever follows it in the zone, so records for other names are dropped here.
    pub async fn fetch_records_for_domain(
        &self,
        zone_id: &str,
        domain_name: &str,
    ) -> Result<Vec<DnsRecord>, ProviderError> {
        let listed: Vec<DnsRecord> = record_pages(
            self.provider,
            zone_id,
            PageCursor::start(domain_name, RecordType::A),
        )
        .try_concat()
        .await?;
        let total = listed.len();

        let records = listed
            .into_iter()
            .filter(|r| r.name == domain_name)
            .collect_vec();
        debug!(
            "{} of {} listed records are named {}",
            records.len(),
            total,
            domain_name
        );
        Ok(records)
    }

    /// Delete all given records concurrently and wait for every deletion to finish.
    /// Returns the deleted records and the failed deletions.
    pub async fn delete_records(
        &self,
        zone_id: &str,
        records: Vec<DnsRecord>,
    ) -> (Vec<DnsRecord>, Vec<DeletionFailure>) {
        let outcomes = join_all(records.into_iter().map(|record| async move {
            let result = self.provider.delete_record(zone_id, &record).await;
            (record, result)
        }))
        .await;

        outcomes
            .into_iter()
            .partition_map(|(record, result)| match result {
                Ok(()) => Either::Left(record),
                Err(error) => Either::Right(DeletionFailure { record, error }),
            })
    }

    /// Remove every geolocation record of the domain that points at the load balancer, except the default record.
    ///
    /// Fails if the records cannot be listed, or if any deletion fails.
    /// Deletions are not rolled back, so a failed run may still have removed some records.
    pub async fn prune_geolocation_records(
        &self,
        params: &RunParameters,
    ) -> Result<PruneSummary, PruneError> {
        let records = self
            .fetch_records_for_domain(&params.zone_id, &params.domain_name)
            .await?;
        info!(
            "Fetched {} records for {}",
            records.len(),
            params.domain_name
        );
        info!("Fetched records: {:?}", records);

        let plan = Plan::generate(&records, &params.domain_name, &params.load_balancer_dns);
        let mut summary = PruneSummary {
            fetched: records.len(),
            deleted: Vec::new(),
            dry_run: self.dry_run,
        };

        if plan.is_empty() {
            info!("No records to delete");
            return Ok(summary);
        }
        info!("Deleting the following records: {:?}", plan.delete_actions);
        info!(
            "Deleting {} records for {}",
            plan.delete_actions.len(),
            params.domain_name
        );

        if self.dry_run {
            info!("Dry run, no records were deleted");
            summary.deleted = plan.delete_actions;
            return Ok(summary);
        }

        let total = plan.delete_actions.len();
        let (deleted, failures) = self
            .delete_records(&params.zone_id, plan.delete_actions)
            .await;
        for f in &failures {
            error!("Could not delete record {}: {}", f.record, f.error);
        }
        if !failures.is_empty() {
            return Err(PruneError::Deletion { total, failures });
        }

        info!("Deleted {} records", deleted.len());
        summary.deleted = deleted;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::provider::{AliasTarget, GeoLocation, MockProvider, RecordPage};

    const ZONE: &str = "Z0123456789";
    const DOMAIN: &str = "app.example.com.";
    const LB: &str = "lb.example.com.";

    fn params() -> RunParameters {
        RunParameters {
            zone_id: ZONE.to_owned(),
            domain_name: DOMAIN.to_owned(),
            load_balancer_dns: LB.to_owned(),
        }
    }

    fn geo_record(
        name: &str,
        target: &str,
        continent: Option<&str>,
        country: Option<&str>,
    ) -> DnsRecord {
        DnsRecord {
            set_identifier: Some(format!(
                "{}-{}",
                continent.unwrap_or("-"),
                country.unwrap_or("-")
            )),
            alias_target: Some(AliasTarget {
                hosted_zone_id: "Z32O12XQLNTSW2".to_owned(),
                dns_name: target.to_owned(),
                evaluate_target_health: true,
            }),
            geo_location: Some(GeoLocation {
                continent_code: continent.map(str::to_owned),
                country_code: country.map(str::to_owned),
                subdivision_code: None,
            }),
            ..DnsRecord::new(name, RecordType::A)
        }
    }

    fn single_page(mock: &mut MockProvider, records: Vec<DnsRecord>) {
        mock.expect_list_records()
            .withf(|zone_id, cursor| {
                zone_id == ZONE && *cursor == PageCursor::start(DOMAIN, RecordType::A)
            })
            .times(1)
            .return_once(move |_, _| {
                Ok(RecordPage {
                    records,
                    next: None,
                })
            });
    }

    #[tokio::test]
    async fn should_follow_all_pages() {
        let default = geo_record(DOMAIN, LB, None, Some("*"));
        let eu = geo_record(DOMAIN, LB, Some("EU"), None);
        let us = geo_record(DOMAIN, LB, None, Some("US"));
        let other = geo_record("other.example.com.", LB, Some("EU"), None);

        let second = PageCursor {
            name: DOMAIN.to_owned(),
            record_type: RecordType::A,
            identifier: Some("EU--".to_owned()),
        };
        let third = PageCursor::start("other.example.com.", RecordType::A);

        let mut mock = MockProvider::new();
        let mut seq = Sequence::new();
        let (page, next) = (vec![default.clone()], second.clone());
        mock.expect_list_records()
            .withf(|_, cursor| *cursor == PageCursor::start(DOMAIN, RecordType::A))
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_, _| {
                Ok(RecordPage {
                    records: page,
                    next: Some(next),
                })
            });
        let (page, next) = (vec![eu.clone(), us.clone()], third.clone());
        mock.expect_list_records()
            .withf(move |_, cursor| *cursor == second)
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_, _| {
                Ok(RecordPage {
                    records: page,
                    next: Some(next),
                })
            });
        let page = vec![other];
        mock.expect_list_records()
            .withf(move |_, cursor| *cursor == third)
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_, _| {
                Ok(RecordPage {
                    records: page,
                    next: None,
                })
            });

        let pruner = Pruner::new(&mock, false);
        let records = pruner.fetch_records_for_domain(ZONE, DOMAIN).await.unwrap();
        assert_eq!(records, vec![default, eu, us]);
    }

    #[tokio::test]
    async fn should_abort_fetch_on_page_error() {
        let mut mock = MockProvider::new();
        let mut seq = Sequence::new();
        mock.expect_list_records()
            .withf(|_, cursor| cursor.name == DOMAIN)
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _| {
                Ok(RecordPage {
                    records: vec![geo_record(DOMAIN, LB, Some("EU"), None)],
                    next: Some(PageCursor::start("b.example.com.", RecordType::A)),
                })
            });
        mock.expect_list_records()
            .withf(|_, cursor| cursor.name == "b.example.com.")
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _| Err(ProviderError::from("throttled")));
        mock.expect_delete_record().never();

        let pruner = Pruner::new(&mock, false);
        assert_eq!(
            pruner.prune_geolocation_records(&params()).await,
            Err(PruneError::Provider(ProviderError::from("throttled")))
        );
    }

    #[tokio::test]
    async fn should_delete_only_geolocation_records() {
        let default = geo_record(DOMAIN, LB, None, Some("*"));
        let eu = geo_record(DOMAIN, LB, Some("EU"), None);
        let other = geo_record("other.example.com.", LB, Some("EU"), None);

        let mut mock = MockProvider::new();
        single_page(&mut mock, vec![default, eu.clone(), other]);
        let expected = eu.clone();
        mock.expect_delete_record()
            .withf(move |zone_id, record| zone_id == ZONE && *record == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let pruner = Pruner::new(&mock, false);
        let summary = pruner.prune_geolocation_records(&params()).await.unwrap();
        assert_eq!(
            summary,
            PruneSummary {
                fetched: 2,
                deleted: vec![eu],
                dry_run: false,
            }
        );
    }

    #[tokio::test]
    async fn should_not_delete_without_candidates() {
        let mut mock = MockProvider::new();
        single_page(
            &mut mock,
            vec![
                geo_record(DOMAIN, LB, None, Some("*")),
                geo_record(DOMAIN, "other-lb.example.com.", Some("EU"), None),
                geo_record(DOMAIN, "other-lb.example.com.", None, Some("DE")),
            ],
        );
        mock.expect_delete_record().never();

        let pruner = Pruner::new(&mock, false);
        let summary = pruner.prune_geolocation_records(&params()).await.unwrap();
        assert_eq!(summary.fetched, 3);
        assert!(summary.deleted.is_empty());
    }

    #[tokio::test]
    async fn should_report_every_failed_deletion() {
        let eu = geo_record(DOMAIN, LB, Some("EU"), None);
        let de = geo_record(DOMAIN, LB, None, Some("DE"));

        let mut mock = MockProvider::new();
        single_page(&mut mock, vec![eu.clone(), de.clone()]);
        let expected = eu.clone();
        mock.expect_delete_record()
            .withf(move |_, record| *record == expected)
            .times(1)
            .returning(|_, _| Ok(()));
        let expected = de.clone();
        mock.expect_delete_record()
            .withf(move |_, record| *record == expected)
            .times(1)
            .returning(|_, _| Err(ProviderError::from("record not found")));

        let pruner = Pruner::new(&mock, false);
        let err = pruner
            .prune_geolocation_records(&params())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PruneError::Deletion {
                total: 2,
                failures: vec![DeletionFailure {
                    record: de,
                    error: ProviderError::from("record not found"),
                }],
            }
        );
        assert_eq!(err.to_string(), "Failed to delete 1 of 2 records");
    }

    #[tokio::test]
    async fn should_not_delete_in_dry_run() {
        let eu = geo_record(DOMAIN, LB, Some("EU"), None);
        let mut mock = MockProvider::new();
        single_page(&mut mock, vec![eu.clone()]);
        mock.expect_delete_record().never();

        let pruner = Pruner::new(&mock, true);
        let summary = pruner.prune_geolocation_records(&params()).await.unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.deleted, vec![eu]);
    }

    #[tokio::test]
    async fn should_yield_pages_lazily() {
        let mut mock = MockProvider::new();
        mock.expect_list_records().times(1).return_once(|_, _| {
            Ok(RecordPage {
                records: vec![],
                next: Some(PageCursor::start("b.example.com.", RecordType::A)),
            })
        });

        let pages = record_pages(&mock, ZONE, PageCursor::start(DOMAIN, RecordType::A));
        futures::pin_mut!(pages);
        // Only the first page is requested, the mock would panic on a second call
        assert_eq!(pages.try_next().await.unwrap(), Some(vec![]));
    }
}
