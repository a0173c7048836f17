use log::{debug, trace};

use crate::provider::{DnsRecord, RecordType};

/// The records a pruning run is going to delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub delete_actions: Vec<DnsRecord>,
}

impl Plan {
    // Generate a plan of deletions from the records currently present for a domain
    pub fn generate(records: &[DnsRecord], domain_name: &str, load_balancer_dns: &str) -> Plan {
        let plan = Plan {
            delete_actions: select_deletion_candidates(records, domain_name, load_balancer_dns),
        };
        debug!(
            "Selected {} of {} records for deletion",
            plan.delete_actions.len(),
            records.len()
        );
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.delete_actions.is_empty()
    }
}

/// Whether `record` is the catch-all geolocation A record of `domain_name`.
/// This record is always kept.
pub fn is_default_record(record: &DnsRecord, domain_name: &str) -> bool {
    record.record_type == RecordType::A
        && record.name == domain_name
        && record.geo_location.as_ref().is_some_and(|g| g.is_default())
}

/// Whether `record` is a geolocation A record aliased to `load_balancer_dns` that should be removed.
pub fn is_deletion_candidate(
    record: &DnsRecord,
    domain_name: &str,
    load_balancer_dns: &str,
) -> bool {
    let is_geo_record = record.record_type == RecordType::A
        && record
            .alias_target
            .as_ref()
            .is_some_and(|a| a.dns_name == load_balancer_dns)
        && record.geo_location.as_ref().is_some_and(|g| g.has_location());
    is_geo_record && !is_default_record(record, domain_name)
}

/// Select all records that should be deleted, in their original order
pub fn select_deletion_candidates(
    records: &[DnsRecord],
    domain_name: &str,
    load_balancer_dns: &str,
) -> Vec<DnsRecord> {
    records
        .iter()
        .filter(|r| {
            let delete = is_deletion_candidate(r, domain_name, load_balancer_dns);
            trace!("{}: delete = {}", r, delete);
            delete
        })
        .cloned()
        .collect()
}
