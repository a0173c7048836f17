use aws_sdk_route53::{error::BuildError, types};

use crate::provider::{
    AliasTarget, CidrRouting, DnsRecord, GeoLocation, ProviderError, RecordType,
};

impl From<BuildError> for ProviderError {
    fn from(e: BuildError) -> Self {
        ProviderError {
            msg: format!("Invalid Route53 request: {}", e),
        }
    }
}

impl From<types::ResourceRecordSet> for DnsRecord {
    fn from(r: types::ResourceRecordSet) -> Self {
        DnsRecord {
            name: r.name,
            record_type: RecordType::from(r.r#type.as_str()),
            set_identifier: r.set_identifier,
            ttl: r.ttl,
            values: r
                .resource_records
                .map(|rrs| rrs.into_iter().map(|rr| rr.value).collect()),
            alias_target: r.alias_target.map(|a| AliasTarget {
                hosted_zone_id: a.hosted_zone_id,
                dns_name: a.dns_name,
                evaluate_target_health: a.evaluate_target_health,
            }),
            geo_location: r.geo_location.map(|g| GeoLocation {
                continent_code: g.continent_code,
                country_code: g.country_code,
                subdivision_code: g.subdivision_code,
            }),
            weight: r.weight,
            region: r.region.map(|region| region.as_str().to_owned()),
            failover: r.failover.map(|failover| failover.as_str().to_owned()),
            multi_value_answer: r.multi_value_answer,
            health_check_id: r.health_check_id,
            traffic_policy_instance_id: r.traffic_policy_instance_id,
            cidr_routing: r.cidr_routing_config.map(|c| CidrRouting {
                collection_id: c.collection_id,
                location_name: c.location_name,
            }),
        }
    }
}

impl TryFrom<&DnsRecord> for types::ResourceRecordSet {
    type Error = ProviderError;

    fn try_from(rec: &DnsRecord) -> Result<Self, Self::Error> {
        let resource_records = rec
            .values
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|v| types::ResourceRecord::builder().value(v.to_owned()).build())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let alias_target = rec
            .alias_target
            .as_ref()
            .map(|a| {
                types::AliasTarget::builder()
                    .hosted_zone_id(a.hosted_zone_id.to_owned())
                    .dns_name(a.dns_name.to_owned())
                    .evaluate_target_health(a.evaluate_target_health)
                    .build()
            })
            .transpose()?;
        let cidr_routing_config = rec
            .cidr_routing
            .as_ref()
            .map(|c| {
                types::CidrRoutingConfig::builder()
                    .collection_id(c.collection_id.to_owned())
                    .location_name(c.location_name.to_owned())
                    .build()
            })
            .transpose()?;
        let geo_location = rec.geo_location.as_ref().map(|g| {
            types::GeoLocation::builder()
                .set_continent_code(g.continent_code.to_owned())
                .set_country_code(g.country_code.to_owned())
                .set_subdivision_code(g.subdivision_code.to_owned())
                .build()
        });

        Ok(types::ResourceRecordSet::builder()
            .name(rec.name.to_owned())
            .r#type(types::RrType::from(rec.record_type.as_str()))
            .set_set_identifier(rec.set_identifier.to_owned())
            .set_ttl(rec.ttl)
            .set_resource_records(resource_records)
            .set_alias_target(alias_target)
            .set_geo_location(geo_location)
            .set_weight(rec.weight)
            .set_region(rec.region.as_deref().map(types::ResourceRecordSetRegion::from))
            .set_failover(
                rec.failover
                    .as_deref()
                    .map(types::ResourceRecordSetFailover::from),
            )
            .set_multi_value_answer(rec.multi_value_answer)
            .set_health_check_id(rec.health_check_id.to_owned())
            .set_traffic_policy_instance_id(rec.traffic_policy_instance_id.to_owned())
            .set_cidr_routing_config(cidr_routing_config)
            .build()?)
    }
}
