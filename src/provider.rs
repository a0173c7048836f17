//! DNS providers that host the zones we prune records from.
//!
//! The following providers are currently available:
//! - [`Route53Provider`]: AWS Route53 hosted zones

mod route53;

// Re-exports for convenience
pub use self::route53::{Route53Provider, Route53ProviderConfig};

use std::fmt::Display;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// A provider is any DNS service provider hosting a zone, such as Route53.
/// They implement a few basic methods to page through and delete DNS records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetch a single page of records from the zone `zone_id`, starting at `cursor`.
    ///
    /// Records are returned in the order the provider lists them. The returned [`RecordPage`]
    /// contains the cursor for the next page, if there is one.
    async fn list_records(
        &self,
        zone_id: &str,
        cursor: &PageCursor,
    ) -> Result<RecordPage, ProviderError>;

    /// Delete a single record from the zone `zone_id`.
    ///
    /// The record must be passed exactly as it was returned by [`Provider::list_records()`],
    /// as providers identify the record to delete by its full contents.
    async fn delete_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), ProviderError>;
}

// Generic error returned by a provider action
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderError {
    msg: String,
}
impl Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg.as_str())
    }
}
impl std::error::Error for ProviderError {}

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError { msg: s }
    }
}
impl From<&str> for ProviderError {
    fn from(s: &str) -> Self {
        ProviderError { msg: s.to_owned() }
    }
}

/// A single resource record set as listed by the provider.
///
/// All routing attributes are kept so that the record can be handed back to the provider unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsRecord {
    pub name: String,
    pub record_type: RecordType,
    pub set_identifier: Option<String>,
    pub ttl: Option<i64>,
    /// Plain record values. `None` for alias records
    pub values: Option<Vec<String>>,
    pub alias_target: Option<AliasTarget>,
    pub geo_location: Option<GeoLocation>,
    pub weight: Option<i64>,
    pub region: Option<String>,
    pub failover: Option<String>,
    pub multi_value_answer: Option<bool>,
    pub health_check_id: Option<String>,
    pub traffic_policy_instance_id: Option<String>,
    pub cidr_routing: Option<CidrRouting>,
}

impl DnsRecord {
    /// Create a bare record with no routing attributes set
    pub fn new(name: impl Into<String>, record_type: RecordType) -> Self {
        DnsRecord {
            name: name.into(),
            record_type,
            set_identifier: None,
            ttl: None,
            values: None,
            alias_target: None,
            geo_location: None,
            weight: None,
            region: None,
            failover: None,
            multi_value_answer: None,
            health_check_id: None,
            traffic_policy_instance_id: None,
            cidr_routing: None,
        }
    }
}

impl Display for DnsRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.record_type)?;
        if let Some(id) = &self.set_identifier {
            write!(f, " [{}]", id)?;
        }
        if let Some(geo) = &self.geo_location {
            write!(f, " geo({})", geo)?;
        }
        if let Some(alias) = &self.alias_target {
            write!(f, " -> {}", alias.dns_name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeoLocation {
    pub continent_code: Option<String>,
    pub country_code: Option<String>,
    pub subdivision_code: Option<String>,
}

/// Country code used by the catch-all location, served when no other location matches
pub const DEFAULT_COUNTRY_CODE: &str = "*";

impl GeoLocation {
    /// Whether this is the catch-all location
    pub fn is_default(&self) -> bool {
        self.country_code.as_deref() == Some(DEFAULT_COUNTRY_CODE)
    }

    /// Whether a continent or country is set
    pub fn has_location(&self) -> bool {
        let set = |c: &Option<String>| c.as_deref().is_some_and(|c| !c.is_empty());
        set(&self.continent_code) || set(&self.country_code)
    }
}

impl Display for GeoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            ("continent", &self.continent_code),
            ("country", &self.country_code),
            ("subdivision", &self.subdivision_code),
        ];
        let mut first = true;
        for (label, code) in parts {
            if let Some(code) = code {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", label, code)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CidrRouting {
    pub collection_id: String,
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
    /// Any type we don't need to tell apart, kept verbatim
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
            RecordType::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CAA" => RecordType::Caa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "SOA" => RecordType::Soa,
            "SRV" => RecordType::Srv,
            "TXT" => RecordType::Txt,
            other => RecordType::Other(other.to_owned()),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position in a zone listing to continue from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor {
    pub name: String,
    pub record_type: RecordType,
    /// Needed to continue inside a run of records sharing name and type but with different set identifiers
    pub identifier: Option<String>,
}

impl PageCursor {
    /// Cursor for the first page of a listing, starting at the given name and type
    pub fn start(name: impl Into<String>, record_type: RecordType) -> Self {
        PageCursor {
            name: name.into(),
            record_type,
            identifier: None,
        }
    }
}

/// A single page of records returned by [`Provider::list_records()`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    pub records: Vec<DnsRecord>,
    /// Where to continue listing. `None` if this was the last page
    pub next: Option<PageCursor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(continent: Option<&str>, country: Option<&str>) -> GeoLocation {
        GeoLocation {
            continent_code: continent.map(str::to_owned),
            country_code: country.map(str::to_owned),
            subdivision_code: None,
        }
    }

    #[test]
    fn should_detect_default_location() {
        assert!(geo(None, Some("*")).is_default());
        assert!(!geo(Some("EU"), None).is_default());
        assert!(!geo(None, Some("DE")).is_default());
    }

    #[test]
    fn should_require_continent_or_country() {
        assert!(geo(Some("EU"), None).has_location());
        assert!(geo(None, Some("DE")).has_location());
        assert!(!geo(None, None).has_location());
        assert!(!geo(Some(""), Some("")).has_location());
    }

    #[test]
    fn should_keep_unknown_record_types() {
        assert_eq!(RecordType::from("A"), RecordType::A);
        assert_eq!(RecordType::from("AAAA"), RecordType::Aaaa);
        let ds = RecordType::from("DS");
        assert_eq!(ds, RecordType::Other("DS".to_owned()));
        assert_eq!(ds.as_str(), "DS");
    }

    #[test]
    fn should_display_record() {
        let rec = DnsRecord {
            set_identifier: Some("eu".to_owned()),
            geo_location: Some(geo(Some("EU"), None)),
            alias_target: Some(AliasTarget {
                hosted_zone_id: "Z32O12XQLNTSW2".to_owned(),
                dns_name: "lb.example.com.".to_owned(),
                evaluate_target_health: true,
            }),
            ..DnsRecord::new("app.example.com.", RecordType::A)
        };
        assert_eq!(
            rec.to_string(),
            "app.example.com. A [eu] geo(continent=EU) -> lb.example.com."
        );
    }
}
