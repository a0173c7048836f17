//! Main crate for the `route53_geo_pruner` application.
//!
//! Removes the geolocation A records of a domain that alias a given load balancer from a Route53 hosted zone,
//! keeping only the default (catch-all) record.
//!
//! For more information, choose one of the modules below:
//! - [`config`] validates the inputs of a run
//! - [`provider`]s are DNS hosting services such as Route53 that hold the records
//! - [`plan`] decides which of the fetched records are deleted
//! - [`pruner`] ties everything together into a single run

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod plan;
pub mod provider;
pub mod pruner;
