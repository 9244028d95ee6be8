//! # Configurations for status lists
//!
//! Types for configuring a status list published by an issuer.

use serde::{Deserialize, Serialize};

use crate::cwt::PayloadOptions;
use crate::status_list::{BitsPerStatus, StatusList, StatusListEntry};

/// Configuration for a published status list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListConfig {
    /// Number of bits used to represent each status.
    pub bits: BitsPerStatus,

    /// Number of statuses in the list.
    pub size: usize,

    /// URI the Status List Token is published at. Used as the token's `sub`
    /// and as the `uri` of each Referenced Token's status claim.
    pub uri: String,

    /// Maximum time, in seconds, a consumer may cache the Status List Token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    /// URI of a registry aggregating multiple status lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_uri: Option<String>,
}

impl ListConfig {
    /// Create a status list of the configured size with every status VALID.
    #[must_use]
    pub fn status_list(&self) -> StatusList {
        StatusList::with_size(self.size, self.bits)
    }

    /// Optional Status List Token claims for this list, expiring at `exp`.
    #[must_use]
    pub fn payload_options(&self, exp: Option<i64>) -> PayloadOptions {
        PayloadOptions {
            exp,
            ttl: self.ttl,
            aggregation_uri: self.aggregation_uri.clone(),
        }
    }

    /// Status claim entry for the Referenced Token at `idx`.
    #[must_use]
    pub fn entry(&self, idx: usize) -> StatusListEntry {
        StatusListEntry {
            idx,
            uri: self.uri.clone(),
        }
    }
}
