//! # CWT Transport
//!
//! Embeds a [`StatusList`](crate::StatusList) in, and extracts it from, CBOR
//! Web Token claims. A Status List Token carries the compressed list under
//! the `status_list` claim (`65533`); a Referenced Token points at its status
//! with the `status` claim (`65535`).
//!
//! Claims maps use integer labels. Decoding also accepts maps whose labels
//! were written as decimal strings (see [`ClaimMap`]).
//!
//! [Status List Token in CWT Format](https://datatracker.ietf.org/doc/html/draft-ietf-oauth-status-list#name-status-list-token-in-cwt-fo)

mod header;
mod lookup;
mod payload;
mod reference;
mod sign;

pub use self::header::{create_status_list_cwt_header, HeaderOptions, KeyId, KeyResolution, X5Chain};
pub use self::lookup::{ClaimMap, Key};
pub use self::payload::{
    create_status_list_cwt_payload, decode_cwt_payload, decode_status_list_from_cbor,
    encode_cwt_payload, encode_status_list_to_cbor, get_list_from_status_list_cwt,
    PayloadOptions, StatusListCbor, StatusListCwt, StatusListCwtPayload,
};
pub use self::reference::{
    create_cwt_status_claim, create_referenced_cwt_payload, decode_cwt_status_claim,
    encode_cwt_status_claim, encode_referenced_cwt_payload, get_status_list_from_cwt,
    ReferencedCwtPayload, StatusClaim,
};
pub use self::sign::{issue, sign, verify};

/// COSE `typ` header value for a Status List Token in CWT format.
pub const CWT_STATUS_LIST_TYPE: &str = "application/statuslist+cwt";

/// `CoAP` Content-Format ID for a Status List CWT. Not yet assigned by IANA.
pub const CWT_STATUS_LIST_CONTENT_FORMAT_ID: Option<u16> = None;

/// CWT claim keys.
pub mod claim_key {
    /// Subject: the URI of the Status List Token.
    pub const SUB: i64 = 2;

    /// Expiration time.
    pub const EXP: i64 = 4;

    /// Issued at.
    pub const IAT: i64 = 6;

    /// Status list.
    pub const STATUS_LIST: i64 = 65533;

    /// Time to live, in seconds.
    pub const TTL: i64 = 65534;

    /// Status reference of a Referenced Token.
    pub const STATUS: i64 = 65535;
}

/// Keys of the nested status list and status reference maps.
pub mod field {
    /// Bits per status.
    pub const BITS: &str = "bits";

    /// Compressed status list bytes.
    pub const LST: &str = "lst";

    /// Aggregation URI.
    pub const AGGREGATION_URI: &str = "aggregation_uri";

    /// Status list reference inside the `status` claim.
    pub const STATUS_LIST: &str = "status_list";

    /// Index of the Referenced Token in the status list.
    pub const IDX: &str = "idx";

    /// URI of the Status List Token.
    pub const URI: &str = "uri";
}

/// COSE header parameter labels.
///
/// [IANA COSE Header Parameters](https://www.iana.org/assignments/cose/cose.xhtml#header-parameters)
pub mod header_key {
    /// Algorithm.
    pub const ALG: i64 = 1;

    /// Critical headers.
    pub const CRIT: i64 = 2;

    /// Content type.
    pub const CONTENT_TYPE: i64 = 3;

    /// Key identifier.
    pub const KID: i64 = 4;

    /// Initialization vector.
    pub const IV: i64 = 5;

    /// Partial initialization vector.
    pub const PARTIAL_IV: i64 = 6;

    /// Type of the complete COSE object.
    pub const TYPE: i64 = 16;

    /// Unordered bag or chain of X.509 certificates.
    pub const X5CHAIN: i64 = 33;

    /// Hash of an X.509 certificate.
    pub const X5T: i64 = 34;

    /// URI pointing to an X.509 certificate.
    pub const X5U: i64 = 35;
}
