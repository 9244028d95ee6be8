//! # Token Status List
//!
//! An implementation of the IETF [Token Status List] mechanism: a compact,
//! bit-packed representation of the revocation or suspension status of many
//! tokens, carried in a signed JWT or CWT.
//!
//! The crate is organised around the [`StatusList`] codec, which packs
//! statuses into bytes and compresses them, and two transports that embed the
//! compressed list in (and extract it from) token claims:
//!
//! * [`jwt`] - JSON claims with a base64url-encoded list.
//! * [`cwt`] - CBOR claims with integer labels.
//!
//! Signing is performed by a caller-supplied [`crypto::Signer`]; this crate
//! holds no keys.
//!
//! # Example
//!
//! ```rust
//! use token_status_list::cwt::{self, PayloadOptions};
//! use token_status_list::{BitsPerStatus, StatusList};
//!
//! let mut list = StatusList::with_size(16, BitsPerStatus::One);
//! list.set_status(3, 1).expect("index should be in range");
//!
//! let options = PayloadOptions::default();
//! let cbor = cwt::encode_cwt_payload(&list, "https://example.com/1", 1_686_920_170, &options)
//!     .expect("should encode");
//! let decoded = cwt::get_list_from_status_list_cwt(&cbor).expect("should decode");
//! assert_eq!(decoded.get_status(3).expect("index should be in range"), 1);
//! ```
//!
//! [Token Status List]: https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/

pub mod config;
pub mod crypto;
pub mod cwt;
pub mod error;
pub mod jwt;
pub mod status_list;

pub use crate::error::{Error, Result};
pub use crate::status_list::{BitsPerStatus, StatusList, StatusListEntry, StatusType};
