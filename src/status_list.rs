//! # Status List
//!
//! A Status List is a byte array holding the status of many Referenced Tokens.
//! Each status occupies 1, 2, 4 or 8 bits. Statuses are packed into bytes
//! least-significant bit first: status 0 lives in the lowest `bits` bits of
//! byte 0, status 1 in the next `bits` bits, and so on. The final byte is
//! zero-padded.
//!
//! The packed bytes are compressed with DEFLATE in a ZLIB wrapper at the
//! highest compression level before being embedded in a JWT or CWT.
//!
//! [Token Status List](https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/)

use std::fmt::{self, Display};
use std::io::{Read, Write};

use anyhow::anyhow;
use bitvec::field::BitField;
use bitvec::order::Lsb0;
use bitvec::view::BitView;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use tracing::instrument;

use crate::err;
use crate::error::{Err, Error, Result};

/// Media type of a Status List Token in JWT format.
pub const MEDIA_TYPE_STATUS_LIST_JWT: &str = "application/statuslist+jwt";

/// Media type of a Status List Token in CWT format.
pub const MEDIA_TYPE_STATUS_LIST_CWT: &str = "application/statuslist+cwt";

/// Number of bits used to encode each status in the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BitsPerStatus {
    /// One bit per status: VALID or INVALID.
    #[default]
    One = 1,

    /// Two bits per status: adds SUSPENDED and one application-specific value.
    Two = 2,

    /// Four bits per status.
    Four = 4,

    /// Eight bits per status.
    Eight = 8,
}

impl BitsPerStatus {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> usize {
        self as usize
    }

    /// Exclusive upper bound of a status value at this width.
    #[must_use]
    pub const fn limit(self) -> u16 {
        1 << self.bits()
    }
}

impl TryFrom<u8> for BitsPerStatus {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => err!(Err::Configuration, "bitsPerStatus must be 1, 2, 4, or 8"),
        }
    }
}

impl TryFrom<u64> for BitsPerStatus {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        let Ok(bits) = u8::try_from(value) else {
            err!(Err::Configuration, "bitsPerStatus must be 1, 2, 4, or 8");
        };
        Self::try_from(bits)
    }
}

impl From<BitsPerStatus> for u8 {
    fn from(bits: BitsPerStatus) -> Self {
        bits as Self
    }
}

impl Display for BitsPerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for BitsPerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8((*self).into())
    }
}

impl<'de> Deserialize<'de> for BitsPerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::try_from(bits).map_err(serde::de::Error::custom)
    }
}

/// Status of a Referenced Token.
///
/// [Status Types](https://datatracker.ietf.org/doc/html/draft-ietf-oauth-status-list#name-status-types)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusType {
    /// The Referenced Token is valid, correct or legal.
    Valid,

    /// The Referenced Token is revoked, annulled, taken back, recalled or
    /// cancelled.
    Invalid,

    /// The Referenced Token is temporarily invalid, hanging or debarred from
    /// privilege.
    Suspended,

    /// Application-specific status (`0x03` or `0x0C` to `0x0F`).
    ApplicationSpecific(u8),

    /// A value with no registered meaning.
    Unassigned(u8),
}

impl From<u8> for StatusType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Valid,
            0x01 => Self::Invalid,
            0x02 => Self::Suspended,
            0x03 | 0x0C..=0x0F => Self::ApplicationSpecific(value),
            _ => Self::Unassigned(value),
        }
    }
}

impl From<StatusType> for u8 {
    fn from(status: StatusType) -> Self {
        match status {
            StatusType::Valid => 0x00,
            StatusType::Invalid => 0x01,
            StatusType::Suspended => 0x02,
            StatusType::ApplicationSpecific(v) | StatusType::Unassigned(v) => v,
        }
    }
}

/// Reference from a Referenced Token to its status in a Status List.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusListEntry {
    /// Index of the Referenced Token's status in the Status List.
    pub idx: usize,

    /// URI of the Status List Token holding the status.
    pub uri: String,
}

/// An in-memory status list with a fixed number of bits per status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusList {
    statuses: Vec<u8>,
    bits: BitsPerStatus,
}

impl StatusList {
    /// Create a status list from raw status values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `bits` is not 1, 2, 4, or 8, and a
    /// range error when a status value does not fit in `bits` bits.
    pub fn new(statuses: Vec<u8>, bits: u8) -> Result<Self> {
        let bits = BitsPerStatus::try_from(bits)?;

        for (i, &value) in statuses.iter().enumerate() {
            if u16::from(value) >= bits.limit() {
                err!(
                    Err::Range,
                    details: json!({"index": i, "value": value, "bits": bits.bits()}),
                    "Status value out of range at index {i} with value {value}"
                );
            }
        }

        Ok(Self { statuses, bits })
    }

    /// Create a status list of `size` entries, all set to VALID.
    #[must_use]
    pub fn with_size(size: usize, bits: BitsPerStatus) -> Self {
        Self {
            statuses: vec![0; size],
            bits,
        }
    }

    /// Number of bits used per status.
    #[must_use]
    pub const fn bits_per_status(&self) -> BitsPerStatus {
        self.bits
    }

    /// Status values, in index order.
    #[must_use]
    pub fn statuses(&self) -> &[u8] {
        &self.statuses
    }

    /// Number of statuses in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns `true` when the list holds no statuses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Status at `index`.
    ///
    /// # Errors
    ///
    /// Returns a range error when `index` is outside the list.
    pub fn get_status(&self, index: usize) -> Result<u8> {
        self.check_bounds(index)?;
        Ok(self.statuses[index])
    }

    /// Set the status at `index`.
    ///
    /// The value is not checked against the list's bit width; it is masked to
    /// that width when the list is encoded.
    ///
    /// # Errors
    ///
    /// Returns a range error when `index` is outside the list.
    pub fn set_status(&mut self, index: usize, value: u8) -> Result<()> {
        self.check_bounds(index)?;
        self.statuses[index] = value;
        Ok(())
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.statuses.len() {
            err!(
                Err::Range,
                details: json!({"index": index, "length": self.statuses.len()}),
                "Index out of bounds"
            );
        }
        Ok(())
    }

    /// Pack statuses into bytes.
    ///
    /// Returns `ceil(len * bits / 8)` bytes with status 0 in the
    /// least-significant bits of the first byte.
    #[must_use]
    pub fn encode_status_list(&self) -> Vec<u8> {
        let width = self.bits.bits();
        let mask = u8::try_from(self.bits.limit() - 1).unwrap_or(u8::MAX);
        let mut bytes = vec![0u8; (self.statuses.len() * width).div_ceil(8)];

        let packed = bytes.view_bits_mut::<Lsb0>();
        for (i, &value) in self.statuses.iter().enumerate() {
            let start = i * width;
            packed[start..start + width].store_le(value & mask);
        }

        bytes
    }

    /// Unpack bytes produced by [`StatusList::encode_status_list`].
    ///
    /// Every byte yields `8 / bits` statuses, so the result includes any
    /// padding statuses in the final byte.
    #[must_use]
    pub fn decode_status_list(bytes: &[u8], bits: BitsPerStatus) -> Vec<u8> {
        let width = bits.bits();
        bytes
            .view_bits::<Lsb0>()
            .chunks_exact(width)
            .map(|status| status.load_le::<u8>())
            .collect()
    }

    /// Pack and compress the list (ZLIB, best compression).
    ///
    /// # Errors
    ///
    /// Returns an error if the compressor fails.
    #[instrument(level = "debug", skip(self), fields(len = self.len(), bits = %self.bits))]
    pub fn compress_status_list_to_bytes(&self) -> Result<Vec<u8>> {
        let packed = self.encode_status_list();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        let compressed = encoder.write_all(&packed).and_then(|()| encoder.finish()).map_err(|e| {
            Error::new(Err::Decompression(anyhow!(e)), "issue compressing status list")
        })?;
        tracing::debug!("compressed {} bytes to {}", packed.len(), compressed.len());

        Ok(compressed)
    }

    /// Inflate and unpack a compressed status list.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unsupported `bits` value, and a
    /// decompression error when the bytes cannot be inflated.
    #[instrument(level = "debug", skip(compressed), fields(len = compressed.len()))]
    pub fn decompress_status_list_from_bytes(compressed: &[u8], bits: u8) -> Result<Self> {
        let bits = BitsPerStatus::try_from(bits)?;

        let mut packed = Vec::new();
        if let Err(e) = ZlibDecoder::new(compressed).read_to_end(&mut packed) {
            return Err(Err::Decompression(e.into()).into());
        }
        tracing::debug!("inflated {} bytes", packed.len());

        Ok(Self {
            statuses: Self::decode_status_list(&packed, bits),
            bits,
        })
    }
}
