//! Sample status lists.

use rand::Rng;
use token_status_list::{BitsPerStatus, StatusList};

pub const STATUS_LIST_URI: &str = "https://example.com/statuslists/1";
pub const ISSUED_AT: i64 = 1_686_920_170;

/// Statuses from the draft's 1-bit example: compressed to `eNrbuRgAAhcBXQ`.
pub const ONE_BIT_STATUSES: [u8; 16] = [1, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1];

/// Statuses from the draft's 2-bit example: compressed to `eNo76fITAAPfAgc`.
pub const TWO_BIT_STATUSES: [u8; 12] = [1, 2, 0, 3, 0, 1, 0, 1, 1, 2, 3, 3];

/// A list of `len` random statuses, each valid for `bits`.
///
/// # Panics
///
/// Panics if the generated statuses do not fit `bits`.
#[must_use]
pub fn random_list(len: usize, bits: BitsPerStatus) -> StatusList {
    let mut rng = rand::thread_rng();
    let statuses = (0..len)
        .map(|_| u8::try_from(rng.gen_range(0..bits.limit())).expect("status should fit a byte"))
        .collect();
    StatusList::new(statuses, bits.into()).expect("statuses should fit")
}
