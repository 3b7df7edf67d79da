//! Lossy packing of 32-bit n-gram counts into 16-bit cells.

/// Largest count the engine can store (2^28). Tables cap at this value.
pub(crate) const MAX_COUNT: u32 = 1 << 28;

const PACKED_RANGE: f64 = 65536.0;

/// Packs `count` into 16 bits by normalizing against [`MAX_COUNT`], applying
/// a gamma of 0.2, and scaling to the packed range.
///
/// Packing truncates and unpacking takes the ceiling of the inverse curve,
/// so counts up to roughly 1,000 survive a round trip exactly while large
/// counts come back within a fraction of a percent. `MAX_COUNT` itself
/// saturates to the all-ones cell.
pub(crate) fn pack_count(count: u32) -> u16 {
    let ratio = f64::from(count) / f64::from(MAX_COUNT);
    debug_assert!((0.0..=1.0).contains(&ratio));
    (ratio.powf(0.2) * PACKED_RANGE) as u16
}

/// Inverts [`pack_count`] with a gamma of 5 and a ceiling.
pub(crate) fn unpack_count(packed: u16) -> u32 {
    let ratio = f64::from(packed) / PACKED_RANGE;
    (ratio.powi(5) * f64::from(MAX_COUNT)).ceil() as u32
}
