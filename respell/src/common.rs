//! Common settings in Respell.
use bincode::config::{self, Configuration, Fixint, LittleEndian};

/// Gets the common bincode configuration of serialization.
///
/// The same configuration produces both the model file layout and the
/// canonical byte form of n-gram keys, so it must never change for a given
/// [`MODEL_VERSION`](crate::common).
pub const fn bincode_config() -> Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Magic number written at both ends of a model file (`b"RESPELLM"`).
pub(crate) const MODEL_MAGIC: u64 = u64::from_le_bytes(*b"RESPELLM");

/// Version of the model file format.
pub(crate) const MODEL_VERSION: u16 = 1;

/// Default add-K smoothing constant.
pub(crate) const DEFAULT_K: f64 = 0.05;
