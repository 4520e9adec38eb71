use crate::error::CorruptorError;
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU8;

/// Default constant for [`Method::Xor`] when none is configured.
pub const DEFAULT_XOR_VALUE: u8 = 0xff;

/// The name a user picks a corruption method by, before any parameter is attached.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    /// Flip one randomly chosen bit.
    #[default]
    Flip,
    /// Invert all eight bits.
    Invert,
    Increment,
    Decrement,
    /// Add or subtract one, chosen at random.
    Nudge,
    /// Replace with any value other than the original.
    Randomize,
    /// XOR with a constant.
    Xor,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Flip => "flip",
            MethodKind::Invert => "invert",
            MethodKind::Increment => "increment",
            MethodKind::Decrement => "decrement",
            MethodKind::Nudge => "nudge",
            MethodKind::Randomize => "randomize",
            MethodKind::Xor => "xor",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A byte transform with its parameters resolved.
///
/// Every variant maps a byte to a byte with wrapping arithmetic. Variants that
/// involve a random choice draw from the generator passed to [`Method::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    FlipBit,
    InvertBits,
    Increment,
    Decrement,
    Nudge,
    Randomize,
    Xor(NonZeroU8),
}

impl Method {
    /// Resolves `kind` into a method. `xor_value` is only consulted for [`MethodKind::Xor`]
    /// and must be in `1..=255`.
    pub fn from_kind(kind: MethodKind, xor_value: u64) -> Result<Self, CorruptorError> {
        Ok(match kind {
            MethodKind::Flip => Method::FlipBit,
            MethodKind::Invert => Method::InvertBits,
            MethodKind::Increment => Method::Increment,
            MethodKind::Decrement => Method::Decrement,
            MethodKind::Nudge => Method::Nudge,
            MethodKind::Randomize => Method::Randomize,
            MethodKind::Xor => Method::Xor(xor_constant(xor_value)?),
        })
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Method::FlipBit => MethodKind::Flip,
            Method::InvertBits => MethodKind::Invert,
            Method::Increment => MethodKind::Increment,
            Method::Decrement => MethodKind::Decrement,
            Method::Nudge => MethodKind::Nudge,
            Method::Randomize => MethodKind::Randomize,
            Method::Xor(_) => MethodKind::Xor,
        }
    }

    /// Returns the corrupted value of `byte`.
    pub fn apply<R: Rng + ?Sized>(&self, byte: u8, rng: &mut R) -> u8 {
        match self {
            Method::FlipBit => byte ^ (1u8 << rng.random_range(0..8u32)),
            Method::InvertBits => !byte,
            Method::Increment => byte.wrapping_add(1),
            Method::Decrement => byte.wrapping_sub(1),
            Method::Nudge => {
                if rng.random_bool(0.5) {
                    byte.wrapping_add(1)
                } else {
                    byte.wrapping_sub(1)
                }
            }
            Method::Randomize => {
                // Draw from the 255 other values: skip over the original.
                let candidate = rng.random_range(0..=254u8);
                if candidate >= byte {
                    candidate + 1
                } else {
                    candidate
                }
            }
            Method::Xor(constant) => byte ^ constant.get(),
        }
    }
}

/// Checks an XOR constant. Zero would leave every byte untouched and is refused.
pub fn xor_constant(value: u64) -> Result<NonZeroU8, CorruptorError> {
    u8::try_from(value)
        .ok()
        .and_then(NonZeroU8::new)
        .ok_or_else(|| {
            CorruptorError::config("XOR value", format!("{value:#x} is outside 0x01..=0xff"))
        })
}
