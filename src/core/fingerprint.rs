//! Arbitrary-precision fingerprint values.
//!
//! A [`Fingerprint`] is a non-negative integer of unbounded width. Its width is
//! never stored: the algorithm and size parameter that produced it determine
//! how many bits are meaningful.

use super::popcount::PopcountBackend;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Shl, Shr};

/// Non-negative big integer stored as little-endian 64-bit limbs.
///
/// Always normalized: no trailing zero limbs, so zero has no limbs at all and
/// derived equality matches numeric equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    limbs: Vec<u64>,
}

impl Fingerprint {
    /// The zero fingerprint
    pub fn zero() -> Self {
        Self { limbs: Vec::new() }
    }

    /// Build from little-endian limbs
    pub fn from_limbs(limbs: Vec<u64>) -> Self {
        let mut fingerprint = Self { limbs };
        fingerprint.normalize();
        fingerprint
    }

    /// Interpret a bit sequence as a base-2 number, first bit most significant
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let bits: Vec<bool> = bits.into_iter().collect();
        let len = bits.len();
        let mut fingerprint = Self {
            limbs: vec![0; len.div_ceil(64)],
        };
        for (i, bit) in bits.into_iter().enumerate() {
            if bit {
                fingerprint.set_bit((len - 1 - i) as u64);
            }
        }
        fingerprint.normalize();
        fingerprint
    }

    /// Concatenate equal-width bands, first band most significant
    pub fn concat_bands(bands: &[Fingerprint], band_width: u32) -> Self {
        bands
            .iter()
            .fold(Self::zero(), |acc, band| &(&acc << band_width) | band)
    }

    /// Little-endian limbs
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Number of bits needed to represent the value (0 for zero)
    pub fn bit_len(&self) -> u64 {
        match self.limbs.last() {
            Some(top) => (self.limbs.len() as u64 - 1) * 64 + (64 - top.leading_zeros() as u64),
            None => 0,
        }
    }

    /// Number of bytes needed to represent the value
    pub fn byte_len(&self) -> u64 {
        self.bit_len().div_ceil(8)
    }

    /// Whether bit `pos` (0 = least significant) is set
    pub fn bit(&self, pos: u64) -> bool {
        let limb = (pos / 64) as usize;
        self.limbs
            .get(limb)
            .is_some_and(|word| word >> (pos % 64) & 1 == 1)
    }

    /// Whether the value does not fit in a single machine word
    pub fn exceeds_word(&self) -> bool {
        self.limbs.len() > 1
    }

    /// Population count using the process-wide backend
    pub fn count_ones(&self) -> u32 {
        self.count_ones_with(PopcountBackend::active())
    }

    /// Population count using a specific backend
    pub fn count_ones_with(&self, backend: PopcountBackend) -> u32 {
        backend.count_ones(&self.limbs)
    }

    /// Lowercase hexadecimal without prefix ("0" for zero)
    pub fn to_hex(&self) -> String {
        format!("{:x}", self)
    }

    /// Parse lowercase or uppercase hexadecimal, optionally prefixed with `0x`
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.is_empty() {
            return None;
        }
        let nibbles = digits
            .chars()
            .rev()
            .map(|c| c.to_digit(16).map(u64::from))
            .collect::<Option<Vec<u64>>>()?;
        let limbs = nibbles
            .chunks(16)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u64, |word, (i, nibble)| word | nibble << (4 * i))
            })
            .collect();
        Some(Self::from_limbs(limbs))
    }

    fn set_bit(&mut self, pos: u64) {
        let limb = (pos / 64) as usize;
        if limb >= self.limbs.len() {
            self.limbs.resize(limb + 1, 0);
        }
        self.limbs[limb] |= 1 << (pos % 64);
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    fn zip_limbs(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let len = self.limbs.len().max(other.limbs.len());
        let limbs = (0..len)
            .map(|i| {
                let a = self.limbs.get(i).copied().unwrap_or(0);
                let b = other.limbs.get(i).copied().unwrap_or(0);
                op(a, b)
            })
            .collect();
        Self::from_limbs(limbs)
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Self::from_limbs(vec![value])
    }
}

impl From<u128> for Fingerprint {
    fn from(value: u128) -> Self {
        Self::from_limbs(vec![value as u64, (value >> 64) as u64])
    }
}

impl BitXor for &Fingerprint {
    type Output = Fingerprint;

    fn bitxor(self, rhs: Self) -> Fingerprint {
        self.zip_limbs(rhs, |a, b| a ^ b)
    }
}

impl BitAnd for &Fingerprint {
    type Output = Fingerprint;

    fn bitand(self, rhs: Self) -> Fingerprint {
        self.zip_limbs(rhs, |a, b| a & b)
    }
}

impl BitOr for &Fingerprint {
    type Output = Fingerprint;

    fn bitor(self, rhs: Self) -> Fingerprint {
        self.zip_limbs(rhs, |a, b| a | b)
    }
}

impl Shl<u32> for &Fingerprint {
    type Output = Fingerprint;

    fn shl(self, bits: u32) -> Fingerprint {
        if self.is_zero() {
            return Fingerprint::zero();
        }
        let limb_shift = (bits / 64) as usize;
        let bit_shift = bits % 64;
        let mut limbs = vec![0u64; limb_shift];
        limbs.reserve(self.limbs.len() + 1);
        let mut carry = 0u64;
        for &word in &self.limbs {
            limbs.push(word << bit_shift | carry);
            carry = if bit_shift == 0 {
                0
            } else {
                word >> (64 - bit_shift)
            };
        }
        limbs.push(carry);
        Fingerprint::from_limbs(limbs)
    }
}

impl Shr<u32> for &Fingerprint {
    type Output = Fingerprint;

    fn shr(self, bits: u32) -> Fingerprint {
        let limb_shift = (bits / 64) as usize;
        let bit_shift = bits % 64;
        if limb_shift >= self.limbs.len() {
            return Fingerprint::zero();
        }
        let source = &self.limbs[limb_shift..];
        let limbs = source
            .iter()
            .enumerate()
            .map(|(i, &word)| {
                let high = match source.get(i + 1) {
                    Some(&next) if bit_shift > 0 => next << (64 - bit_shift),
                    _ => 0,
                };
                word >> bit_shift | high
            })
            .collect();
        Fingerprint::from_limbs(limbs)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut limbs = self.limbs.iter().rev();
        match limbs.next() {
            Some(top) => write!(f, "{:x}", top)?,
            None => return write!(f, "0"),
        }
        for word in limbs {
            write!(f, "{:016x}", word)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid fingerprint hex: {text:?}")))
    }
}
