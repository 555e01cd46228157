//! Population count strategies for fingerprint comparison.
//!
//! The hardware backend is selected by a runtime CPU probe the first time it
//! is needed. The portable backend is always available and must agree with it
//! bit for bit.

use std::sync::OnceLock;

/// How bits are counted over fingerprint limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopcountBackend {
    /// Native popcount instruction (x86_64 `popcnt`, aarch64 `cnt`)
    Hardware,
    /// Branch-free SWAR bit counting, no CPU features required
    Portable,
}

static ACTIVE: OnceLock<PopcountBackend> = OnceLock::new();

impl PopcountBackend {
    /// Probe the running CPU for a native popcount instruction
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("popcnt") {
                return Self::Hardware;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Self::Hardware;
            }
        }
        Self::Portable
    }

    /// The backend chosen for this process, probed once
    pub fn active() -> Self {
        *ACTIVE.get_or_init(|| {
            let backend = Self::detect();
            tracing::debug!(?backend, "selected popcount backend");
            backend
        })
    }

    /// Count set bits across all words
    pub fn count_ones(self, words: &[u64]) -> u32 {
        match self {
            Self::Hardware => hardware_count(words),
            Self::Portable => words.iter().map(|&w| swar_count(w)).sum(),
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn hardware_count(words: &[u64]) -> u32 {
    if std::arch::is_x86_feature_detected!("popcnt") {
        // SAFETY: the popcnt feature was just confirmed on this CPU.
        unsafe { popcnt_words(words) }
    } else {
        words.iter().map(|&w| swar_count(w)).sum()
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "popcnt")]
unsafe fn popcnt_words(words: &[u64]) -> u32 {
    words.iter().map(|w| w.count_ones()).sum()
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_count(words: &[u64]) -> u32 {
    words.iter().map(|w| w.count_ones()).sum()
}

fn swar_count(mut x: u64) -> u32 {
    x -= (x >> 1) & 0x5555_5555_5555_5555;
    x = (x & 0x3333_3333_3333_3333) + ((x >> 2) & 0x3333_3333_3333_3333);
    x = (x + (x >> 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    (x.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}
