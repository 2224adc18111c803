//! Channel polling bitsets.
//!
//! Tracks which digital and analog channels are under periodic polling.
//! Four 32-bit words give a fixed capacity of 128 channels per set;
//! enabling a channel beyond that capacity is a defined no-op rather than
//! an error, mirroring the silent boundary behaviour of the wire-level
//! config commands that drive these sets.
//!
//! Membership is never cached elsewhere. Iteration re-derives the enabled
//! channels from the words on every pass, so a config command that lands
//! between two polls is picked up by the very next poll.

use log::debug;

/// Words backing one bitset.
pub const BITSET_WORDS: usize = 4;

/// Bits per backing word.
const WORD_BITS: u16 = 32;

/// Total channel capacity of one bitset.
pub const BITSET_CAPACITY: u16 = BITSET_WORDS as u16 * WORD_BITS;

/// Fixed-capacity set of channel IDs enabled for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelBitset {
    words: [u32; BITSET_WORDS],
}

impl ChannelBitset {
    /// An empty set.
    pub const fn new() -> Self {
        Self {
            words: [0; BITSET_WORDS],
        }
    }

    /// Enable or disable polling for `channel`.
    ///
    /// Channels at or beyond [`BITSET_CAPACITY`] are silently ignored.
    /// Re-enabling an enabled channel (or disabling a disabled one) is a
    /// no-op.
    pub fn enable(&mut self, channel: u16, on: bool) {
        let index = (channel / WORD_BITS) as usize;
        if index >= BITSET_WORDS {
            return;
        }
        let bit = 1u32 << (channel % WORD_BITS);
        if on {
            self.words[index] |= bit;
        } else {
            self.words[index] &= !bit;
        }
        debug!(
            "channel {} polling {}: {:08X} {:08X} {:08X} {:08X}",
            channel,
            if on { "on" } else { "off" },
            self.words[0],
            self.words[1],
            self.words[2],
            self.words[3],
        );
    }

    /// Whether `channel` is currently enabled. Out-of-capacity channels
    /// report `false`.
    pub fn is_enabled(&self, channel: u16) -> bool {
        let index = (channel / WORD_BITS) as usize;
        index < BITSET_WORDS && self.words[index] & (1u32 << (channel % WORD_BITS)) != 0
    }

    /// True when no channel is enabled.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Visit every enabled channel in ascending order.
    ///
    /// All-zero words are skipped without a per-bit scan, which keeps the
    /// common mostly-empty case cheap on every tick.
    pub fn for_each_enabled(&self, mut visit: impl FnMut(u16)) {
        for (index, &word) in self.words.iter().enumerate() {
            if word == 0 {
                continue;
            }
            let base = index as u16 * WORD_BITS;
            for bit in 0..WORD_BITS {
                if word & (1u32 << bit) != 0 {
                    visit(base + bit);
                }
            }
        }
    }
}
