//! Rolling package counter tracking.
//!
//! Counters are 16-bit and wrap from 65535 to 0. A counter below the last
//! accepted one is read as having wrapped, so the forward distance is always
//! taken in the rolling space.

use crate::options::DecoderOptions;

/// Size of the rolling counter space.
pub const COUNTER_SPACE: u32 = 1 << 16;

/// How a newly arrived counter relates to the stream's last accepted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// Same counter as the last accepted packet.
    Duplicate,
    /// Directly follows the last accepted packet.
    InOrder,
    /// `lost` packets went missing before this one. `backfill_last` is the
    /// counter the backfill leaves behind as the last index.
    Gap { lost: u32, backfill_last: u16 },
    /// The jump was too large to fill; the packet is taken as in order.
    Resync { skipped: u32 },
}

impl SequenceStep {
    pub fn lost_packets(&self) -> u32 {
        match self {
            SequenceStep::Gap { lost, .. } => *lost,
            _ => 0,
        }
    }

    /// Turn a gap whose fill would exceed `max_samples` placeholders into a
    /// resync. `samples_per_packet` counts every active channel.
    pub fn bound_fill(self, samples_per_packet: u64, max_samples: u64) -> Self {
        match self {
            SequenceStep::Gap { lost, .. }
                if u64::from(lost).saturating_mul(samples_per_packet) > max_samples =>
            {
                SequenceStep::Resync { skipped: lost }
            }
            step => step,
        }
    }
}

/// Sequence state of one (device, signal type) stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceState {
    last_counter: u16,
    cumulative: u64,
}

impl SequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_counter(&self) -> u16 {
        self.last_counter
    }

    /// Packets accounted for since the stream started, lost ones included.
    pub fn cumulative(&self) -> u64 {
        self.cumulative
    }

    /// Absolute index of the next sample slot.
    pub fn next_sample_index(&self, package_sample_count: u32) -> u64 {
        self.cumulative * u64::from(package_sample_count)
    }

    /// True until the first packet is accepted.
    pub fn is_fresh(&self) -> bool {
        self.cumulative == 0
    }

    /// Classify `counter` without changing any state.
    pub fn classify(&self, counter: u16, options: &DecoderOptions) -> SequenceStep {
        if self.is_fresh() && counter == 0 {
            return SequenceStep::InOrder;
        }

        let last = u32::from(self.last_counter);
        let mut current = u32::from(counter);
        if current < last {
            current += COUNTER_SPACE;
        }

        if current == last {
            return if options.reject_repeated_counter {
                SequenceStep::Duplicate
            } else {
                SequenceStep::InOrder
            };
        }

        let delta = current - last;
        if delta == 1 {
            return SequenceStep::InOrder;
        }

        let lost = delta - 1;
        if lost > options.max_gap_packets {
            return SequenceStep::Resync { skipped: lost };
        }
        SequenceStep::Gap {
            lost,
            backfill_last: ((current - 1) % COUNTER_SPACE) as u16,
        }
    }

    /// Account for `lost` synthesized packets ending at `backfill_last`.
    pub fn record_backfill(&mut self, lost: u32, backfill_last: u16) {
        self.cumulative += u64::from(lost);
        self.last_counter = backfill_last;
    }

    /// Accept a real packet.
    pub fn accept(&mut self, counter: u16) {
        self.last_counter = counter;
        self.cumulative += 1;
    }

    /// Apply a classified step for `counter`.
    pub fn advance(&mut self, counter: u16, step: SequenceStep) {
        match step {
            SequenceStep::Duplicate => {}
            SequenceStep::Gap { lost, backfill_last } => {
                self.record_backfill(lost, backfill_last);
                self.accept(counter);
            }
            SequenceStep::InOrder | SequenceStep::Resync { .. } => self.accept(counter),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(last_counter: u16, cumulative: u64) -> SequenceState {
        SequenceState { last_counter, cumulative }
    }

    #[test]
    fn test_in_order_and_gap() {
        let options = DecoderOptions::default();
        let s = state(10, 5);
        assert_eq!(s.classify(11, &options), SequenceStep::InOrder);
        assert_eq!(
            s.classify(13, &options),
            SequenceStep::Gap { lost: 2, backfill_last: 12 }
        );
    }

    #[test]
    fn test_wraparound_is_not_a_gap() {
        let options = DecoderOptions::default();
        let s = state(65535, 100);
        assert_eq!(s.classify(0, &options), SequenceStep::InOrder);
        assert_eq!(
            s.classify(2, &options),
            SequenceStep::Gap { lost: 2, backfill_last: 1 }
        );
    }

    #[test]
    fn test_gap_ending_at_wrap_backfills_to_max() {
        let options = DecoderOptions::default();
        let s = state(65533, 7);
        assert_eq!(
            s.classify(0, &options),
            SequenceStep::Gap { lost: 2, backfill_last: 65535 }
        );
    }

    #[test]
    fn test_duplicate_is_configurable() {
        let s = state(42, 3);
        assert_eq!(s.classify(42, &DecoderOptions::default()), SequenceStep::Duplicate);

        let lenient = DecoderOptions {
            reject_repeated_counter: false,
            ..DecoderOptions::default()
        };
        assert_eq!(s.classify(42, &lenient), SequenceStep::InOrder);
    }

    #[test]
    fn test_fresh_stream_accepts_counter_zero() {
        let options = DecoderOptions::default();
        let s = SequenceState::new();
        assert_eq!(s.classify(0, &options), SequenceStep::InOrder);
        assert_eq!(s.classify(1, &options), SequenceStep::InOrder);
        assert_eq!(
            s.classify(4, &options),
            SequenceStep::Gap { lost: 3, backfill_last: 3 }
        );
    }

    #[test]
    fn test_oversized_gap_resyncs() {
        let options = DecoderOptions {
            max_gap_packets: 100,
            ..DecoderOptions::default()
        };
        let s = state(0, 1);
        assert_eq!(s.classify(102, &options), SequenceStep::Resync { skipped: 101 });
        assert_eq!(s.classify(101, &options).lost_packets(), 100);
    }

    #[test]
    fn test_fill_bound_counts_samples() {
        let gap = SequenceStep::Gap { lost: 500, backfill_last: 500 };
        assert_eq!(gap.bound_fill(40, 20_000), gap);
        assert_eq!(gap.bound_fill(41, 20_000), SequenceStep::Resync { skipped: 500 });
        assert_eq!(SequenceStep::InOrder.bound_fill(u64::MAX, 0), SequenceStep::InOrder);
    }

    #[test]
    fn test_advance_counts_lost_packets() {
        let options = DecoderOptions::default();
        let mut s = state(10, 4);
        let step = s.classify(13, &options);
        s.advance(13, step);
        assert_eq!(s.last_counter(), 13);
        assert_eq!(s.cumulative(), 4 + 2 + 1);
        assert_eq!(s.next_sample_index(4), 28);

        let mut s = state(10, 4);
        s.advance(10, SequenceStep::Duplicate);
        assert_eq!(s, state(10, 4));

        s.reset();
        assert!(s.is_fresh());
    }
}
