/// Fixed-size ring of the most recent raw samples.
///
/// Every slot is pre-filled with the first sample taken at boot, so the
/// average is defined from the very first iteration and stays biased
/// toward that reading until the ring has been overwritten once. The
/// average is always computed over all `N` slots.
pub struct SampleBuffer<const N: usize> {
    samples: [u16; N],
    index: usize,
}

impl<const N: usize> SampleBuffer<N> {
    pub fn new(first: u16) -> Self {
        Self {
            samples: [first; N],
            index: 0,
        }
    }

    /// Overwrites the oldest slot and advances the write index, wrapping
    /// back to the start of the ring.
    pub fn push(&mut self, sample: u16) {
        self.samples[self.index] = sample;
        self.index = (self.index + 1) % N;
    }

    /// Mean of all slots, truncating.
    pub fn average(&self) -> u16 {
        let sum: u32 = self.samples.iter().map(|&s| s as u32).sum();
        (sum / N as u32) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_averages_to_first_sample() {
        let buffer = SampleBuffer::<16>::new(1234);
        assert_eq!(buffer.average(), 1234);
    }

    #[test]
    fn average_over_full_window() {
        let mut buffer = SampleBuffer::<16>::new(0);
        let mut sum: u32 = 0;
        for v in 0..16u16 {
            buffer.push(v * 100);
            sum += (v * 100) as u32;
        }
        assert_eq!(buffer.average(), (sum / 16) as u16);
    }

    #[test]
    fn oldest_sample_is_evicted_on_wrap() {
        let mut buffer = SampleBuffer::<16>::new(0);
        for v in 1..=16u16 {
            buffer.push(v);
        }
        // Ring now holds 1..=16. One more push drops the 1.
        buffer.push(17);
        let expected: u32 = (2..=17u32).sum::<u32>() / 16;
        assert_eq!(buffer.average(), expected as u16);
    }

    #[test]
    fn early_averages_are_biased_toward_the_seed() {
        let mut buffer = SampleBuffer::<4>::new(100);
        buffer.push(200);
        // Three seed slots remain: (200 + 100 + 100 + 100) / 4.
        assert_eq!(buffer.average(), 125);
    }

    #[test]
    fn average_truncates() {
        let mut buffer = SampleBuffer::<4>::new(0);
        buffer.push(1);
        buffer.push(1);
        buffer.push(1);
        // (1 + 1 + 1 + 0) / 4 = 0.75 -> 0
        assert_eq!(buffer.average(), 0);
    }
}
