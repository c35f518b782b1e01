use std::sync::atomic::{AtomicU64, Ordering};

/// Most recent score for each evaluation sample.
///
/// Slots are written concurrently during an evaluation phase, each by the
/// single worker that claimed its offset, and read back once the phase has
/// ended. Scores are stored as raw `f64` bits.
#[derive(Debug)]
pub struct PredictionBuffer {
    slots: Vec<AtomicU64>,
}

impl PredictionBuffer {
    pub fn new(len: usize) -> PredictionBuffer {
        PredictionBuffer {
            slots: (0..len).map(|_| AtomicU64::new(f64::NAN.to_bits())).collect(),
        }
    }

    /// Overwrites the score at `offset` into the evaluation suffix.
    pub fn record(&self, offset: usize, score: f64) {
        self.slots[offset].store(score.to_bits(), Ordering::Relaxed);
    }

    /// Copies every slot out. Slots never written read as NaN.
    pub fn snapshot(&self) -> Vec<f64> {
        self.slots
            .iter()
            .map(|slot| f64::from_bits(slot.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_slots_are_nan() {
        let buf = PredictionBuffer::new(3);
        buf.record(1, 0.75);
        let snap = buf.snapshot();
        assert!(snap[0].is_nan());
        assert_eq!(snap[1], 0.75);
        assert!(snap[2].is_nan());
    }

    #[test]
    fn record_overwrites() {
        let buf = PredictionBuffer::new(1);
        buf.record(0, 0.1);
        buf.record(0, 0.9);
        assert_eq!(buf.snapshot(), vec![0.9]);
    }
}
