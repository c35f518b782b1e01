use crate::train::controller::Mode;

/// Summary of one completed phase, logged at the rendezvous.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStats {
    /// 0-based phase number.
    pub phase: u64,
    pub mode: Mode,
    /// Samples processed (trained on or scored) during the phase.
    pub samples: u64,
    /// Wall-clock duration of the phase in milliseconds, operator wait
    /// excluded.
    pub elapsed_ms: u64,
}
