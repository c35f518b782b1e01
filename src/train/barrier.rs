use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A rendezvous for a fixed number of parties that can be reused forever.
///
/// When the last party of a generation arrives it runs the completion
/// action while every other party of that generation is still blocked,
/// then releases them all. Each party gets a clone of the action's output.
pub struct ReusableBarrier<F, R> {
    parties: usize,
    state: Mutex<Rendezvous<F, R>>,
    released: Condvar,
}

struct Rendezvous<F, R> {
    waiting: usize,
    generation: u64,
    action: F,
    outcome: Option<R>,
}

impl<F, R> ReusableBarrier<F, R>
where
    F: FnMut() -> R,
    R: Clone,
{
    pub fn new(parties: usize, action: F) -> ReusableBarrier<F, R> {
        ReusableBarrier {
            parties: parties.max(1),
            state: Mutex::new(Rendezvous {
                waiting: 0,
                generation: 0,
                action,
                outcome: None,
            }),
            released: Condvar::new(),
        }
    }

    /// Blocks until all parties have arrived and the completion action of
    /// this generation has run, then returns its output.
    pub fn arrive_and_wait(&self) -> R {
        let mut state = self.lock();
        let generation = state.generation;
        state.waiting += 1;

        if state.waiting == self.parties {
            state.waiting = 0;
            let outcome = (state.action)();
            state.outcome = Some(outcome.clone());
            state.generation = generation.wrapping_add(1);
            self.released.notify_all();
            return outcome;
        }

        loop {
            state = self.released.wait(state).unwrap_or_else(PoisonError::into_inner);
            if state.generation != generation {
                if let Some(outcome) = &state.outcome {
                    return outcome.clone();
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Rendezvous<F, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
