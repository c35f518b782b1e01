use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{Dataset, PredictionBuffer};
use crate::engine::Propagation;
use crate::error::{Error, Result};
use crate::network::NetworkWeights;
use crate::random::RandomSource;
use crate::train::barrier::ReusableBarrier;
use crate::train::command::CommandSource;
use crate::train::controller::{InteractiveController, Mode, Phase};
use crate::train::phase_stats::PhaseStats;

/// What the barrier tells workers after a rendezvous.
#[derive(Debug, Clone, Copy)]
enum Order {
    Run(Mode),
    Halt,
}

/// Fixed pool of workers alternating between phases of per-sample work and
/// a rendezvous where the model is updated.
///
/// Inside a phase workers only contend on one atomic cursor. In `Train`
/// the cursor counts down the remaining budget and each successful claim
/// trains on a uniformly drawn training sample; in `Evaluate` it counts up
/// through the evaluation partition so every offset is scored exactly once.
/// Sample indices come from a generator private to each worker, seeded
/// from the shared one when the pool starts.
///
/// Weights are read-locked by every worker during a phase and write-locked
/// only by the barrier completion action, while all workers are parked.
/// Each worker accumulates into its own gradient buffer; the completion
/// action folds all of them into the weights, asks the controller for the
/// next phase, and zeroes the buffers.
pub struct TrainingScheduler<'a> {
    dataset: &'a Dataset,
    rng: &'a dyn RandomSource,
    weights: NetworkWeights,
    threads: usize,
}

impl<'a> TrainingScheduler<'a> {
    pub fn new(
        dataset: &'a Dataset,
        weights: NetworkWeights,
        rng: &'a dyn RandomSource,
        threads: usize,
    ) -> TrainingScheduler<'a> {
        TrainingScheduler {
            dataset,
            rng,
            weights,
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs phases until the controller halts, then returns the weights.
    ///
    /// The first phase trains on zero samples, so the operator is asked for
    /// a command straight away.
    pub fn run<C: CommandSource>(self, controller: &mut InteractiveController<C>) -> Result<NetworkWeights> {
        let TrainingScheduler { dataset, rng, weights, threads } = self;
        let (depth, width) = (weights.depth(), weights.width());

        let weights = RwLock::new(weights);
        let gradients: Vec<Mutex<NetworkWeights>> =
            (0..threads).map(|_| Mutex::new(NetworkWeights::zeros(depth, width))).collect();
        let cursor = AtomicI64::new(0);
        let processed = AtomicU64::new(0);
        let predictions = PredictionBuffer::new(dataset.evaluation().len());
        let failure: Mutex<Option<Error>> = Mutex::new(None);

        let mut current = Phase { mode: Mode::Train, budget: 0 };
        let mut phase_no = 0u64;
        let mut started = Instant::now();

        let seeds: Vec<u64> = (0..threads).map(|_| rng.next_seed()).collect();

        let barrier = ReusableBarrier::new(threads, || {
            let mut model = weights.write().unwrap_or_else(PoisonError::into_inner);
            for gradient in &gradients {
                *model += &*lock(gradient);
            }

            let stats = PhaseStats {
                phase: phase_no,
                mode: current.mode,
                samples: processed.swap(0, Ordering::Relaxed),
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            debug!("{:?}", stats);

            let scores = match current.mode {
                Mode::Evaluate => predictions.snapshot(),
                Mode::Train => Vec::new(),
            };
            let next = controller.next_phase(&model, dataset.evaluation(), &scores);

            for gradient in &gradients {
                lock(gradient).clear();
            }

            let phase = match next {
                Ok(Some(phase)) => phase,
                Ok(None) => return Order::Halt,
                Err(e) => {
                    *lock(&failure) = Some(e);
                    return Order::Halt;
                }
            };
            if phase.mode == Mode::Train && phase.budget > 0 && dataset.training().is_empty() {
                *lock(&failure) = Some(Error::EmptyTrainingSet);
                return Order::Halt;
            }

            let start = match phase.mode {
                Mode::Train => i64::try_from(phase.budget).unwrap_or(i64::MAX),
                Mode::Evaluate => 0,
            };
            cursor.store(start, Ordering::Relaxed);

            current = phase;
            phase_no += 1;
            started = Instant::now();
            Order::Run(phase.mode)
        });

        std::thread::scope(|scope| {
            for (gradient, &seed) in gradients.iter().zip(&seeds) {
                let (barrier, weights, cursor, processed, predictions) =
                    (&barrier, &weights, &cursor, &processed, &predictions);

                scope.spawn(move || {
                    let mut propagation = Propagation::new(depth, width);
                    let mut local = StdRng::seed_from_u64(seed);
                    let mut mode = Mode::Train;

                    loop {
                        {
                            let model = weights.read().unwrap_or_else(PoisonError::into_inner);
                            let mut gradient = lock(gradient);
                            let done = match mode {
                                Mode::Train => train_phase(
                                    dataset,
                                    &mut local,
                                    &model,
                                    &mut gradient,
                                    &mut propagation,
                                    cursor,
                                ),
                                Mode::Evaluate => {
                                    evaluate_phase(dataset, &model, &mut propagation, cursor, predictions)
                                }
                            };
                            processed.fetch_add(done, Ordering::Relaxed);
                        }

                        match barrier.arrive_and_wait() {
                            Order::Run(next) => mode = next,
                            Order::Halt => break,
                        }
                    }
                });
            }
        });

        if let Some(e) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(e);
        }
        Ok(weights.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Claims training work until the budget is spent; returns samples done.
///
/// A claim succeeds while the pre-decrement cursor is positive, so a
/// budget of `B` yields exactly `B` samples across all workers.
fn train_phase(
    dataset: &Dataset,
    rng: &mut StdRng,
    weights: &NetworkWeights,
    gradient: &mut NetworkWeights,
    propagation: &mut Propagation,
    cursor: &AtomicI64,
) -> u64 {
    let training = dataset.training();
    let mut done = 0;

    while cursor.fetch_sub(1, Ordering::Relaxed) > 0 {
        let sample = &training[rng.gen_range(0..training.len())];
        let score = propagation.forward(weights, sample.inputs());
        propagation.backward(
            weights,
            score,
            sample.label.target(),
            dataset.class_bias(sample.label),
            gradient,
        );
        done += 1;
    }
    done
}

/// Claims evaluation offsets in order and records their scores.
fn evaluate_phase(
    dataset: &Dataset,
    weights: &NetworkWeights,
    propagation: &mut Propagation,
    cursor: &AtomicI64,
    predictions: &PredictionBuffer,
) -> u64 {
    let evaluation = dataset.evaluation();
    let mut done = 0;

    loop {
        let offset = cursor.fetch_add(1, Ordering::Relaxed);
        let Ok(offset) = usize::try_from(offset) else {
            break;
        };
        if offset >= evaluation.len() {
            break;
        }
        predictions.record(offset, propagation.forward(weights, evaluation[offset].inputs()));
        done += 1;
    }
    done
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
