use crate::data::sample::Sample;
use crate::diagnostics::VisualizationSink;
use crate::error::{Error, Result};
use crate::network::{NetworkWeights, WeightReport};
use crate::train::command::{Command, CommandSource};

pub const COMMAND_PROMPT: &str =
    "Input: Print current connections, perform a tEst, or tRain for an optional number of iterations? ";
pub const COUNT_PROMPT: &str = "\nInput rep count: ";

/// What workers do during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Draw random training samples and accumulate gradients.
    Train,
    /// Score every evaluation sample exactly once.
    Evaluate,
}

/// Mode and work budget of the next phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub mode: Mode,
    /// Training samples to process; always 0 for `Evaluate`.
    pub budget: u64,
}

/// Decides, between phases, what the worker pool does next.
///
/// Runs inside the barrier completion action, so it is single threaded and
/// may block on operator input while every worker waits.
pub struct InteractiveController<C: CommandSource> {
    commands: C,
    sink: Box<dyn VisualizationSink>,
    report: Box<dyn WeightReport>,
    mode: Mode,
    queued: u64,
    phase_cap: u64,
}

impl<C: CommandSource> InteractiveController<C> {
    pub fn new(
        commands: C,
        sink: Box<dyn VisualizationSink>,
        report: Box<dyn WeightReport>,
        phase_cap: u64,
    ) -> InteractiveController<C> {
        InteractiveController {
            commands,
            sink,
            report,
            mode: Mode::Train,
            queued: 0,
            phase_cap: phase_cap.max(1),
        }
    }

    /// Mode of the phase that is running or just finished.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Training samples requested but not yet handed to a phase.
    pub fn queued(&self) -> u64 {
        self.queued
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    /// Called once after every phase. Returns `Ok(None)` once operator input
    /// has ended.
    ///
    /// When nothing is queued: an evaluation phase that just ended is
    /// rendered, then the operator is asked for the next command. The next
    /// budget is the queue capped at `phase_cap`.
    pub fn next_phase(
        &mut self,
        weights: &NetworkWeights,
        evaluation: &[Sample],
        predictions: &[f64],
    ) -> Result<Option<Phase>> {
        if self.queued == 0 {
            if self.mode == Mode::Evaluate {
                self.render(evaluation, predictions)?;
            }
            if !self.prompt(weights)? {
                return Ok(None);
            }
        }

        let budget = self.queued.min(self.phase_cap);
        self.queued -= budget;
        Ok(Some(Phase { mode: self.mode, budget }))
    }

    fn render(&mut self, evaluation: &[Sample], predictions: &[f64]) -> Result<()> {
        if predictions.len() != evaluation.len() {
            return Err(Error::PredictionSizeMismatch {
                predictions: predictions.len(),
                samples: evaluation.len(),
            });
        }
        self.sink.render(predictions, evaluation)
    }

    /// Reads commands until one ends the prompt. `false` on end of input.
    fn prompt(&mut self, weights: &NetworkWeights) -> Result<bool> {
        loop {
            let Some(line) = self.commands.read_line(COMMAND_PROMPT)? else {
                return Ok(false);
            };

            match Command::parse(&line) {
                Some(Command::PrintWeights) => self.report.report(weights)?,
                Some(Command::Evaluate) => {
                    self.mode = Mode::Evaluate;
                    return Ok(true);
                }
                Some(Command::Train) => {
                    self.mode = Mode::Train;
                    return match self.read_count()? {
                        Some(count) => {
                            self.queued = self.queued.saturating_add(count);
                            Ok(true)
                        }
                        None => Ok(false),
                    };
                }
                None => self.commands.reject("Invalid input"),
            }
        }
    }

    fn read_count(&mut self) -> Result<Option<u64>> {
        loop {
            let Some(line) = self.commands.read_line(COUNT_PROMPT)? else {
                return Ok(None);
            };
            match line.trim().parse::<u64>() {
                Ok(count) => return Ok(Some(count)),
                Err(_) => self.commands.reject("Invalid rep count"),
            }
        }
    }
}
