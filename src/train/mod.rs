pub mod barrier;
pub mod command;
pub mod controller;
pub mod phase_stats;
pub mod scheduler;

pub use barrier::ReusableBarrier;
pub use command::{Command, CommandSource, ConsoleCommands, ScriptedCommands};
pub use controller::{InteractiveController, Mode, Phase};
pub use phase_stats::PhaseStats;
pub use scheduler::TrainingScheduler;
