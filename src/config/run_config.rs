use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::sample::Label;
use crate::error::{Error, Result};

/// One labeled input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub label: Label,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, label: Label) -> SourceSpec {
        SourceSpec { path: path.into(), label }
    }
}

/// Physical window on the discriminant used by the label-consistency filter.
///
/// A sample is inside the window when `|d - center| < half_width`. Inside
/// the window the declared label must equal `label`; outside it must be the
/// other one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub center: f64,
    pub half_width: f64,
    #[serde(default = "default_window_label")]
    pub label: Label,
}

impl WindowSpec {
    pub fn contains(&self, discriminant: f64) -> bool {
        (discriminant - self.center).abs() < self.half_width
    }

    /// `true` when window membership and the declared label agree.
    pub fn agrees_with(&self, discriminant: f64, label: Label) -> bool {
        self.contains(discriminant) == (label == self.label)
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec {
            center: 5619.60,
            half_width: 300.0,
            label: default_window_label(),
        }
    }
}

fn default_window_label() -> Label {
    Label::Background
}

/// Everything needed to start a run.
///
/// Loaded from JSON; every field except `sources`, `features` and
/// `discriminant` has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub sources: Vec<SourceSpec>,
    /// Model-input column names, in input order.
    pub features: Vec<String>,
    /// Column read last and used only by the filter.
    pub discriminant: String,
    #[serde(default)]
    pub window: WindowSpec,
    /// Number of node layers, input layer included.
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Initial weights are drawn from `uniform(-init_range, init_range) / width`.
    #[serde(default = "default_init_range")]
    pub init_range: f64,
    /// Most samples a single train phase may process.
    #[serde(default = "default_phase_cap")]
    pub phase_cap: u64,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_depth() -> usize {
    5
}

fn default_init_range() -> f64 {
    2.0
}

fn default_phase_cap() -> u64 {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

impl RunConfig {
    /// Creates a config with default hyperparameters.
    pub fn new(sources: Vec<SourceSpec>, features: Vec<String>, discriminant: impl Into<String>) -> RunConfig {
        RunConfig {
            sources,
            features,
            discriminant: discriminant.into(),
            window: WindowSpec::default(),
            depth: default_depth(),
            init_range: default_init_range(),
            phase_cap: default_phase_cap(),
            threads: None,
            seed: None,
            output_dir: default_output_dir(),
        }
    }

    /// Width of every layer.
    pub fn width(&self) -> usize {
        self.features.len()
    }

    /// All raw columns in read order, discriminant last.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.features.clone();
        columns.push(self.discriminant.clone());
        columns
    }

    /// Worker count: the configured value, or one less than the available
    /// hardware threads (at least one).
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(default_thread_count)
    }

    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::InvalidConfig("at least one input feature is required".into()));
        }
        if self.sources.is_empty() {
            return Err(Error::InvalidConfig("at least one source is required".into()));
        }
        if self.depth < 2 {
            return Err(Error::InvalidConfig(format!("depth must be at least 2, got {}", self.depth)));
        }
        if self.phase_cap == 0 {
            return Err(Error::InvalidConfig("phase_cap must be positive".into()));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("threads must be positive".into()));
        }
        if !(self.window.half_width > 0.0) {
            return Err(Error::InvalidConfig("window half_width must be positive".into()));
        }
        if !(self.init_range > 0.0) {
            return Err(Error::InvalidConfig("init_range must be positive".into()));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file previously written by `save_json`
    /// or by hand.
    pub fn load_json(path: impl AsRef<Path>) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig::new(
            vec![SourceSpec::new("a.csv", Label::Background)],
            vec!["x".into(), "y".into()],
            "mass",
        )
    }

    #[test]
    fn defaults_are_filled_in_from_json() {
        let json = r#"{
            "sources": [{ "path": "data/real.csv", "label": "background" },
                        { "path": "data/sim.csv",  "label": "signal" }],
            "features": ["h1_P", "h1_PT"],
            "discriminant": "Lb_M"
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.depth, 5);
        assert_eq!(cfg.phase_cap, 100);
        assert_eq!(cfg.window, WindowSpec::default());
        assert_eq!(cfg.sources[1].label, Label::Signal);
        assert_eq!(cfg.columns(), vec!["h1_P", "h1_PT", "Lb_M"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn window_membership() {
        let w = WindowSpec::default();
        assert!(w.contains(5619.6));
        assert!(w.contains(5900.0));
        assert!(!w.contains(5919.6));
        assert!(w.agrees_with(5619.6, Label::Background));
        assert!(!w.agrees_with(5619.6, Label::Signal));
        assert!(w.agrees_with(7000.0, Label::Signal));
    }

    #[test]
    fn rejects_shallow_network() {
        let mut cfg = config();
        cfg.depth = 1;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_threads() {
        let mut cfg = config();
        cfg.threads = Some(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn thread_count_defaults_to_at_least_one() {
        let mut cfg = config();
        assert!(cfg.thread_count() >= 1);
        cfg.threads = Some(6);
        assert_eq!(cfg.thread_count(), 6);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut cfg = config();
        cfg.seed = Some(7);
        cfg.save_json(&path).unwrap();
        let loaded = RunConfig::load_json(&path).unwrap();
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.features, cfg.features);
    }
}
