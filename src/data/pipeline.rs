use std::sync::{Mutex, PoisonError};

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::{RunConfig, SourceSpec, WindowSpec};
use crate::data::dataset::Dataset;
use crate::data::sample::{Label, Sample};
use crate::data::source::SourceReader;
use crate::error::{Error, Result};
use crate::random::SharedRng;

/// Turns labeled sources into a ready-to-train `Dataset`.
///
/// Steps, in order:
/// 1. load every source, one task per column, checking that all columns of
///    a source have the same length;
/// 2. drop samples whose discriminant window membership contradicts their
///    label;
/// 3. shuffle once with the shared generator;
/// 4. divide each model-input feature by its maximum over the dataset.
///
/// Parallel steps run on a private rayon pool of `config.thread_count()`
/// threads.
pub struct DataPipeline<'a> {
    reader: &'a dyn SourceReader,
    rng: &'a SharedRng,
    columns: Vec<String>,
    window: WindowSpec,
    threads: usize,
}

impl<'a> DataPipeline<'a> {
    pub fn new(config: &RunConfig, reader: &'a dyn SourceReader, rng: &'a SharedRng) -> DataPipeline<'a> {
        DataPipeline {
            reader,
            rng,
            columns: config.columns(),
            window: config.window,
            threads: config.thread_count(),
        }
    }

    /// Runs every step over `sources`. The background fraction of the
    /// result is available from `Dataset::fraction_background`.
    pub fn run(&self, sources: &[SourceSpec]) -> Result<Dataset> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.threads).build()?;

        let mut samples = Vec::new();
        for source in sources {
            self.load_source(&pool, source, &mut samples)?;
        }

        let loaded = samples.len();
        filter_inconsistent(&mut samples, &self.window);
        info!("label filter kept {} of {} samples", samples.len(), loaded);

        if samples.is_empty() {
            return Err(Error::EmptyDataset);
        }

        self.rng.shuffle(&mut samples);
        pool.install(|| normalize(&mut samples));

        let (background, signal) = count_labels(&samples);
        info!("created data. {} background and {} signal samples", background, signal);
        Ok(Dataset::new(samples))
    }

    /// Appends every row of `source` to `samples`.
    ///
    /// The first column to finish fixes the row count of this source under
    /// a lock; any column disagreeing with it fails the whole source and
    /// nothing is appended.
    fn load_source(&self, pool: &ThreadPool, source: &SourceSpec, samples: &mut Vec<Sample>) -> Result<()> {
        info!("reading from file {}", source.path.display());

        let block_len: Mutex<Option<usize>> = Mutex::new(None);

        let columns = pool.install(|| {
            self.columns
                .par_iter()
                .map(|name| -> Result<Vec<f64>> {
                    let values = self.reader.read_feature(&source.path, name)?;

                    {
                        let mut len = block_len.lock().unwrap_or_else(PoisonError::into_inner);
                        let expected = *len.get_or_insert(values.len());
                        if expected != values.len() {
                            return Err(Error::InconsistentFeatureLength {
                                source_path: source.path.clone(),
                                expected,
                                found: values.len(),
                                feature: name.clone(),
                            });
                        }
                    }

                    debug!("read {} {} {} values", values.len(), source.label.name(), name);
                    Ok(values)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let rows = block_len.into_inner().unwrap_or_else(PoisonError::into_inner).unwrap_or(0);
        samples.reserve(rows);
        for row in 0..rows {
            samples.push(Sample {
                values: columns.iter().map(|c| c[row]).collect(),
                label: source.label,
            });
        }
        Ok(())
    }
}

/// Drops every sample for which window membership and label disagree.
pub fn filter_inconsistent(samples: &mut Vec<Sample>, window: &WindowSpec) {
    samples.retain(|s| window.agrees_with(s.discriminant(), s.label));
}

/// Divides each model-input feature by its own maximum (sign kept).
///
/// Runs on the current rayon pool: maxima one task per feature, then the
/// division over samples. A feature whose maximum is zero or not finite is
/// left as is. Returns the divisors used.
pub fn normalize(samples: &mut [Sample]) -> Vec<f64> {
    let width = samples.first().map_or(0, |s| s.inputs().len());

    let shared: &[Sample] = samples;
    let maxima: Vec<f64> = (0..width)
        .into_par_iter()
        .map(|feature| {
            shared
                .iter()
                .map(|s| s.values[feature])
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();

    let divisors: Vec<f64> = maxima
        .iter()
        .enumerate()
        .map(|(feature, &max)| {
            if max == 0.0 || !max.is_finite() {
                warn!("feature {} has maximum {}; leaving it unscaled", feature, max);
                1.0
            } else {
                max
            }
        })
        .collect();

    samples.par_iter_mut().for_each(|sample| {
        for (v, d) in sample.inputs_mut().iter_mut().zip(&divisors) {
            *v /= d;
        }
    });

    divisors
}

/// Counts samples per label: `(background, signal)`.
pub fn count_labels(samples: &[Sample]) -> (usize, usize) {
    let signal = samples.iter().filter(|s| s.label == Label::Signal).count();
    (samples.len() - signal, signal)
}
