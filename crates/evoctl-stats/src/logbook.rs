use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptive::FitnessStats;

/// One generation's entry in the logbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub generation: usize,
    /// Number of individuals assessed this generation.
    pub evaluations: usize,
    /// Per-objective fitness summaries; `None` when every individual failed.
    pub objectives: Vec<Option<FitnessStats>>,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gen {:>4}  evals {:>4}",
            self.generation, self.evaluations
        )?;
        for (i, stats) in self.objectives.iter().enumerate() {
            match stats {
                Some(s) => write!(
                    f,
                    "  | fit{i} min {:<12.6} max {:<12.6}",
                    s.min, s.max
                )?,
                None => write!(f, "  | fit{i} min -            max -           ")?,
            }
        }
        Ok(())
    }
}

/// Chronological record of an evolution run.
///
/// The runner appends one [`Record`] per generation; the newest record is
/// streamed to the run log and the whole book is persisted in checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    records: Vec<Record>,
}

impl Logbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record built from a population's fitness vectors.
    ///
    /// `fitness_values` is one vector per individual, all the same length.
    pub fn record<'a, I>(&mut self, generation: usize, evaluations: usize, fitness_values: I)
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let fitness: Vec<&[f64]> = fitness_values.into_iter().collect();
        let n_obj = fitness.first().map_or(0, |f| f.len());
        let objectives = (0..n_obj)
            .map(|obj| FitnessStats::new(fitness.iter().map(|f| f[obj])))
            .collect();
        self.records.push(Record {
            generation,
            evaluations,
            objectives,
        });
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The newest record, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for Logbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_summarizes_each_objective() {
        let mut logbook = Logbook::new();
        let fitness: Vec<Vec<f64>> = vec![vec![1.0, 10.0], vec![3.0, 20.0]];
        logbook.record(0, 2, fitness.iter().map(Vec::as_slice));
        let record = logbook.last().unwrap();
        assert_eq!(record.objectives.len(), 2);
        let fit0 = record.objectives[0].as_ref().unwrap();
        assert_eq!((fit0.min, fit0.max), (1.0, 3.0));
        let fit1 = record.objectives[1].as_ref().unwrap();
        assert_eq!((fit1.min, fit1.max), (10.0, 20.0));
    }

    #[test]
    fn display_mentions_generation_and_objectives() {
        let mut logbook = Logbook::new();
        let fitness: Vec<Vec<f64>> = vec![vec![1.5, 2.5]];
        logbook.record(3, 1, fitness.iter().map(Vec::as_slice));
        let line = logbook.last().unwrap().to_string();
        assert!(line.contains("gen    3"));
        assert!(line.contains("fit0"));
        assert!(line.contains("fit1"));
    }

    #[test]
    fn serde_round_trip() {
        let mut logbook = Logbook::new();
        let fitness: Vec<Vec<f64>> = vec![vec![1.0], vec![f64::INFINITY]];
        logbook.record(0, 2, fitness.iter().map(Vec::as_slice));
        let json = serde_json::to_string(&logbook).unwrap();
        let back: Logbook = serde_json::from_str(&json).unwrap();
        assert_eq!(logbook, back);
    }
}
