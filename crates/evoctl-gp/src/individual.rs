use evoctl_expr::Expr;
use serde::{Deserialize, Serialize};

/// A single candidate solution: a control law plus its fitness vector.
///
/// Fitness is a fixed-length vector of objectives, minimized component-wise.
/// A freshly created or mutated individual carries no fitness ("invalid" in
/// the usual GP sense) until an assessment runner evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub law: Expr,
    // failed assessments carry infinite objectives, which JSON cannot
    // represent directly; encode non-finite entries as null
    #[serde(with = "fitness_serde")]
    fitness: Option<Vec<f64>>,
}

mod fitness_serde {
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    pub fn serialize<S>(value: &Option<Vec<f64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded: Option<Vec<Option<f64>>> = value
            .as_ref()
            .map(|v| v.iter().map(|&x| x.is_finite().then_some(x)).collect());
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(encoded.map(|v| {
            v.into_iter()
                .map(|x| x.unwrap_or(f64::INFINITY))
                .collect()
        }))
    }
}

impl Individual {
    #[must_use]
    pub fn new(law: Expr) -> Self {
        Self { law, fitness: None }
    }

    /// Whether this individual has been assessed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fitness.is_some()
    }

    /// The fitness vector.
    ///
    /// # Panics
    ///
    /// Panics if the individual has not been assessed.
    #[must_use]
    pub fn fitness(&self) -> &[f64] {
        self.fitness
            .as_deref()
            .expect("individual has not been assessed")
    }

    pub fn set_fitness(&mut self, fitness: Vec<f64>) {
        self.fitness = Some(fitness);
    }

    /// Drops the fitness, marking the individual for re-assessment.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Whether this individual Pareto-dominates `other` (minimization).
    ///
    /// True if no objective is worse and at least one is strictly better.
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        let (a, b) = (self.fitness(), other.fitness());
        assert_eq!(a.len(), b.len());
        let mut strictly_better = false;
        for (x, y) in a.iter().zip(b) {
            if x > y {
                return false;
            }
            if x < y {
                strictly_better = true;
            }
        }
        strictly_better
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ind(fitness: &[f64]) -> Individual {
        let mut ind = Individual::new(Expr::Var(0));
        ind.set_fitness(fitness.to_vec());
        ind
    }

    #[test]
    fn validity_tracks_assessment() {
        let mut i = Individual::new(Expr::Const(1.0));
        assert!(!i.is_valid());
        i.set_fitness(vec![1.0, 2.0]);
        assert!(i.is_valid());
        i.invalidate();
        assert!(!i.is_valid());
    }

    #[test]
    fn dominance_is_strict_and_componentwise() {
        assert!(ind(&[1.0, 1.0]).dominates(&ind(&[2.0, 2.0])));
        assert!(ind(&[1.0, 2.0]).dominates(&ind(&[1.0, 3.0])));
        assert!(!ind(&[1.0, 2.0]).dominates(&ind(&[2.0, 1.0])));
        assert!(!ind(&[1.0, 1.0]).dominates(&ind(&[1.0, 1.0])));
    }

    #[test]
    fn serde_round_trips_infinite_fitness() {
        let original = ind(&[1.5, f64::INFINITY]);
        let json = serde_json::to_string(&original).unwrap();
        let back: Individual = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fitness(), [1.5, f64::INFINITY]);
        assert_eq!(back.law, original.law);
    }

    #[test]
    fn infinite_objectives_are_dominated() {
        assert!(ind(&[1.0, 1.0]).dominates(&ind(&[f64::INFINITY, 1.0])));
        assert!(!ind(&[f64::INFINITY, 1.0]).dominates(&ind(&[1.0, 1.0])));
    }
}
