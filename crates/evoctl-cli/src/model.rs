use chrono::{DateTime, Utc};
use evoctl_app::GpRunner;
use serde::Serialize;

/// Exported result of an evolution run: the champion front with rendered
/// expressions. Non-finite fitness entries serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ControlLawModel {
    pub system: String,
    pub trained_at: DateTime<Utc>,
    pub generations: usize,
    pub champions: Vec<ChampionLaw>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChampionLaw {
    pub expression: String,
    pub fitness: Vec<f64>,
}

impl ControlLawModel {
    pub fn from_runner(system: &str, runner: &GpRunner) -> Self {
        let champions = runner
            .hall_of_fame()
            .members()
            .iter()
            .map(|individual| ChampionLaw {
                expression: individual.law.to_string(),
                fitness: individual.fitness().to_vec(),
            })
            .collect();
        Self {
            system: system.to_string(),
            trained_at: Utc::now(),
            generations: runner.step_count(),
            champions,
        }
    }
}
