//! Environment smoke check.
//!
//! Drives a simulation through seed, reset, a few zero-action steps, and an
//! init-state restore. Each stage is recorded in a [`SmokeReport`]; a failing
//! stage ends the run early but the environment is always closed.
use crate::replay::{stream_alias, FrameShape};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Observation key checked on the first step.
pub const IMAGE_KEY: &str = "agentview_image";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObsValue {
    Image { shape: FrameShape },
    Vector { values: Vec<f64> },
}

pub type Observation = BTreeMap<String, ObsValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub obs: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: BTreeMap<String, String>,
}

/// Simulation collaborator.
pub trait SimEnvironment {
    type Error: fmt::Display;

    fn seed(&mut self, seed: u64) -> Result<(), Self::Error>;

    fn reset(&mut self) -> Result<Observation, Self::Error>;

    fn step(&mut self, action: &[f64]) -> Result<StepResult, Self::Error>;

    /// Restore a flattened simulator state.
    fn set_init_state(&mut self, state: &[f64]) -> Result<Observation, Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeConfig {
    pub seed: u64,
    pub steps: usize,
    pub action_dim: usize,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            steps: 5,
            action_dim: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageResult {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmokeReport {
    pub stages: Vec<StageResult>,
    pub steps_taken: usize,
    /// Key the image observation was found under, if any.
    pub image_key: Option<String>,
}

impl SmokeReport {
    pub fn passed(&self) -> bool {
        self.stages.iter().all(StageResult::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageResult> {
        self.stages.iter().filter(|stage| !stage.passed())
    }

    fn record<T, E: fmt::Display>(&mut self, stage: impl Into<String>, result: Result<T, E>) -> Option<T> {
        let stage = stage.into();
        match result {
            Ok(value) => {
                tracing::debug!(stage = %stage, "smoke stage passed");
                self.stages.push(StageResult { stage, error: None });
                Some(value)
            }
            Err(err) => {
                tracing::warn!(stage = %stage, error = %err, "smoke stage failed");
                self.stages.push(StageResult {
                    stage,
                    error: Some(err.to_string()),
                });
                None
            }
        }
    }
}

/// Find the image observation under [`IMAGE_KEY`] or its alias.
fn image_key(obs: &Observation) -> Option<&'static str> {
    std::iter::once(IMAGE_KEY)
        .chain(stream_alias(IMAGE_KEY))
        .find(|key| matches!(obs.get(*key), Some(ObsValue::Image { .. })))
}

pub fn smoke_check<E: SimEnvironment + ?Sized>(
    env: &mut E,
    init_states: &[Vec<f64>],
    config: &SmokeConfig,
) -> SmokeReport {
    let mut report = SmokeReport::default();
    run_stages(env, init_states, config, &mut report);
    report.record("close", env.close());
    tracing::info!(
        passed = report.passed(),
        steps = report.steps_taken,
        "environment smoke check finished"
    );
    report
}

fn run_stages<E: SimEnvironment + ?Sized>(
    env: &mut E,
    init_states: &[Vec<f64>],
    config: &SmokeConfig,
    report: &mut SmokeReport,
) {
    if report.record("seed", env.seed(config.seed)).is_none() {
        return;
    }
    if report.record("reset", env.reset()).is_none() {
        return;
    }

    let action = vec![0.0; config.action_dim];
    for index in 0..config.steps {
        let Some(result) = report.record(format!("step {index}"), env.step(&action)) else {
            return;
        };
        report.steps_taken += 1;
        if index == 0 {
            let found = image_key(&result.obs);
            report.image_key = found.map(str::to_string);
            let check: Result<(), String> = found.map(|_| ()).ok_or_else(|| {
                format!(
                    "no image observation under {IMAGE_KEY} or its alias (keys: {})",
                    result.obs.keys().cloned().collect::<Vec<_>>().join(", ")
                )
            });
            report.record("image observation", check);
        }
        if result.done {
            tracing::debug!(step = index, "episode ended during smoke steps");
            break;
        }
    }

    let Some(state) = init_states.first() else {
        tracing::debug!("no init states; skipping restore");
        return;
    };
    if report.record("set init state", env.set_init_state(state)).is_none() {
        return;
    }
    if report.record("step after init state", env.step(&action)).is_some() {
        report.steps_taken += 1;
    }
}
