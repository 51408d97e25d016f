use log::{debug, trace};

use crate::config::{CartPoleConfig, Integrator};
use crate::core::{Env, GymError, Info, Result, Step};
use crate::dynamics::{Boundary, Dynamics, EpisodeStatus, FORCE_MAG};
use crate::spaces::{Discrete, Space};
use crate::utils::rng::{rng_from_seed, RngStream};

/// Discrete cart-pole with a single pendulum pair.
/// Observation: [x, x_dot, theta, theta_dot]
/// Action space: Discrete(2) {0: push left, 1: push right}
/// Reward: 1.0 per step until termination, 0.0 for steps taken after it
pub struct CartPoleEnv {
    dynamics: Dynamics,
    action_space: Discrete,
    rng: RngStream,
}

impl Default for CartPoleEnv {
    fn default() -> Self { Self::new(&CartPoleConfig::default()) }
}

impl CartPoleEnv {
    /// Build from `config`; only the integrator and seed apply to this variant.
    pub fn new(config: &CartPoleConfig) -> Self {
        Self {
            dynamics: Dynamics::new(1, config.integrator, Boundary::Position),
            action_space: Discrete::new(2),
            rng: rng_from_seed(config.seed),
        }
    }

    pub fn with_integrator(integrator: Integrator) -> Self {
        Self::new(&CartPoleConfig::default().integrator(integrator))
    }

    pub fn action_space(&self) -> &Discrete { &self.action_space }

    pub fn state(&self) -> &[f64] { self.dynamics.state() }

    /// Overwrite the physical state, e.g. to replay a trajectory from a known start.
    pub fn set_state(&mut self, state: &[f64]) -> Result<()> { self.dynamics.set_state(state) }

    pub fn status(&self) -> EpisodeStatus { self.dynamics.status() }
}

impl Env for CartPoleEnv {
    type Obs = Vec<f64>;
    type Act = u32;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Info)> {
        if let Some(s) = seed { self.rng = rng_from_seed(s); }
        let state = self.dynamics.reset(&mut self.rng).to_vec();
        debug!("cart-pole reset to {:?}", state);
        Ok((state, Info::new()))
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        if !self.action_space.contains(&action) {
            return Err(GymError::InvalidAction(format!("expected 0 or 1, got {action}")));
        }
        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let tick = self.dynamics.advance(&[force]);
        let reward = self.dynamics.settle(tick.done, 1.0);
        trace!("cart-pole step: action={action} reward={reward} done={}", tick.done);
        Ok(Step::new(self.dynamics.state().to_vec(), reward, tick.done, Info::new()))
    }

    fn sample_action(&mut self) -> Self::Act { self.action_space.sample(&mut self.rng) }

    fn action_dimension(&self) -> usize { 1 }

    fn state_dimension(&self) -> usize { 4 }
}
