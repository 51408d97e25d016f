use log::{debug, trace};

use crate::config::CartPoleConfig;
use crate::core::{Env, GymError, Info, Result, Step};
use crate::dynamics::{Boundary, Dynamics, EpisodeStatus, FORCE_MAG, PAIR_DIM};
use crate::spaces::{GaussianSpace, Space};
use crate::utils::rng::{rng_from_seed, RngStream};

/// Standard deviation of the Gaussian action sampler.
pub const ACTION_STD: f64 = 0.5;

/// Scale unscaled per-pair actions into forces, rejecting wrong lengths and
/// non-finite components.
pub(crate) fn forces_for(action: &[f64], pairs: usize) -> Result<Vec<f64>> {
    if action.len() != pairs {
        return Err(GymError::InvalidAction(format!(
            "expected {pairs} force component(s), got {}",
            action.len()
        )));
    }
    if let Some(bad) = action.iter().find(|a| !a.is_finite()) {
        return Err(GymError::InvalidAction(format!("force components must be finite, got {bad}")));
    }
    Ok(action.iter().map(|a| a * FORCE_MAG).collect())
}

/// Continuous-force cart-pole with one or two independently actuated pairs.
/// Observation: [x, x_dot, theta, theta_dot] per pair
/// Action: one real force per pair, scaled by the force magnitude
/// Termination: any pair's cart, pole angle or pole tip out of bounds
pub struct ContinuousCartPoleEnv {
    dynamics: Dynamics,
    action_space: GaussianSpace,
    rng: RngStream,
}

impl Default for ContinuousCartPoleEnv {
    fn default() -> Self { Self::new(&CartPoleConfig::default()) }
}

impl ContinuousCartPoleEnv {
    pub fn new(config: &CartPoleConfig) -> Self {
        let pairs = config.pair_count();
        Self {
            dynamics: Dynamics::new(pairs, config.integrator, Boundary::PositionAndTip),
            action_space: GaussianSpace::new(pairs, ACTION_STD),
            rng: rng_from_seed(config.seed),
        }
    }

    pub fn pairs(&self) -> usize { self.dynamics.pairs() }

    pub fn action_space(&self) -> &GaussianSpace { &self.action_space }

    pub fn state(&self) -> &[f64] { self.dynamics.state() }

    pub fn set_state(&mut self, state: &[f64]) -> Result<()> { self.dynamics.set_state(state) }

    pub fn status(&self) -> EpisodeStatus { self.dynamics.status() }
}

impl Env for ContinuousCartPoleEnv {
    type Obs = Vec<f64>;
    type Act = Vec<f64>;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Info)> {
        if let Some(s) = seed { self.rng = rng_from_seed(s); }
        let state = self.dynamics.reset(&mut self.rng).to_vec();
        debug!("continuous cart-pole reset ({} pair(s)) to {:?}", self.pairs(), state);
        Ok((state, Info::new()))
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let forces = forces_for(&action, self.pairs())?;
        let tick = self.dynamics.advance(&forces);
        let reward = self.dynamics.settle(tick.done, 1.0);
        trace!("continuous cart-pole step: action={action:?} reward={reward} done={}", tick.done);
        Ok(Step::new(self.dynamics.state().to_vec(), reward, tick.done, Info::new()))
    }

    fn sample_action(&mut self) -> Self::Act { self.action_space.sample(&mut self.rng) }

    fn action_dimension(&self) -> usize { self.pairs() }

    fn state_dimension(&self) -> usize { self.pairs() * PAIR_DIM }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_pair_count() {
        let one = ContinuousCartPoleEnv::new(&CartPoleConfig::default().two_d(false));
        assert_eq!((one.state_dimension(), one.action_dimension()), (4, 1));
        let two = ContinuousCartPoleEnv::default();
        assert_eq!((two.state_dimension(), two.action_dimension()), (8, 2));
    }

    #[test]
    fn constant_push_terminates_within_200_steps() {
        let mut env = ContinuousCartPoleEnv::new(&CartPoleConfig::default().two_d(false));
        env.reset(Some(0)).unwrap();
        env.set_state(&[0.0; 4]).unwrap();
        let terminated_at = (1..=200).find(|_| env.step(vec![1.0]).unwrap().done);
        assert!(matches!(terminated_at, Some(n) if n < 200));
    }

    #[test]
    fn one_failing_pair_ends_the_episode() {
        let mut env = ContinuousCartPoleEnv::default();
        env.reset(Some(0)).unwrap();
        // First pair balanced, second already past the angle limit.
        env.set_state(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let s = env.step(vec![0.0, 0.0]).unwrap();
        assert!(s.done);
        assert_eq!(s.reward, 1.0);
        assert_eq!(env.step(vec![0.0, 0.0]).unwrap().reward, 0.0);
    }

    #[test]
    fn pairs_integrate_independently() {
        let mut env = ContinuousCartPoleEnv::default();
        env.set_state(&[0.0; 8]).unwrap();
        let s = env.step(vec![1.0, -1.0]).unwrap();
        let obs = s.observation;
        assert_eq!(obs[0], -obs[4]);
        assert_eq!(obs[2], -obs[6]);
    }

    #[test]
    fn rejects_wrong_action_length() {
        let mut env = ContinuousCartPoleEnv::default();
        env.reset(None).unwrap();
        assert!(matches!(env.step(vec![0.5]), Err(GymError::InvalidAction(_))));
    }

    #[test]
    fn rejects_non_finite_actions_without_moving() {
        let mut env = ContinuousCartPoleEnv::new(&CartPoleConfig::default().two_d(false));
        env.reset(Some(2)).unwrap();
        let before = env.state().to_vec();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(env.step(vec![bad]), Err(GymError::InvalidAction(_))));
        }
        assert_eq!(env.state(), &before[..]);
        assert!(env.status().is_active());
    }

    #[test]
    fn sampled_actions_match_pair_count() {
        let mut env = ContinuousCartPoleEnv::default();
        let a = env.sample_action();
        assert_eq!(a.len(), 2);
        assert!(env.action_space().contains(&a));
    }
}
