//! Cart-pole physics and the episode-termination state machine.
//!
//! One [`Dynamics`] engine drives every environment variant. It holds one
//! `(x, x_dot, theta, theta_dot)` tuple per pendulum pair and advances all of
//! them by one tick with the same equations and integrator.

use log::warn;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::config::Integrator;
use crate::core::{GymError, Result};

pub const GRAVITY: f64 = 9.8;
pub const MASSCART: f64 = 1.0;
pub const MASSPOLE: f64 = 0.1;
pub const TOTAL_MASS: f64 = MASSCART + MASSPOLE;
/// Half of the pole's length.
pub const LENGTH: f64 = 1.0;
pub const POLEMASS_LENGTH: f64 = MASSPOLE * LENGTH;
pub const FORCE_MAG: f64 = 30.0;
/// Seconds between state updates.
pub const TAU: f64 = 1.0 / 30.0;
pub const THETA_THRESHOLD_RADIANS: f64 = 45.0 * std::f64::consts::PI / 180.0;
pub const X_THRESHOLD: f64 = 4.0 * 2.4;

/// State variables per pendulum pair.
pub const PAIR_DIM: usize = 4;

/// Bound on each component of a freshly reset state.
pub const RESET_BOUND: f64 = 0.05;

/// What happens when a pair leaves the admissible region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Done on cart position or pole angle.
    Position,
    /// Done on cart position, pole angle or pole-tip position.
    PositionAndTip,
    /// Cart position wraps around the track; only the angle ends the episode.
    Wrap,
}

/// Outcome of one physics tick, aggregated over all pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    /// At least one pair crossed a termination bound.
    pub done: bool,
    /// Sum of `0.2 * (theta_threshold - |theta|)` over pairs whose angle
    /// magnitude shrank this tick.
    pub shaping: f64,
}

/// Episode lifecycle, tracked the way the classic "steps beyond done"
/// counter does: -1 while active, 0 on the terminating step, growing after.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EpisodeStatus {
    #[default]
    Active,
    JustTerminated,
    Terminated(u32),
}

impl EpisodeStatus {
    pub fn steps_beyond_done(&self) -> i64 {
        match self {
            EpisodeStatus::Active => -1,
            EpisodeStatus::JustTerminated => 0,
            EpisodeStatus::Terminated(n) => *n as i64,
        }
    }

    pub fn is_active(&self) -> bool { matches!(self, EpisodeStatus::Active) }

    /// Advance the lifecycle with this tick's `done` flag and return the
    /// reward to hand out. Once the episode has ended the reward is zero; the
    /// warning is emitted only on the first extra step.
    pub fn settle(&mut self, done: bool, reward: f64) -> f64 {
        match *self {
            EpisodeStatus::Active => {
                if done {
                    *self = EpisodeStatus::JustTerminated;
                }
                reward
            }
            EpisodeStatus::JustTerminated => {
                warn!(
                    "step() called after done: this environment has already returned done = true. \
                     Call reset() once you receive done = true; further steps are undefined behavior."
                );
                *self = EpisodeStatus::Terminated(1);
                0.0
            }
            EpisodeStatus::Terminated(n) => {
                *self = EpisodeStatus::Terminated(n.saturating_add(1));
                0.0
            }
        }
    }
}

/// Angular and linear accelerations of one pair under `force`.
pub fn accelerations(theta: f64, theta_dot: f64, force: f64) -> (f64, f64) {
    let cos_theta = theta.cos();
    let sin_theta = theta.sin();
    let temp = (force + POLEMASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
    let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
        / (LENGTH * (4.0 / 3.0 - MASSPOLE * cos_theta * cos_theta / TOTAL_MASS));
    let x_acc = temp - POLEMASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;
    (theta_acc, x_acc)
}

/// Advance one `(x, x_dot, theta, theta_dot)` tuple by `TAU`.
fn integrate(pair: &mut [f64], force: f64, integrator: Integrator) {
    let [x, x_dot, theta, theta_dot] = [pair[0], pair[1], pair[2], pair[3]];
    let (theta_acc, x_acc) = accelerations(theta, theta_dot, force);

    let next = match integrator {
        Integrator::Euler => [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ],
        Integrator::SemiImplicitEuler => {
            let x_dot = x_dot + TAU * x_acc;
            let theta_dot = theta_dot + TAU * theta_acc;
            [x + TAU * x_dot, x_dot, theta + TAU * theta_dot, theta_dot]
        }
    };
    pair.copy_from_slice(&next);
}

fn out_of_bounds(v: f64, bound: f64) -> bool { v < -bound || v > bound }

/// Horizontal position of the pole tip.
pub fn tip_position(x: f64, theta: f64) -> f64 { 2.0 * LENGTH * theta.sin() + x }

/// Map `x` back onto the track `[-X_THRESHOLD, X_THRESHOLD]`.
pub fn wrap_position(x: f64) -> f64 {
    if x < -X_THRESHOLD {
        x + 2.0 * X_THRESHOLD
    } else if x > X_THRESHOLD {
        x - 2.0 * X_THRESHOLD
    } else {
        x
    }
}

/// Physics engine for one or more independently actuated pendulum pairs.
#[derive(Clone, Debug)]
pub struct Dynamics {
    state: Vec<f64>,
    integrator: Integrator,
    boundary: Boundary,
    status: EpisodeStatus,
}

impl Dynamics {
    pub fn new(pairs: usize, integrator: Integrator, boundary: Boundary) -> Self {
        assert!(pairs > 0, "Dynamics requires at least one pendulum pair");
        Self {
            state: vec![0.0; pairs * PAIR_DIM],
            integrator,
            boundary,
            status: EpisodeStatus::Active,
        }
    }

    pub fn pairs(&self) -> usize { self.state.len() / PAIR_DIM }

    pub fn integrator(&self) -> Integrator { self.integrator }

    pub fn state(&self) -> &[f64] { &self.state }

    pub fn status(&self) -> EpisodeStatus { self.status }

    /// Overwrite the physical state without touching the episode status.
    pub fn set_state(&mut self, state: &[f64]) -> Result<()> {
        if state.len() != self.state.len() {
            return Err(GymError::InvalidState(format!(
                "expected {} components, got {}",
                self.state.len(),
                state.len()
            )));
        }
        self.state.copy_from_slice(state);
        Ok(())
    }

    /// Draw a fresh state uniformly in `[-RESET_BOUND, RESET_BOUND]` and
    /// reactivate the episode.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &[f64] {
        let uni = Uniform::new_inclusive(-RESET_BOUND, RESET_BOUND);
        for v in self.state.iter_mut() {
            *v = uni.sample(rng);
        }
        self.status = EpisodeStatus::Active;
        &self.state
    }

    /// Advance every pair by one tick; `forces` holds one scaled force per pair.
    pub fn advance(&mut self, forces: &[f64]) -> Tick {
        debug_assert_eq!(forces.len(), self.pairs());
        let mut tick = Tick::default();
        for (pair, &force) in self.state.chunks_exact_mut(PAIR_DIM).zip(forces) {
            let last_theta = pair[2];
            integrate(pair, force, self.integrator);

            let (x, theta) = (pair[0], pair[2]);
            let angle_failed = out_of_bounds(theta, THETA_THRESHOLD_RADIANS);
            tick.done |= match self.boundary {
                Boundary::Position => angle_failed || out_of_bounds(x, X_THRESHOLD),
                Boundary::PositionAndTip => {
                    angle_failed
                        || out_of_bounds(x, X_THRESHOLD)
                        || out_of_bounds(tip_position(x, theta), X_THRESHOLD)
                }
                Boundary::Wrap => {
                    pair[0] = wrap_position(x);
                    angle_failed
                }
            };

            if theta.abs() < last_theta.abs() {
                tick.shaping += 0.2 * (THETA_THRESHOLD_RADIANS - theta.abs());
            }
        }
        tick
    }

    /// Run the reward/status state machine for this tick.
    pub fn settle(&mut self, done: bool, reward: f64) -> f64 { self.status.settle(done, reward) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::rng_from_seed;

    #[test]
    fn push_right_from_rest_moves_theta_with_theta_acc() {
        let mut dynamics = Dynamics::new(1, Integrator::SemiImplicitEuler, Boundary::Position);
        dynamics.set_state(&[0.0; 4]).unwrap();
        let (theta_acc, x_acc) = accelerations(0.0, 0.0, FORCE_MAG);
        let tick = dynamics.advance(&[FORCE_MAG]);
        let reward = dynamics.settle(tick.done, 1.0);

        let s = dynamics.state();
        assert!(theta_acc != 0.0);
        assert_eq!(s[2].signum(), theta_acc.signum());
        assert_eq!(s[3].signum(), theta_acc.signum());
        assert_eq!(s[0].signum(), x_acc.signum());
        assert_eq!(reward, 1.0);
        assert!(!tick.done);
    }

    #[test]
    fn explicit_euler_keeps_positions_on_first_tick_from_rest() {
        let mut dynamics = Dynamics::new(1, Integrator::Euler, Boundary::Position);
        dynamics.set_state(&[0.0; 4]).unwrap();
        dynamics.advance(&[FORCE_MAG]);
        let s = dynamics.state();
        assert_eq!(s[0], 0.0);
        assert_eq!(s[2], 0.0);
        assert!(s[1] > 0.0);
        assert!(s[3] != 0.0);
    }

    #[test]
    fn status_machine_warns_once_then_pays_nothing() {
        let mut status = EpisodeStatus::default();
        assert_eq!(status.steps_beyond_done(), -1);
        assert_eq!(status.settle(false, 1.0), 1.0);
        assert_eq!(status.settle(true, 1.0), 1.0);
        assert_eq!(status, EpisodeStatus::JustTerminated);
        assert_eq!(status.settle(true, 1.0), 0.0);
        assert_eq!(status.steps_beyond_done(), 1);
        assert_eq!(status.settle(false, 1.0), 0.0);
        assert_eq!(status.settle(true, 1.0), 0.0);
        assert_eq!(status.steps_beyond_done(), 3);
    }

    #[test]
    fn reset_stays_in_bounds_and_reactivates() {
        let mut rng = rng_from_seed(3);
        let mut dynamics = Dynamics::new(2, Integrator::SemiImplicitEuler, Boundary::PositionAndTip);
        dynamics.set_state(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let tick = dynamics.advance(&[0.0, 0.0]);
        assert!(tick.done);
        dynamics.settle(tick.done, 1.0);
        assert!(!dynamics.status().is_active());

        let state = dynamics.reset(&mut rng).to_vec();
        assert_eq!(state.len(), 8);
        assert!(state.iter().all(|v| (-RESET_BOUND..=RESET_BOUND).contains(v)));
        assert!(dynamics.status().is_active());
    }

    #[test]
    fn tip_bound_terminates_only_with_tip_policy() {
        // Cart near the edge, pole leaning outwards: tip beyond the track, cart inside.
        let state = [X_THRESHOLD - 0.5, 0.0, 0.5, 0.0];
        assert!(tip_position(state[0], state[2]) > X_THRESHOLD);

        let mut plain = Dynamics::new(1, Integrator::SemiImplicitEuler, Boundary::Position);
        plain.set_state(&state).unwrap();
        assert!(!plain.advance(&[0.0]).done);

        let mut tipped = Dynamics::new(1, Integrator::SemiImplicitEuler, Boundary::PositionAndTip);
        tipped.set_state(&state).unwrap();
        assert!(tipped.advance(&[0.0]).done);
    }

    #[test]
    fn wrap_policy_keeps_cart_on_track() {
        let mut dynamics = Dynamics::new(1, Integrator::SemiImplicitEuler, Boundary::Wrap);
        dynamics.set_state(&[X_THRESHOLD - 0.01, 5.0, 0.0, 0.0]).unwrap();
        let tick = dynamics.advance(&[FORCE_MAG]);
        let x = dynamics.state()[0];
        assert!(!tick.done);
        assert!(x < 0.0);
        assert!((-X_THRESHOLD..=X_THRESHOLD).contains(&x));
        assert_eq!(wrap_position(-X_THRESHOLD - 1.0), X_THRESHOLD - 1.0);
    }

    #[test]
    fn shaping_rewards_angle_moving_towards_upright() {
        let mut dynamics = Dynamics::new(1, Integrator::SemiImplicitEuler, Boundary::Wrap);
        // Leaning right and falling back left fast enough to shrink |theta|.
        dynamics.set_state(&[0.0, 0.0, 0.2, -3.0]).unwrap();
        let tick = dynamics.advance(&[0.0]);
        let theta = dynamics.state()[2];
        assert!(theta.abs() < 0.2);
        assert!((tick.shaping - 0.2 * (THETA_THRESHOLD_RADIANS - theta.abs())).abs() < 1e-12);

        dynamics.set_state(&[0.0, 0.0, 0.2, 3.0]).unwrap();
        assert_eq!(dynamics.advance(&[0.0]).shaping, 0.0);
    }

    #[test]
    fn set_state_rejects_wrong_length() {
        let mut dynamics = Dynamics::new(2, Integrator::Euler, Boundary::Position);
        assert!(matches!(dynamics.set_state(&[0.0; 4]), Err(GymError::InvalidState(_))));
    }
}
