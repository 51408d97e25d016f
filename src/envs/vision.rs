use log::{debug, trace, warn};

use crate::config::{CartPoleConfig, StackLayout};
use crate::core::{Env, Info, InfoValue, Renderer, Result, Step};
use crate::dynamics::{Boundary, Dynamics, EpisodeStatus, PAIR_DIM};
use crate::envs::continuous::{forces_for, ACTION_STD};
use crate::frames::{Frame, FrameHistory, CHANNELS};
use crate::spaces::{GaussianSpace, Space};
use crate::utils::rng::{rng_from_seed, RngStream};

/// Continuous cart-pole observed through a renderer.
///
/// The dynamics match [`super::ContinuousCartPoleEnv`] except that the cart
/// wraps around the track instead of ending the episode, and the reward gains
/// a shaping bonus whenever a pole moves towards upright. Observations are
/// the last `pre_frames` rendered depth frames followed by the current one,
/// flattened according to the configured [`StackLayout`].
pub struct VisionCartPoleEnv<R: Renderer> {
    dynamics: Dynamics,
    action_space: GaussianSpace,
    rng: RngStream,
    renderer: R,
    history: FrameHistory,
    layout: StackLayout,
    resolution: (usize, usize),
    pixels: Vec<u32>,
}

impl<R: Renderer> VisionCartPoleEnv<R> {
    pub fn new(config: &CartPoleConfig, renderer: R) -> Self {
        let pairs = config.pair_count();
        Self {
            dynamics: Dynamics::new(pairs, config.integrator, Boundary::Wrap),
            action_space: GaussianSpace::new(pairs, ACTION_STD),
            rng: rng_from_seed(config.seed),
            renderer,
            history: FrameHistory::new(config.pre_frames),
            layout: config.stack_layout,
            resolution: config.resolution,
            pixels: Vec::new(),
        }
    }

    pub fn pairs(&self) -> usize { self.dynamics.pairs() }

    pub fn action_space(&self) -> &GaussianSpace { &self.action_space }

    pub fn state(&self) -> &[f64] { self.dynamics.state() }

    pub fn set_state(&mut self, state: &[f64]) -> Result<()> { self.dynamics.set_state(state) }

    pub fn status(&self) -> EpisodeStatus { self.dynamics.status() }

    pub fn history(&self) -> &FrameHistory { &self.history }

    pub fn renderer(&self) -> &R { &self.renderer }

    pub fn renderer_mut(&mut self) -> &mut R { &mut self.renderer }

    /// Render the current state into a depth frame.
    fn render_frame(&mut self) -> Result<Frame> {
        let state = self.dynamics.state();
        let positions: Vec<f64> = state.chunks_exact(PAIR_DIM).map(|pair| pair[0]).collect();
        let angles: Vec<f64> = state.chunks_exact(PAIR_DIM).map(|pair| pair[2]).collect();

        self.pixels.clear();
        let (width, height) = self.renderer.render(&positions, &angles, &mut self.pixels);
        let frame = Frame::from_rgba(width, height, &self.pixels)?;
        self.resolution = frame.shape();
        Ok(frame)
    }

    /// Render the current state and stack it behind the history, without
    /// recording it.
    fn observe(&mut self) -> Result<(Vec<f32>, Frame)> {
        let frame = self.render_frame()?;
        let observation = self.history.stack_with(&frame, self.layout)?;
        Ok((observation, frame))
    }
}

impl<R: Renderer> Env for VisionCartPoleEnv<R> {
    type Obs = Vec<f32>;
    type Act = Vec<f64>;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Info)> {
        if let Some(s) = seed { self.rng = rng_from_seed(s); }
        self.dynamics.reset(&mut self.rng);
        self.history.clear();

        let frame = self.render_frame()?;
        self.history.prime(&frame);
        let observation = self.history.stack_with(&frame, self.layout)?;
        debug!(
            "vision cart-pole reset: state={:?} frame={:?} history={}",
            self.dynamics.state(),
            frame.shape(),
            self.history.len()
        );
        Ok((observation, Info::new()))
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let forces = forces_for(&action, self.pairs())?;
        let previous = (self.dynamics.state().to_vec(), self.resolution);
        let tick = self.dynamics.advance(&forces);

        // A failed render or stack leaves state, status and history untouched.
        let (observation, frame) = match self.observe() {
            Ok(rendered) => rendered,
            Err(e) => {
                self.dynamics.set_state(&previous.0)?;
                self.resolution = previous.1;
                return Err(e);
            }
        };

        let reward = self.dynamics.settle(tick.done, 1.0 + tick.shaping);
        if !self.history.is_primed() {
            warn!(
                "step() called before reset(): only {} of {} previous frames recorded",
                self.history.len(),
                self.history.capacity()
            );
        }
        self.history.push(frame);

        let mut info = Info::new();
        info.insert("shaping", InfoValue::from(tick.shaping));
        trace!("vision cart-pole step: reward={reward} done={} shaping={}", tick.done, tick.shaping);
        Ok(Step::new(observation, reward, tick.done, info))
    }

    fn sample_action(&mut self) -> Self::Act { self.action_space.sample(&mut self.rng) }

    fn action_dimension(&self) -> usize { self.pairs() }

    /// Length of the stacked observation, `(pre_frames + 1) * width * height * 2`.
    /// Uses the configured resolution until the renderer has produced a frame.
    fn state_dimension(&self) -> usize {
        let (width, height) = self.resolution;
        (self.history.capacity() + 1) * width * height * CHANNELS
    }
}
