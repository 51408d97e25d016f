//! Construction-time configuration shared by the cart-pole variants.

/// Kinematics integrator, fixed for the lifetime of an environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Integrator {
    /// Explicit Euler: positions advance with the pre-update velocities.
    Euler,
    /// Semi-implicit Euler: velocities advance first, positions use them.
    #[default]
    SemiImplicitEuler,
}

/// How the vision observation lays out the stacked frames once flattened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackLayout {
    /// `[frame][pixel][channel]`: frames stacked along a new leading axis.
    #[default]
    FrameMajor,
    /// `[pixel][frame][channel]`: frames interleaved per pixel.
    PixelMajor,
}

/// Environment configuration.
///
/// Physical constants are not part of it; see [`crate::dynamics`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartPoleConfig {
    pub integrator: Integrator,
    /// Two independently actuated pendulum pairs instead of one.
    /// Ignored by the discrete environment, which always has one pair.
    pub two_d: bool,
    /// Capacity of the vision frame history.
    pub pre_frames: usize,
    /// Expected renderer resolution `(width, height)`, used to report the
    /// vision state dimension before the first frame is rendered.
    pub resolution: (usize, usize),
    pub stack_layout: StackLayout,
    pub seed: u64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            integrator: Integrator::default(),
            two_d: true,
            pre_frames: 1,
            resolution: (128, 128),
            stack_layout: StackLayout::default(),
            seed: 1_234_567,
        }
    }
}

impl CartPoleConfig {
    pub fn integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn two_d(mut self, two_d: bool) -> Self {
        self.two_d = two_d;
        self
    }

    pub fn pre_frames(mut self, pre_frames: usize) -> Self {
        self.pre_frames = pre_frames;
        self
    }

    pub fn resolution(mut self, width: usize, height: usize) -> Self {
        self.resolution = (width, height);
        self
    }

    pub fn stack_layout(mut self, layout: StackLayout) -> Self {
        self.stack_layout = layout;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of pendulum pairs for the continuous variants.
    pub fn pair_count(&self) -> usize {
        if self.two_d { 2 } else { 1 }
    }
}
