// Core traits and types shared by every cart-pole variant.

/// A minimal info map carried in the reserved slot of a step result.
/// Most steps leave it empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Create an empty Info map.
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: InfoValue) {
        let k = key.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    I64(i64),
    F64(f64),
}

impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }

/// A step result from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<Obs> {
    pub observation: Obs,
    pub reward: f64,
    pub done: bool,
    /// Reserved slot, kept for interface symmetry with the classic 4-tuple.
    pub info: Info,
}

impl<Obs> Step<Obs> {
    pub fn new(observation: Obs, reward: f64, done: bool, info: Info) -> Self {
        Self { observation, reward, done, info }
    }
}

/// Recoverable errors across the environment APIs.
#[derive(thiserror::Error, Debug)]
pub enum GymError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Renderer returned {len} pixels for a {width}x{height} frame")]
    RenderBuffer { width: usize, height: usize, len: usize },
    #[error("Frame shape changed from {expected:?} to {actual:?} while frames were stacked")]
    FrameShape { expected: (usize, usize), actual: (usize, usize) },
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    #[error("Other error: {0}")]
    Other(String),
}

/// Convenience alias for results using GymError.
pub type Result<T> = std::result::Result<T, GymError>;

/// Core environment trait: the `reset` / `step` / `sample_action` contract.
pub trait Env {
    type Obs;
    type Act;

    /// Reset the environment to a fresh episode.
    /// Implementations re-seed their RNG when `seed` is provided.
    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Info)>;

    /// Apply an action and advance the environment by one tick.
    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>>;

    /// Draw a random action from the environment's action space.
    fn sample_action(&mut self) -> Self::Act;

    fn action_dimension(&self) -> usize;

    /// Length of the flat observation returned by `reset` and `step`.
    fn state_dimension(&self) -> usize;
}

/// Produces an RGBA image of the poles for the vision environment.
///
/// `positions` and `angles` hold one entry per pendulum pair. The renderer
/// fills `pixels` in place (packed RGBA, `r` in the lowest byte) and returns
/// `(width, height)`; the buffer must end up with exactly `width * height`
/// entries.
pub trait Renderer {
    fn render(&mut self, positions: &[f64], angles: &[f64], pixels: &mut Vec<u32>) -> (usize, usize);
}

impl<F> Renderer for F
where
    F: FnMut(&[f64], &[f64], &mut Vec<u32>) -> (usize, usize),
{
    fn render(&mut self, positions: &[f64], angles: &[f64], pixels: &mut Vec<u32>) -> (usize, usize) {
        self(positions, angles, pixels)
    }
}
