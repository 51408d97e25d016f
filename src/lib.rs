pub mod config;
pub mod core;
pub mod dynamics;
pub mod envs;
pub mod frames;
pub mod spaces;
pub mod utils;

pub use crate::config::{CartPoleConfig, Integrator, StackLayout};
pub use crate::core::{Env, GymError, Info, InfoValue, Renderer, Result, Step};
pub use crate::dynamics::{Dynamics, EpisodeStatus};
pub use crate::envs::{CartPoleEnv, ContinuousCartPoleEnv, VisionCartPoleEnv};
pub use crate::frames::{Frame, FrameHistory};
pub use crate::spaces::{Discrete, GaussianSpace, Space};
pub use crate::utils::{encode_png, save_png, DepthPoleRenderer};
