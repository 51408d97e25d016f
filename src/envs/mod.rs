pub mod cart_pole;
pub mod continuous;
pub mod vision;

pub use cart_pole::CartPoleEnv;
pub use continuous::ContinuousCartPoleEnv;
pub use vision::VisionCartPoleEnv;
