pub mod loader;

pub use loader::{Aabb, ModelInfo, SceneModel, TARGET_SIZE, load_model};
