pub mod camera;
pub mod config;
pub mod error;
pub mod flatten;
pub mod ingestion;
pub mod material;
pub mod parsing;
pub mod pipeline;
pub mod scene;
pub mod textures;
pub mod types;

pub use camera::CameraPose;
pub use config::{LoaderConfig, TextureConfig};
pub use error::{Result, SceneError};
pub use flatten::{FlattenedScene, Flattener, flatten_scene};
pub use pipeline::{Pipeline, RenderScene, SceneStats};
pub use scene::{load_scene, parse_file, parse_str};
