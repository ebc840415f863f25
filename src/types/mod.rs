pub mod geometry;
pub mod material;
pub mod scene;

pub use geometry::{FlattenedGeometry, GpuInstance, Instance, Vertex};
pub use material::{
    GpuMaterial, Material, MaterialTable, MaterialType, NO_TEXTURE, Rgb, TextureReference,
    TextureSource,
};
pub use scene::{
    Camera, DecodedTexture, EnvironmentMapInfo, FovAxis, RenderSettings, SceneDocument, Shape,
    ShapeKind,
};
