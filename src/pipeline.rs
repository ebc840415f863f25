use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::camera::CameraPose;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::flatten::{FlattenedScene, flatten_scene};
use crate::ingestion::FileMeshSource;
use crate::scene::{parse_file, resolve_document_textures};
use crate::textures::{ImageDecoder, TextureDecoder};
use crate::types::{DecodedTexture, EnvironmentMapInfo, RenderSettings, Rgb, SceneDocument};

/// Counts describing a loaded scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    /// Dense material array length, including inline and default materials.
    pub materials: usize,
    pub shapes: usize,
    pub instances: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub textures: usize,
    pub emitters: usize,
}

impl SceneStats {
    pub fn compute(document: &SceneDocument, flattened: &FlattenedScene) -> Self {
        let geometry = &flattened.geometry;
        // A dry run leaves `flattened` empty; count the document's table instead.
        let materials = if flattened.materials.is_empty() {
            document.materials.len()
        } else {
            flattened.materials.len()
        };
        Self {
            materials,
            shapes: document.shapes.len(),
            instances: geometry.instances.len(),
            vertices: geometry.vertex_count(),
            triangles: geometry.triangle_count(),
            textures: document.textures.len(),
            emitters: document.shapes.iter().filter(|s| s.is_emitter).count(),
        }
    }
}

/// Everything a renderer needs from one scene file.
#[derive(Debug)]
pub struct RenderScene {
    pub document: SceneDocument,
    /// Empty on a dry run.
    pub flattened: FlattenedScene,
    pub camera: CameraPose,
    pub environment_texture: Option<DecodedTexture>,
    pub stats: SceneStats,
    pub duration: Duration,
}

/// Serializable overview of a [`RenderScene`], without the bulk buffers.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary<'a> {
    pub stats: &'a SceneStats,
    pub camera: &'a CameraPose,
    pub environment: &'a EnvironmentMapInfo,
    pub background: Option<Rgb>,
    pub settings: &'a RenderSettings,
    pub elapsed_seconds: f64,
}

impl RenderScene {
    pub fn summary(&self) -> SceneSummary<'_> {
        SceneSummary {
            stats: &self.stats,
            camera: &self.camera,
            environment: &self.document.environment,
            background: self.document.background,
            settings: &self.document.settings,
            elapsed_seconds: self.duration.as_secs_f64(),
        }
    }
}

/// Pipeline orchestrator -- drives the four loading stages.
pub struct Pipeline;

impl Pipeline {
    /// Load a scene with the `image`-backed texture decoder.
    pub fn run(config: &LoaderConfig) -> Result<RenderScene> {
        Self::run_with_decoder(config, &ImageDecoder)
    }

    /// Load a scene, decoding textures through `decoder`.
    pub fn run_with_decoder<D>(config: &LoaderConfig, decoder: &D) -> Result<RenderScene>
    where
        D: TextureDecoder + ?Sized,
    {
        let start = Instant::now();
        info!(input = %config.input.display(), "Starting pipeline");

        info!("Stage 1/4: Parse");
        let mut document = parse_file(&config.input)?;

        if config.textures.enabled {
            info!("Stage 2/4: Textures");
            resolve_document_textures(&mut document, decoder);
        } else {
            info!("Stage 2/4: Textures (disabled)");
        }

        let flattened = if config.dry_run {
            info!("--dry-run: skipping tessellation");
            FlattenedScene::default()
        } else {
            info!("Stage 3/4: Geometry");
            let source = FileMeshSource::new(&document.scene_dir);
            flatten_scene(&document, &source)
        };

        let environment_texture = if config.load_environment && !config.dry_run {
            info!("Stage 4/4: Environment");
            Self::load_environment(&document, decoder)
        } else {
            None
        };

        let camera = CameraPose::from_camera(&document.camera);
        let stats = SceneStats::compute(&document, &flattened);
        let duration = start.elapsed();
        info!(
            instances = stats.instances,
            triangles = stats.triangles,
            elapsed = ?duration,
            "Pipeline complete"
        );

        Ok(RenderScene {
            document,
            flattened,
            camera,
            environment_texture,
            stats,
            duration,
        })
    }

    fn load_environment<D>(document: &SceneDocument, decoder: &D) -> Option<DecodedTexture>
    where
        D: TextureDecoder + ?Sized,
    {
        let env = &document.environment;
        if !env.present {
            return None;
        }
        match decoder.decode(&document.scene_dir.join(&env.filename)) {
            Ok(texture) => Some(texture),
            Err(e) => {
                warn!(filename = %env.filename, "Failed to load environment map: {e}");
                None
            }
        }
    }
}

/// Print a human-readable summary of a loaded scene.
pub fn print_summary(scene: &RenderScene) {
    let stats = &scene.stats;
    println!("=== Scene Summary ===");
    println!("  Materials: {}", stats.materials);
    println!("  Shapes:    {}", stats.shapes);
    println!("  Instances: {}", stats.instances);
    println!("  Vertices:  {}", stats.vertices);
    println!("  Triangles: {}", stats.triangles);
    println!("  Textures:  {}", stats.textures);
    println!("  Emitters:  {}", stats.emitters);
    println!();

    let cam = &scene.camera;
    let film = &scene.document.camera;
    println!("=== Camera ===");
    println!(
        "  Eye:     ({:.3}, {:.3}, {:.3})",
        cam.eye.x, cam.eye.y, cam.eye.z
    );
    println!(
        "  Forward: ({:.3}, {:.3}, {:.3})",
        cam.forward.x, cam.forward.y, cam.forward.z
    );
    println!(
        "  FOV:     {:.1}° ({:.1}° vertical)",
        cam.fov_degrees,
        cam.vertical_fov_degrees(film.aspect_ratio())
    );
    println!("  Film:    {}x{}", film.film_width, film.film_height);

    let env = &scene.document.environment;
    if env.present {
        println!();
        println!("=== Environment ===");
        println!("  File:      {}", env.filename);
        println!("  Intensity: {:.3}", env.intensity);
        println!(
            "  Loaded:    {}",
            if scene.environment_texture.is_some() { "yes" } else { "no" }
        );
    }
}
