use std::path::PathBuf;

use clap::Parser;

/// Texture loading parameters.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Decode referenced textures. When off, every slot keeps the
    /// no-texture sentinel.
    pub enabled: bool,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Fully resolved loader configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub input: PathBuf,
    pub textures: TextureConfig,
    pub load_environment: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
    pub json: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            textures: TextureConfig::default(),
            load_environment: true,
            dry_run: false,
            verbose: false,
            threads: None,
            json: false,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "scene-flattener",
    about = "Mitsuba-style XML scene to renderer-ready buffers",
    version
)]
pub struct CliArgs {
    /// Scene file (XML)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Skip texture decoding
    #[arg(long)]
    pub no_textures: bool,

    /// Skip decoding the environment map
    #[arg(long)]
    pub no_envmap: bool,

    /// Parse and resolve only, no tessellation
    #[arg(long)]
    pub dry_run: bool,

    /// Print the scene summary as JSON (logs on stderr switch to JSON too)
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Texture decode thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for LoaderConfig {
    fn from(args: CliArgs) -> Self {
        LoaderConfig {
            input: args.input,
            textures: TextureConfig {
                enabled: !args.no_textures,
            },
            load_environment: !args.no_envmap,
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
            json: args.json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_loader_config() {
        let config = LoaderConfig::default();
        assert!(config.textures.enabled);
        assert!(config.load_environment);
        assert!(!config.dry_run);
        assert!(!config.json);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn cli_args_to_loader_config() {
        let args = CliArgs::parse_from([
            "scene-flattener",
            "-i",
            "cornell-box/scene.xml",
            "--no-textures",
            "--no-envmap",
            "--dry-run",
            "--json",
            "-v",
            "-j",
            "4",
        ]);

        let config: LoaderConfig = args.into();

        assert_eq!(config.input, PathBuf::from("cornell-box/scene.xml"));
        assert!(!config.textures.enabled);
        assert!(!config.load_environment);
        assert!(config.dry_run);
        assert!(config.json);
        assert!(config.verbose);
        assert_eq!(config.threads, Some(4));
    }

    #[test]
    fn cli_args_minimal() {
        let args = CliArgs::parse_from(["scene-flattener", "-i", "scene.xml"]);
        let config: LoaderConfig = args.into();

        assert_eq!(config.input, PathBuf::from("scene.xml"));
        assert!(config.textures.enabled);
        assert!(config.load_environment);
        assert!(!config.dry_run);
        assert!(!config.verbose);
        assert!(!config.json);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn input_is_required() {
        assert!(CliArgs::try_parse_from(["scene-flattener"]).is_err());
    }
}
