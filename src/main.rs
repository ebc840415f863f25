use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use scene_flattener::config::{CliArgs, LoaderConfig};
use scene_flattener::pipeline::{Pipeline, print_summary};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("scene_flattener=debug")
    } else {
        EnvFilter::new("scene_flattener=info")
    };
    // Logs go to stderr so `--json` output stays machine-readable.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config: LoaderConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    let scene = match Pipeline::run(&config) {
        Ok(scene) => scene,
        Err(e) => {
            error!(%e, "Pipeline failed");
            return Err(anyhow::anyhow!(e)).context("scene-flattener pipeline failed");
        }
    };

    if config.json {
        let json = serde_json::to_string_pretty(&scene.summary())
            .context("Failed to serialize scene summary")?;
        println!("{json}");
    } else {
        print_summary(&scene);
        println!(
            "Done: {} instances, {} triangles in {:.2}s",
            scene.stats.instances,
            scene.stats.triangles,
            scene.duration.as_secs_f64()
        );
    }
    Ok(())
}
