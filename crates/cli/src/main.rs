use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use shrink::augment::Technique;
use shrink::config::{self, Config};
use shrink::dataset;
use shrink::orchestrator::{AugmentationOrchestrator, Collaborators};

#[derive(Parser)]
#[command(name = "shrink")]
#[command(about = "Shrink CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a commented default config.yaml.
    Init {
        /// Config file path (default: SHRINK_CONFIG_PATH or ~/.shrink/config.yaml)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Augment a JSON array of expanded queries; writes the augmented records and the merged teacher prompts.
    Augment {
        /// Expanded queries (JSON array with `tool` and `expanded_query` fields)
        #[arg(long, short, value_name = "FILE")]
        input: PathBuf,

        /// Config file path (default: SHRINK_CONFIG_PATH or ~/.shrink/config.yaml)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Random seed (default: SHRINK_SEED or config)
        #[arg(long, short)]
        seed: Option<u64>,

        /// Output directory (default: paths.output_dir from config)
        #[arg(long, short, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Records augmented at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Technique to leave out (repeatable)
        #[arg(long, value_name = "TECHNIQUE")]
        exclude: Vec<String>,
    },

    /// Augment a single query and print `technique: variant` lines.
    Sample {
        /// Query to augment; `[name]` marks a placeholder
        query: String,

        /// Config file path (default: SHRINK_CONFIG_PATH or ~/.shrink/config.yaml)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Random seed (default: SHRINK_SEED or config)
        #[arg(long, short)]
        seed: Option<u64>,

        /// Variants per technique (default from config)
        #[arg(long, short)]
        variants: Option<usize>,

        /// Technique to leave out (repeatable)
        #[arg(long, value_name = "TECHNIQUE")]
        exclude: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("shrink {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("{}", failure_message("init", &e));
                std::process::exit(1);
            }
        }
        Some(Commands::Augment {
            input,
            config,
            seed,
            output,
            concurrency,
            exclude,
        }) => {
            if let Err(e) = run_augment(input, config, seed, output, concurrency, exclude).await {
                log::error!("{}", failure_message("augment", &e));
                std::process::exit(1);
            }
        }
        Some(Commands::Sample {
            query,
            config,
            seed,
            variants,
            exclude,
        }) => {
            if let Err(e) = run_sample(query, config, seed, variants, exclude).await {
                log::error!("{}", failure_message("sample", &e));
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

/// One-line failure report including the whole context chain.
fn failure_message(command: &str, err: &anyhow::Error) -> String {
    format!("{} failed: {:#}", command, err)
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let dir = shrink::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

/// Config with CLI overrides applied, plus the seed and the path it was loaded from.
fn load(
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    exclude: Vec<String>,
) -> anyhow::Result<(Config, PathBuf, u64)> {
    let (mut config, path) = config::load_config(config_path)?;
    let seed = seed.unwrap_or_else(|| config::resolve_seed(&config));
    config.augmentation.exclude.extend(exclude);
    Ok((config, path, seed))
}

async fn run_augment(
    input: PathBuf,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
    exclude: Vec<String>,
) -> anyhow::Result<()> {
    let (mut config, path, seed) = load(config_path, seed, exclude)?;
    if let Some(n) = concurrency {
        config.augmentation.concurrency = n;
    }
    let collaborators = Collaborators::from_config(&config, &path)?;
    let orchestrator = AugmentationOrchestrator::from_settings(&config.augmentation, &collaborators)?;

    let queries = dataset::load_queries(&input)?;
    log::info!("loaded {} queries from {}", queries.len(), input.display());
    let mut rng = StdRng::seed_from_u64(seed);
    let records = orchestrator.generate_variants(&queries, &mut rng).await;

    let out_dir =
        output.unwrap_or_else(|| config::resolve_relative(&path, &config.paths.output_dir));
    dataset::save_json(&out_dir.join(dataset::augmented_file_name(seed)), &records)?;
    let prompts = dataset::merge_prompts(&records);
    dataset::save_json(&out_dir.join(dataset::merged_file_name(seed)), &prompts)?;
    println!(
        "augmented {} queries into {} prompts in {} (seed {})",
        queries.len(),
        prompts.len(),
        out_dir.display(),
        seed
    );
    Ok(())
}

async fn run_sample(
    query: String,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    variants: Option<usize>,
    exclude: Vec<String>,
) -> anyhow::Result<()> {
    let (mut config, path, seed) = load(config_path, seed, exclude)?;
    if let Some(n) = variants {
        for technique in Technique::ALL {
            config
                .augmentation
                .variants
                .insert(technique.as_str().to_string(), n);
        }
    }
    let collaborators = Collaborators::from_config(&config, &path)?;
    let orchestrator = AugmentationOrchestrator::from_settings(&config.augmentation, &collaborators)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let records = orchestrator.generate_variants(&[query], &mut rng).await;
    for record in &records {
        for (technique, produced) in &record.variants {
            for v in produced {
                println!("{}: {}", technique, v);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_failure_reports_the_cause() {
        let dir = std::env::temp_dir().join(format!("shrink-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = run_init(Some(blocker.join("config.yaml"))).unwrap_err();
        let msg = failure_message("init", &err);
        assert!(msg.starts_with("init failed: creating config directory"), "{msg}");
        assert!(msg.len() > format!("init failed: {}", err).len(), "{msg}");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
