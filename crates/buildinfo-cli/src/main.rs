#![deny(unsafe_code)]

//! buildinfo CLI: create, inspect, and label build metadata records.

mod build_info;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use buildinfo_config::{BuildInfoConfig, DEFAULT_CONFIG_FILE};
use buildinfo_core::labels::stringify;
use buildinfo_core::{BuildInfoManager, BuildMetadata, GitCli, LabelCodec};

/// Generate, persist, and query build metadata for CI/CD pipelines.
#[derive(Parser)]
#[command(
    name = "buildinfo",
    version = build_info::VERSION_STRING,
    about,
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Debug mode, show log output on stderr.
    #[arg(long, visible_alias = "verbose", global = true)]
    debug: bool,

    /// Path to configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FileArgs {
    /// Path of build info file [default: from config, else ./build-info.json].
    #[arg(long = "filePath", visible_alias = "file-path", value_name = "PATH")]
    file_path: Option<PathBuf>,
}

#[derive(Args)]
struct NamespaceArgs {
    /// Prefix labels with a custom namespace, e.g. com.someorg.myproject.
    #[arg(
        long = "labelNamespace",
        visible_alias = "label-namespace",
        value_name = "NAMESPACE"
    )]
    label_namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create build info file.
    Create {
        /// Set a property value, overriding any derived value.
        #[arg(short = 'p', long = "prop", value_name = "KEY=VALUE", num_args = 1.., value_parser = parse_prop)]
        props: Vec<(String, String)>,

        #[command(flatten)]
        file: FileArgs,

        /// Output docker args from the created build info instead of JSON.
        #[arg(short = 'd', long = "dockerArgs", visible_alias = "docker-args")]
        docker_args: bool,

        #[command(flatten)]
        namespace: NamespaceArgs,
    },

    /// Determine the build version.
    BuildVersion {
        /// Explicit version base, e.g. v1.2.3. Derived via git when omitted.
        #[arg(short, long)]
        base: Option<String>,

        /// Appended to the version as "{base}__{suffix}", e.g. a branch name.
        #[arg(short, long)]
        suffix: Option<String>,
    },

    /// Inspect an existing build info file.
    Inspect {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Determine docker build args from an existing build info file.
    DockerArgs {
        #[command(flatten)]
        file: FileArgs,

        #[command(flatten)]
        namespace: NamespaceArgs,
    },

    /// Rebuild build info from image labels (a JSON object of label -> value).
    FromLabels {
        /// File holding the label JSON, e.g. from
        /// `docker inspect --format '{{json .Config.Labels}}'`. Reads stdin when omitted.
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        #[command(flatten)]
        namespace: NamespaceArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing(cli.debug, &config.logging.level);
    debug!(config = %cli.config.display(), "Resolved configuration");

    let git = GitCli::new(&config.git.bin, &config.git.repo_dir);
    let manager = BuildInfoManager::new(git);

    match cli.command {
        Commands::Create {
            props,
            file,
            docker_args,
            namespace,
        } => {
            let path = file_path(&file, &config);
            let record = manager.create(props, &path)?;
            if docker_args {
                println!("{}", codec(&namespace, &config).docker_args(&record));
            } else {
                println!("{}", record.to_json_pretty()?);
            }
        }
        Commands::BuildVersion { base, suffix } => {
            let version = manager.determine_build_version(base.as_deref(), suffix.as_deref())?;
            println!("{version}");
        }
        Commands::Inspect { file } => {
            let path = file_path(&file, &config);
            if let Some(record) = load_record(&manager, &path)? {
                println!("{}", record.to_json_pretty()?);
            }
        }
        Commands::DockerArgs { file, namespace } => {
            let path = file_path(&file, &config);
            if let Some(record) = load_record(&manager, &path)? {
                println!("{}", codec(&namespace, &config).docker_args(&record));
            }
        }
        Commands::FromLabels { input, namespace } => {
            let text = read_input(input.as_deref())?;
            let record = decode_labels(&codec(&namespace, &config), &text)?;
            println!("{}", record.to_json_pretty()?);
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing(debug: bool, configured_level: &str) {
    let filter = if debug { "debug" } else { configured_level };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<BuildInfoConfig> {
    if path.exists() {
        BuildInfoConfig::load(path)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    } else {
        Ok(BuildInfoConfig::default())
    }
}

fn file_path(args: &FileArgs, config: &BuildInfoConfig) -> PathBuf {
    args.file_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.record.file_path))
}

fn codec(args: &NamespaceArgs, config: &BuildInfoConfig) -> LabelCodec {
    let namespace = args
        .label_namespace
        .as_deref()
        .or(config.labels.namespace.as_deref());
    LabelCodec::new(namespace)
}

fn load_record(
    manager: &BuildInfoManager<GitCli>,
    path: &Path,
) -> Result<Option<BuildMetadata>> {
    let record = manager.load(path)?;
    if record.is_none() {
        warn!(path = %path.display(), "Build info not found");
    }
    Ok(record)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read labels from '{}'", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read labels from stdin")?;
            Ok(text)
        }
    }
}

/// Decode a JSON label object. `null` (an image without labels) decodes to
/// an empty record.
fn decode_labels(codec: &LabelCodec, text: &str) -> Result<BuildMetadata> {
    let labels = match serde_json::from_str::<Value>(text).context("labels are not valid JSON")? {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => bail!("expected a JSON object of labels, got {other}"),
    };
    info!(labels = labels.len(), prefix = codec.prefix(), "Decoding labels");
    Ok(codec.decode(labels.iter().map(|(k, v)| (k, stringify(v)))))
}

/// Split a `key=value` property on its first `=`.
fn parse_prop(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty key in `{s}`")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}
