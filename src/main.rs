use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use colored::*;
use qyp::{ipc, ping, try_compile, CompileRequest};
use qyp_bundler::template::{DEFAULT_QUERY_SOURCE, DEFAULT_WIDGET_SOURCE};
use qyp_bundler::{build_default_fs, BundleConfig, ComponentCompiler};
use qyp_runtime::{InMemoryDataSource, WidgetRuntime, WidgetSource};
use qyp_vfs::SerializedVirtualNode;

/// qyp - compile and run dashboard widgets from an in-memory source tree
#[derive(Parser)]
#[command(name = "qyp", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Print verbose logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct WidgetFiles {
    /// Widget component source (defaults to the starter widget)
    #[arg(short = 'w', long)]
    widget: Option<PathBuf>,

    /// Query module source (defaults to the starter query)
    #[arg(short = 'q', long)]
    query: Option<PathBuf>,
}

impl WidgetFiles {
    fn load(&self) -> anyhow::Result<WidgetSource> {
        Ok(WidgetSource::new(
            read_or(self.widget.as_deref(), DEFAULT_WIDGET_SOURCE)?,
            read_or(self.query.as_deref(), DEFAULT_QUERY_SOURCE)?,
        ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle a widget and derive its stylesheet
    Compile {
        /// Serialized tree (JSON list of nodes) to compile instead of widget sources
        #[arg(short = 's', long, conflicts_with_all = ["widget", "query"])]
        snapshot: Option<PathBuf>,

        #[command(flatten)]
        files: WidgetFiles,

        #[command(flatten)]
        config: BundleConfig,

        /// Write bundle.js and bundle.css here instead of printing them
        #[arg(short = 'o', long)]
        out_dir: Option<PathBuf>,
    },

    /// Print the serialized widget workspace
    Snapshot {
        #[command(flatten)]
        files: WidgetFiles,
    },

    /// Compile, bind rows, build and render a widget
    Run {
        #[command(flatten)]
        files: WidgetFiles,

        /// JSON array of rows returned for every query
        #[arg(short = 'r', long)]
        rows: Option<PathBuf>,

        /// JSON object passed as props
        #[arg(short = 'p', long, default_value = "{}")]
        props: String,
    },

    /// Answer base64 JSON frames on stdin/stdout
    Serve,

    /// Check the service responds
    Ping {
        message: Option<String>,
    },
}

fn read_or(path: Option<&Path>, fallback: &str) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => Ok(fallback.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Compile {
            snapshot,
            files,
            config,
            out_dir,
        } => run_compile(snapshot, files, config, out_dir).await,
        Commands::Snapshot { files } => {
            let source = files.load()?;
            let vfs = build_default_fs(&source.widget, &source.query)?;
            println!("{}", serde_json::to_string_pretty(&vfs.serialize())?);
            Ok(())
        }
        Commands::Run { files, rows, props } => run_widget(files, rows, &props).await,
        Commands::Serve => {
            let reader = tokio::io::BufReader::new(tokio::io::stdin());
            ipc::serve(reader, tokio::io::stdout()).await
        }
        Commands::Ping { message } => {
            println!("{}", ping(message.as_deref()));
            Ok(())
        }
    }
}

async fn run_compile(
    snapshot: Option<PathBuf>,
    files: WidgetFiles,
    config: BundleConfig,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (js, css) = match snapshot {
        Some(path) => {
            eprintln!("{} {}...", "Compiling".cyan().bold(), path.display());
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let nodes: Vec<SerializedVirtualNode> = serde_json::from_str(&text)?;
            let mut request = CompileRequest::new(nodes, config.entry.clone());
            request.options = Some(qyp::CompileOptions {
                minify: config.minify,
            });
            let response = try_compile(&request).await?;
            (response.js_bundle, response.css_bundle)
        }
        None => {
            eprintln!("{} {}...", "Compiling".cyan().bold(), config.entry);
            let source = files.load()?;
            let compiled = ComponentCompiler::new(config)
                .compile(&source.widget, &source.query)
                .await?;
            (compiled.js_bundle, compiled.css_bundle)
        }
    };

    match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join("bundle.js"), js)?;
            std::fs::write(dir.join("bundle.css"), css)?;
            eprintln!("{} {}", "Wrote".green().bold(), dir.display());
        }
        None => {
            println!("{js}");
            println!("{css}");
        }
    }
    Ok(())
}

async fn run_widget(files: WidgetFiles, rows: Option<PathBuf>, props: &str) -> anyhow::Result<()> {
    let rows: Vec<serde_json::Value> = match rows {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
        None => Vec::new(),
    };
    let props: serde_json::Value = serde_json::from_str(props).context("props must be JSON")?;

    let mut widget = WidgetRuntime::new(ComponentCompiler::default());
    widget.set_source(files.load()?);

    eprintln!("{} widget...", "Compiling".cyan().bold());
    widget.compile_bundle().await?;
    widget.attach_data_source(Arc::new(InMemoryDataSource::new().with_fallback(rows)))?;
    widget.build_component()?;

    eprintln!("{} widget...", "Rendering".green().bold());
    let tree = widget.render(&props)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
