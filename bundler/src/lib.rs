//! Widget bundling over an in-memory source tree
//!
//! The only module universe Rolldown sees is a [`VirtualFs`]: the
//! [`VfsPlugin`] answers every resolve and load request from the tree, marks
//! externalized files and bare packages as external, and fails the build on
//! the first import it cannot place. The output is one CommonJS chunk.
//!
//! Alongside the JS graph, [`stylesheet`] scans the raw text of the tree for
//! utility class names, and [`compiler::compile`] runs both at once.

pub mod analyze;
pub mod compiler;
pub mod plugin;
pub mod stylesheet;
pub mod template;

use std::sync::Arc;

use clap::Args;
use qyp_vfs::{ResolveError, ResolverOptions, VirtualFs, DEFAULT_ALIAS_PREFIX, DEFAULT_SOURCE_ROOT};
use thiserror::Error;

pub use analyze::{analyze_component_props, PropDefinition};
pub use compiler::{
    compile, validate, CompilationResult, CompileError, CompiledWidget, ComponentCompiler,
    ValidationResult,
};
pub use plugin::VfsPlugin;
pub use stylesheet::{build_candidates, extract_candidates, StylesheetCompiler};
pub use template::{build_default_fs, DEFAULT_ENTRY_POINT};

/// Why a widget bundle could not be produced
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Entry point not found: {0}")]
    EntryPointNotFound(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to load {path}: {message}")]
    Load { path: String, message: String },

    #[error("Bundling failed: {0}")]
    BundleFailed(String),

    #[error("Bundler produced no output chunk")]
    NoOutput,
}

pub type BundleResult<T> = Result<T, BundleError>;

/// Entry, minification and import alias for one bundle; also the CLI flags
#[derive(Debug, Clone, Args)]
pub struct BundleConfig {
    /// Entry point inside the virtual tree
    #[arg(short = 'e', long, default_value = DEFAULT_ENTRY_POINT)]
    pub entry: String,

    /// Enable minification
    #[arg(short = 'm', long)]
    pub minify: bool,

    /// Import prefix rewritten to the source root
    #[arg(long, default_value = DEFAULT_ALIAS_PREFIX)]
    pub alias_prefix: String,

    /// Virtual directory the alias prefix points at
    #[arg(long, default_value = DEFAULT_SOURCE_ROOT)]
    pub source_root: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY_POINT.to_string(),
            minify: false,
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
        }
    }
}

impl BundleConfig {
    pub fn with_entry(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            ..Self::default()
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            alias_prefix: self.alias_prefix.clone(),
            source_root: self.source_root.clone(),
            ..ResolverOptions::default()
        }
    }
}

/// A bundled widget module
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// CommonJS module body assigning to `module.exports`
    pub code: String,
    pub warnings: Vec<String>,
}

/// Bundle the tree starting at `config.entry` into a single CommonJS module.
#[tracing::instrument(skip(vfs, config), fields(entry = %config.entry))]
pub async fn bundle(vfs: Arc<VirtualFs>, config: &BundleConfig) -> BundleResult<BundleOutput> {
    use rolldown::{Bundler, BundlerOptions, InputItem, OutputFormat};
    use rolldown_common::{Output, OutputExports};
    use rolldown_plugin::__inner::SharedPluginable;

    if !vfs.file_exists(&config.entry) {
        return Err(BundleError::EntryPointNotFound(config.entry.clone()));
    }

    let plugin = Arc::new(VfsPlugin::new(vfs, config.resolver_options()));
    let plugins: Vec<SharedPluginable> = vec![plugin.clone()];

    let options = BundlerOptions {
        input: Some(vec![InputItem {
            name: Some("widget".to_string()),
            import: qyp_vfs::path::normalize(&config.entry),
        }]),
        format: Some(OutputFormat::Cjs),
        exports: Some(OutputExports::Named),
        minify: Some(rolldown::RawMinifyOptions::Bool(config.minify)),
        ..Default::default()
    };

    let mut bundler = Bundler::with_plugins(options, plugins)
        .map_err(|e| BundleError::BundleFailed(e.to_string()))?;

    let output = match bundler.generate().await {
        Ok(output) => output,
        Err(e) => {
            // the plugin keeps the typed cause of the first hook failure
            return Err(plugin
                .take_failure()
                .unwrap_or_else(|| BundleError::BundleFailed(format!("{:?}", e))));
        }
    };

    let warnings: Vec<String> = output.warnings.iter().map(|w| w.to_string()).collect();
    for w in &warnings {
        tracing::warn!("{}", w);
    }

    let code = output
        .assets
        .iter()
        .find_map(|asset| match asset {
            Output::Chunk(chunk) => Some(chunk.code.clone()),
            _ => None,
        })
        .ok_or(BundleError::NoOutput)?;

    Ok(BundleOutput { code, warnings })
}
