//! Widget compilation: validation, then the JS bundle and the stylesheet
//! built side by side from one shared tree.

use std::sync::Arc;

use qyp_vfs::{VfsError, VirtualFs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyze::{analyze_component_props, PropDefinition};
use crate::stylesheet::StylesheetCompiler;
use crate::template::{build_default_fs, UI_SAFELIST};
use crate::{bundle, BundleConfig, BundleError};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("Compile task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub js_bundle: String,
    pub css_bundle: String,
}

/// Bundle `config.entry` and derive the stylesheet concurrently. Both halves
/// only read the tree; both must succeed.
#[tracing::instrument(skip_all, fields(entry = %config.entry))]
pub async fn compile(
    vfs: Arc<VirtualFs>,
    config: &BundleConfig,
    stylesheet: &StylesheetCompiler,
) -> Result<CompilationResult, CompileError> {
    let css_vfs = Arc::clone(&vfs);
    let stylesheet = stylesheet.clone();
    let css_task = tokio::task::spawn_blocking(move || stylesheet.compile_vfs(&css_vfs));

    let (js, css) = tokio::try_join!(
        async { bundle(vfs, config).await.map_err(CompileError::from) },
        async { css_task.await.map_err(CompileError::from) },
    )?;

    Ok(CompilationResult {
        js_bundle: js.code,
        css_bundle: css,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Cheap textual checks run before any bundling.
pub fn validate(source: &str) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if source.trim().is_empty() {
        errors.push("Source must not be empty".to_string());
        return ValidationResult {
            is_valid: false,
            errors,
            warnings,
        };
    }

    if !source.contains("export default") {
        errors.push("Component must have a default export".to_string());
    }

    if source.contains('<')
        && source.contains('>')
        && !source.contains("import")
        && !source.contains("React")
    {
        warnings.push("JSX code may need a React import".to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Output of [`ComponentCompiler::compile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledWidget {
    pub props: Vec<PropDefinition>,
    pub js_bundle: String,
    pub css_bundle: String,
}

/// Compiles widget sources inside the default workspace.
#[derive(Debug, Clone)]
pub struct ComponentCompiler {
    config: BundleConfig,
    stylesheet: StylesheetCompiler,
}

impl Default for ComponentCompiler {
    fn default() -> Self {
        Self::new(BundleConfig::default())
    }
}

impl ComponentCompiler {
    pub fn new(config: BundleConfig) -> Self {
        Self {
            config,
            stylesheet: StylesheetCompiler::new().with_safelist(UI_SAFELIST.iter().copied()),
        }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn validate(&self, source: &str) -> ValidationResult {
        validate(source)
    }

    pub async fn compile(
        &self,
        widget_source: &str,
        query_source: &str,
    ) -> Result<CompiledWidget, CompileError> {
        let validation = validate(widget_source);
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }
        if !validation.is_valid {
            return Err(CompileError::Validation(validation.errors));
        }

        let vfs = Arc::new(build_default_fs(widget_source, query_source)?);
        let result = compile(vfs, &self.config, &self.stylesheet).await?;

        Ok(CompiledWidget {
            props: analyze_component_props(widget_source),
            js_bundle: result.js_bundle,
            css_bundle: result.css_bundle,
        })
    }

    /// Compile an arbitrary tree with this compiler's settings.
    pub async fn compile_vfs(&self, vfs: Arc<VirtualFs>) -> Result<CompilationResult, CompileError> {
        compile(vfs, &self.config, &self.stylesheet).await
    }
}
