//! Error types for widget execution

use qyp_bundler::CompileError;
use thiserror::Error;

use crate::widget::WidgetStage;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The engine itself failed (allocation, context setup, value conversion)
    #[error("JS engine error: {0}")]
    Engine(String),

    /// The bundle threw while being evaluated
    #[error("Module evaluation threw: {0}")]
    EvaluationThrew(String),

    /// Every resolver in the chain passed on this specifier
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    #[error("Module has no default export")]
    NoDefaultExport,

    #[error("Default export is not a component function (found {found})")]
    InvalidComponentExport { found: String },

    /// The component threw while rendering or running effects
    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rquickjs::Error> for RuntimeError {
    fn from(error: rquickjs::Error) -> Self {
        RuntimeError::Engine(error.to_string())
    }
}

/// Lifecycle failures of a [`WidgetRuntime`](crate::WidgetRuntime)
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Widget must be {required} for this operation, but is {current}")]
    StatePrecondition {
        required: WidgetStage,
        current: WidgetStage,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
