//! Lifecycle of one widget: source, compiled bundle, bound data source and
//! built component, strictly in that order.

use std::fmt;
use std::sync::Arc;

use qyp_bundler::{CompiledWidget, ComponentCompiler};

use crate::component::{ComponentRuntime, WidgetComponent};
use crate::context::{DataSource, RuntimeContext};
use crate::error::WidgetError;
use crate::resolver::ModuleResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WidgetStage {
    Empty,
    SourceSet,
    Compiled,
    BoundToDataSource,
    Built,
}

impl fmt::Display for WidgetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetStage::Empty => "empty",
            WidgetStage::SourceSet => "source set",
            WidgetStage::Compiled => "compiled",
            WidgetStage::BoundToDataSource => "bound to a data source",
            WidgetStage::Built => "built",
        };
        f.write_str(name)
    }
}

/// The two files a widget is authored as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSource {
    pub widget: String,
    pub query: String,
}

impl WidgetSource {
    pub fn new(widget: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            widget: widget.into(),
            query: query.into(),
        }
    }
}

#[derive(Default)]
pub struct WidgetRuntime {
    compiler: ComponentCompiler,
    source: Option<WidgetSource>,
    compiled: Option<CompiledWidget>,
    data_source: Option<Arc<dyn DataSource>>,
    component: Option<WidgetComponent>,
    resolvers: Vec<Arc<dyn ModuleResolver>>,
}

impl fmt::Debug for WidgetRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRuntime")
            .field("stage", &self.stage())
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

impl WidgetRuntime {
    pub fn new(compiler: ComponentCompiler) -> Self {
        Self {
            compiler,
            ..Default::default()
        }
    }

    /// Extra resolvers, consulted after the built-in chain.
    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn stage(&self) -> WidgetStage {
        if self.component.is_some() {
            WidgetStage::Built
        } else if self.data_source.is_some() {
            WidgetStage::BoundToDataSource
        } else if self.compiled.is_some() {
            WidgetStage::Compiled
        } else if self.source.is_some() {
            WidgetStage::SourceSet
        } else {
            WidgetStage::Empty
        }
    }

    fn require(&self, required: WidgetStage) -> Result<(), WidgetError> {
        let current = self.stage();
        if current < required {
            return Err(WidgetError::StatePrecondition { required, current });
        }
        Ok(())
    }

    fn reset_downstream(&mut self) {
        self.compiled = None;
        self.data_source = None;
        self.component = None;
    }

    /// New source discards everything derived from the old one.
    pub fn set_source(&mut self, source: WidgetSource) {
        tracing::debug!(stage = %self.stage(), "widget source replaced");
        self.reset_downstream();
        self.source = Some(source);
    }

    pub async fn compile_bundle(&mut self) -> Result<&CompiledWidget, WidgetError> {
        self.require(WidgetStage::SourceSet)?;
        let Some(source) = &self.source else {
            return Err(WidgetError::StatePrecondition {
                required: WidgetStage::SourceSet,
                current: self.stage(),
            });
        };
        let compiled = self.compiler.compile(&source.widget, &source.query).await?;
        self.reset_downstream();
        Ok(self.compiled.insert(compiled))
    }

    /// Restores a bundle compiled earlier for `source`.
    pub fn set_compiled(&mut self, source: WidgetSource, compiled: CompiledWidget) {
        self.reset_downstream();
        self.source = Some(source);
        self.compiled = Some(compiled);
    }

    pub fn attach_data_source(&mut self, data_source: Arc<dyn DataSource>) -> Result<(), WidgetError> {
        self.require(WidgetStage::Compiled)?;
        self.component = None;
        self.data_source = Some(data_source);
        Ok(())
    }

    pub fn build_component(&mut self) -> Result<&mut WidgetComponent, WidgetError> {
        self.require(WidgetStage::BoundToDataSource)?;
        let (Some(compiled), Some(data_source)) = (&self.compiled, &self.data_source) else {
            return Err(WidgetError::StatePrecondition {
                required: WidgetStage::BoundToDataSource,
                current: self.stage(),
            });
        };

        let mut runtime = ComponentRuntime::new(RuntimeContext::with_data_source(data_source.clone()));
        for resolver in &self.resolvers {
            runtime.add_module_resolver(resolver.clone());
        }
        let component = runtime.compile_component_module(&compiled.js_bundle)?;
        Ok(self.component.insert(component))
    }

    pub fn render(&mut self, props: &serde_json::Value) -> Result<serde_json::Value, WidgetError> {
        self.require(WidgetStage::Built)?;
        match self.component.as_mut() {
            Some(component) => Ok(component.render(props)?),
            None => Err(WidgetError::StatePrecondition {
                required: WidgetStage::Built,
                current: self.stage(),
            }),
        }
    }

    pub fn source(&self) -> Option<&WidgetSource> {
        self.source.as_ref()
    }

    pub fn compiled(&self) -> Option<&CompiledWidget> {
        self.compiled.as_ref()
    }

    pub fn data_source(&self) -> Option<&Arc<dyn DataSource>> {
        self.data_source.as_ref()
    }

    pub fn component(&self) -> Option<&WidgetComponent> {
        self.component.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InMemoryDataSource;
    use qyp_bundler::template::{DEFAULT_QUERY_SOURCE, DEFAULT_WIDGET_SOURCE};
    use serde_json::json;

    const TRIVIAL: &str = "export default function C() { return null }";

    fn compiled() -> CompiledWidget {
        CompiledWidget {
            props: Vec::new(),
            js_bundle: "exports.default = function C() { return 'ok'; };".to_string(),
            css_bundle: String::new(),
        }
    }

    #[test]
    fn test_stage_order() {
        assert!(WidgetStage::Empty < WidgetStage::SourceSet);
        assert!(WidgetStage::BoundToDataSource < WidgetStage::Built);
        assert_eq!(WidgetStage::BoundToDataSource.to_string(), "bound to a data source");
    }

    #[tokio::test]
    async fn test_compile_requires_source() {
        let mut widget = WidgetRuntime::default();
        let err = widget.compile_bundle().await.unwrap_err();
        assert!(matches!(
            err,
            WidgetError::StatePrecondition {
                required: WidgetStage::SourceSet,
                current: WidgetStage::Empty
            }
        ));
    }

    #[test]
    fn test_no_skip_ahead() {
        let mut widget = WidgetRuntime::default();
        widget.set_source(WidgetSource::new(TRIVIAL, ""));
        let err = widget
            .attach_data_source(Arc::new(InMemoryDataSource::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            WidgetError::StatePrecondition {
                required: WidgetStage::Compiled,
                current: WidgetStage::SourceSet
            }
        ));
        assert!(widget.build_component().is_err());
        assert!(widget.render(&json!({})).is_err());
        assert_eq!(widget.stage(), WidgetStage::SourceSet);
    }

    #[test]
    fn test_set_source_resets_downstream() {
        let mut widget = WidgetRuntime::default();
        widget.set_compiled(WidgetSource::new(TRIVIAL, ""), compiled());
        widget
            .attach_data_source(Arc::new(InMemoryDataSource::new()))
            .unwrap();
        widget.build_component().unwrap();
        assert_eq!(widget.stage(), WidgetStage::Built);
        assert_eq!(widget.render(&json!({})).unwrap(), json!("ok"));

        widget.set_source(WidgetSource::new(TRIVIAL, "// changed"));
        assert_eq!(widget.stage(), WidgetStage::SourceSet);
        assert!(widget.compiled().is_none());
        assert!(widget.data_source().is_none());
        assert!(widget.component().is_none());
    }

    #[test]
    fn test_rebinding_drops_component() {
        let mut widget = WidgetRuntime::default();
        widget.set_compiled(WidgetSource::new(TRIVIAL, ""), compiled());
        widget
            .attach_data_source(Arc::new(InMemoryDataSource::new()))
            .unwrap();
        widget.build_component().unwrap();
        widget
            .attach_data_source(Arc::new(InMemoryDataSource::new()))
            .unwrap();
        assert_eq!(widget.stage(), WidgetStage::BoundToDataSource);
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let mut widget = WidgetRuntime::default();
        widget.set_source(WidgetSource::new(DEFAULT_WIDGET_SOURCE, DEFAULT_QUERY_SOURCE));
        widget.compile_bundle().await.unwrap();
        assert_eq!(widget.stage(), WidgetStage::Compiled);

        let rows = InMemoryDataSource::new().with_fallback(vec![json!({"count": 7})]);
        widget.attach_data_source(Arc::new(rows)).unwrap();
        widget.build_component().unwrap();
        let tree = widget.render(&json!({})).unwrap();
        assert_eq!(tree["type"], "div");
        assert_eq!(tree["children"][1]["children"], json!(["7"]));
    }
}
