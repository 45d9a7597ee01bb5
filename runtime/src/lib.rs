//! Executes compiled widget bundles on an embedded QuickJS engine.
//!
//! [`ComponentRuntime`] evaluates one bundle against an ordered chain of
//! [`ModuleResolver`]s and hands back a [`WidgetComponent`]; [`WidgetRuntime`]
//! drives one widget from source to a rendered tree.

pub mod component;
pub mod console;
pub mod context;
pub mod error;
pub mod resolver;
pub mod widget;

pub use component::{ComponentRuntime, WidgetComponent, MAX_RENDER_PASSES};
pub use context::{DataSource, DataSourceError, InMemoryDataSource, RuntimeContext};
pub use error::{RuntimeError, RuntimeResult, WidgetError};
pub use resolver::{
    JsonModuleResolver, ModuleResolver, ReactModuleResolver, UiPrimitivesResolver,
    UtilsModuleResolver,
};
pub use widget::{WidgetRuntime, WidgetSource, WidgetStage};
