//! Turning bundle text into a live component.
//!
//! A bundle is CommonJS text. It is wrapped in a function taking `module`,
//! `exports` and `require`, evaluated once in a fresh engine, and the default
//! export is kept as the component. `require` walks the resolver chain in
//! registration order; the first resolver that answers wins.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rquickjs::{
    CatchResultExt, Context, Ctx, Exception, Function, Object, Persistent, Runtime, Value,
};

use crate::console;
use crate::context::RuntimeContext;
use crate::error::{RuntimeError, RuntimeResult};
use crate::resolver::{
    react, ModuleResolver, ReactModuleResolver, UiPrimitivesResolver, UtilsModuleResolver,
};

/// Upper bound on render passes triggered by state updates in effects.
pub const MAX_RENDER_PASSES: usize = 8;

const MODULE_CACHE: &str = "__qyp_modules__";

/// Builds components from bundles against one resolver chain.
#[derive(Clone)]
pub struct ComponentRuntime {
    context: RuntimeContext,
    resolvers: Vec<Arc<dyn ModuleResolver>>,
}

impl fmt::Debug for ComponentRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRuntime")
            .field("context", &self.context)
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ComponentRuntime {
    /// The built-in chain: React, UI primitives, then `@/lib/utils`.
    pub fn new(context: RuntimeContext) -> Self {
        Self::empty(context)
            .with_resolver(ReactModuleResolver)
            .with_resolver(UiPrimitivesResolver)
            .with_resolver(UtilsModuleResolver)
    }

    /// No resolvers at all; every `require` fails until some are added.
    pub fn empty(context: RuntimeContext) -> Self {
        Self {
            context,
            resolvers: Vec::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Appends to the end of the chain.
    pub fn add_module_resolver(&mut self, resolver: Arc<dyn ModuleResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    pub fn compile_component_module(&self, bundle: &str) -> RuntimeResult<WidgetComponent> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        let missing = Rc::new(RefCell::new(None::<String>));

        let component = context.with(|ctx| -> RuntimeResult<Persistent<Function<'static>>> {
            console::init(&ctx)?;
            // classic JSX output refers to a global React
            ctx.globals().set("React", react(&ctx)?)?;
            ctx.globals().set(MODULE_CACHE, Object::new(ctx.clone())?)?;

            let wrapper: Function = ctx
                .eval(format!(
                    "(function (module, exports, require) {{\n{bundle}\n}})"
                ))
                .catch(&ctx)
                .map_err(|e| RuntimeError::EvaluationThrew(e.to_string()))?;

            let module = Object::new(ctx.clone())?;
            let exports = Object::new(ctx.clone())?;
            module.set("exports", exports.clone())?;
            let require = require_function(
                &ctx,
                self.resolvers.clone(),
                self.context.clone(),
                missing.clone(),
            )?;

            if let Err(e) = wrapper
                .call::<_, ()>((module.clone(), exports, require))
                .catch(&ctx)
            {
                let message = e.to_string();
                // a miss the bundle caught itself does not explain a later throw
                if let Some(specifier) = missing.borrow_mut().take() {
                    if message.contains(&not_found_message(&specifier)) {
                        return Err(RuntimeError::ModuleNotFound(specifier));
                    }
                }
                return Err(RuntimeError::EvaluationThrew(message));
            }

            let exports: Object = module.get("exports")?;
            let default: Value = exports.get("default")?;
            if default.is_undefined() || default.is_null() {
                return Err(RuntimeError::NoDefaultExport);
            }
            let found = default.type_name().to_string();
            let component = default
                .into_function()
                .ok_or(RuntimeError::InvalidComponentExport { found })?;
            Ok(Persistent::save(&ctx, component))
        })?;

        tracing::debug!("component module built");
        Ok(WidgetComponent {
            component,
            root: None,
            context,
            runtime,
        })
    }
}

fn require_function<'js>(
    ctx: &Ctx<'js>,
    resolvers: Vec<Arc<dyn ModuleResolver>>,
    context: RuntimeContext,
    missing: Rc<RefCell<Option<String>>>,
) -> rquickjs::Result<Function<'js>> {
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, specifier: String| -> rquickjs::Result<Value<'js>> {
            let cache: Object = ctx.globals().get(MODULE_CACHE)?;
            if let Some(module) = cache.get::<_, Option<Value>>(specifier.as_str())? {
                return Ok(module);
            }
            for resolver in &resolvers {
                if let Some(module) = resolver.resolve(&ctx, &context, &specifier)? {
                    tracing::debug!(resolver = resolver.name(), %specifier, "module resolved");
                    cache.set(specifier.as_str(), module.clone())?;
                    return Ok(module);
                }
            }
            let message = not_found_message(&specifier);
            *missing.borrow_mut() = Some(specifier);
            Err(Exception::throw_message(&ctx, &message))
        },
    )?
    .with_name("require")
}

fn not_found_message(specifier: &str) -> String {
    format!("Cannot find module '{specifier}'")
}

/// A component function living in its own engine.
///
/// Field order matters: engine values are released before the context and
/// runtime that own them.
pub struct WidgetComponent {
    component: Persistent<Function<'static>>,
    root: Option<Persistent<Object<'static>>>,
    context: Context,
    runtime: Runtime,
}

impl fmt::Debug for WidgetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetComponent")
            .field("mounted", &self.root.is_some())
            .finish()
    }
}

impl WidgetComponent {
    /// Calls the component function directly with `props` and returns what it
    /// returned, without hooks or effects.
    pub fn call(&self, props: &serde_json::Value) -> RuntimeResult<serde_json::Value> {
        let props = serde_json::to_string(props)?;
        let output = self.context.with(|ctx| -> RuntimeResult<Option<String>> {
            let component = self.component.clone().restore(&ctx)?;
            let props = ctx.json_parse(props)?;
            let value: Value = component
                .call((props,))
                .catch(&ctx)
                .map_err(|e| RuntimeError::RenderFailed(e.to_string()))?;
            to_json_text(&ctx, value)
        })?;
        from_json_text(output)
    }

    /// Renders to a host tree of `{ type, props, children }` nodes, letting
    /// effects and resolved queries settle first.
    pub fn render(&mut self, props: &serde_json::Value) -> RuntimeResult<serde_json::Value> {
        let props = serde_json::to_string(props)?;
        let mut output = None;

        for pass in 0..MAX_RENDER_PASSES {
            output = self.with_root(|ctx, root| {
                let render: Function = root.get("render")?;
                let props = ctx.json_parse(props.clone())?;
                let tree: Value = render
                    .call((props,))
                    .catch(&ctx)
                    .map_err(|e| RuntimeError::RenderFailed(e.to_string()))?;
                let flush: Function = root.get("flushEffects")?;
                flush
                    .call::<_, ()>(())
                    .catch(&ctx)
                    .map_err(|e| RuntimeError::RenderFailed(e.to_string()))?;
                to_json_text(&ctx, tree)
            })?;

            self.drain_jobs()?;

            let dirty = self.with_root(|_, root| {
                let is_dirty: Function = root.get("isDirty")?;
                Ok(is_dirty.call::<_, bool>(())?)
            })?;
            if !dirty {
                break;
            }
            tracing::debug!(pass, "state changed, rendering again");
            if pass + 1 == MAX_RENDER_PASSES {
                tracing::warn!("render did not settle after {MAX_RENDER_PASSES} passes");
            }
        }

        from_json_text(output)
    }

    /// Unmounts the rendered tree, running effect cleanups.
    pub fn unmount(&mut self) -> RuntimeResult<()> {
        if self.root.is_none() {
            return Ok(());
        }
        self.with_root(|ctx, root| {
            let unmount: Function = root.get("unmount")?;
            unmount
                .call::<_, ()>(())
                .catch(&ctx)
                .map_err(|e| RuntimeError::RenderFailed(e.to_string()))
        })?;
        self.root = None;
        self.drain_jobs()
    }

    fn with_root<F, R>(&mut self, f: F) -> RuntimeResult<R>
    where
        F: for<'js> FnOnce(Ctx<'js>, Object<'js>) -> RuntimeResult<R>,
    {
        let Self {
            component,
            root,
            context,
            ..
        } = self;
        context.with(|ctx| {
            let object = match root {
                Some(saved) => saved.clone().restore(&ctx)?,
                None => {
                    let create: Function = react(&ctx)?.get("createRoot")?;
                    let object: Object = create.call((component.clone().restore(&ctx)?,))?;
                    *root = Some(Persistent::save(&ctx, object.clone()));
                    object
                }
            };
            f(ctx, object)
        })
    }

    fn drain_jobs(&self) -> RuntimeResult<()> {
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => continue,
                Ok(false) => return Ok(()),
                Err(job) => {
                    let message = job.0.with(|ctx| {
                        let thrown = ctx.catch();
                        thrown
                            .as_exception()
                            .and_then(|e| e.message())
                            .unwrap_or_else(|| "pending job threw".to_string())
                    });
                    return Err(RuntimeError::RenderFailed(message));
                }
            }
        }
    }
}

fn to_json_text<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> RuntimeResult<Option<String>> {
    match ctx.json_stringify(value)? {
        Some(text) => Ok(Some(text.to_string()?)),
        None => Ok(None),
    }
}

fn from_json_text(text: Option<String>) -> RuntimeResult<serde_json::Value> {
    match text {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(serde_json::Value::Null),
    }
}
