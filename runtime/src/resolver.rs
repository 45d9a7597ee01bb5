//! Module resolvers backing the `require` handed to a bundle.
//!
//! A resolver either supplies a value for a specifier (`Ok(Some(_))`), passes
//! (`Ok(None)`) so the next one in the chain is asked, or fails. Failures are
//! not skipped: they abort the `require` call.

use rquickjs::{Ctx, Exception, Function, Object, Value};

use crate::context::RuntimeContext;

const REACT_SOURCE: &str = include_str!("js/react.js");
const UI_SOURCE: &str = include_str!("js/ui.js");
const UTILS_SOURCE: &str = include_str!("js/utils.js");

pub const UI_PREFIX: &str = "@/components/ui/";
pub const UTILS_SPECIFIER: &str = "@/lib/utils";

pub trait ModuleResolver: Send + Sync {
    /// Shown in logs
    fn name(&self) -> &str;

    fn resolve<'js>(
        &self,
        ctx: &Ctx<'js>,
        context: &RuntimeContext,
        specifier: &str,
    ) -> rquickjs::Result<Option<Value<'js>>>;
}

/// The React object of this context, installing it on first use.
pub fn react<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    ctx.eval(REACT_SOURCE)
}

/// `react`, `react/jsx-runtime` and `react/jsx-dev-runtime` all map to the
/// same object so hooks share one dispatcher.
#[derive(Debug, Default)]
pub struct ReactModuleResolver;

impl ModuleResolver for ReactModuleResolver {
    fn name(&self) -> &str {
        "react"
    }

    fn resolve<'js>(
        &self,
        ctx: &Ctx<'js>,
        _context: &RuntimeContext,
        specifier: &str,
    ) -> rquickjs::Result<Option<Value<'js>>> {
        match specifier {
            "react" | "react/jsx-runtime" | "react/jsx-dev-runtime" => {
                Ok(Some(react(ctx)?.into_value()))
            }
            _ => Ok(None),
        }
    }
}

/// Host UI primitives under `@/components/ui/<name>`.
#[derive(Debug, Default)]
pub struct UiPrimitivesResolver;

impl UiPrimitivesResolver {
    fn library<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
        let globals = ctx.globals();
        if let Some(library) = globals.get::<_, Option<Object>>("__qyp_ui__")? {
            return Ok(library);
        }
        let factory: Function = ctx.eval(UI_SOURCE)?;
        let library: Object = factory.call((react(ctx)?,))?;
        globals.set("__qyp_ui__", library.clone())?;
        Ok(library)
    }
}

impl ModuleResolver for UiPrimitivesResolver {
    fn name(&self) -> &str {
        "ui-primitives"
    }

    fn resolve<'js>(
        &self,
        ctx: &Ctx<'js>,
        _context: &RuntimeContext,
        specifier: &str,
    ) -> rquickjs::Result<Option<Value<'js>>> {
        let Some(name) = specifier.strip_prefix(UI_PREFIX) else {
            return Ok(None);
        };
        Self::library(ctx)?.get::<_, Option<Value>>(name)
    }
}

/// `@/lib/utils`: `runSql` against the bound data source, and `cn`.
#[derive(Debug, Default)]
pub struct UtilsModuleResolver;

impl ModuleResolver for UtilsModuleResolver {
    fn name(&self) -> &str {
        "utils"
    }

    fn resolve<'js>(
        &self,
        ctx: &Ctx<'js>,
        context: &RuntimeContext,
        specifier: &str,
    ) -> rquickjs::Result<Option<Value<'js>>> {
        if specifier != UTILS_SPECIFIER {
            return Ok(None);
        }

        let data_source = context.data_source().cloned();
        let select = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, query: String| -> rquickjs::Result<String> {
                let Some(data_source) = &data_source else {
                    return Err(Exception::throw_message(
                        &ctx,
                        "No data source is bound to this widget",
                    ));
                };
                tracing::debug!(%query, "runSql");
                let rows = data_source
                    .select(&query)
                    .map_err(|e| Exception::throw_message(&ctx, &e.to_string()))?;
                serde_json::to_string(&rows)
                    .map_err(|e| Exception::throw_message(&ctx, &e.to_string()))
            },
        )?
        .with_name("select")?;

        let factory: Function = ctx.eval(UTILS_SOURCE)?;
        let module: Object = factory.call((select,))?;
        Ok(Some(module.into_value()))
    }
}

/// A fixed module value for one specifier.
#[derive(Debug, Clone)]
pub struct JsonModuleResolver {
    specifier: String,
    value: serde_json::Value,
}

impl JsonModuleResolver {
    pub fn new(specifier: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            specifier: specifier.into(),
            value,
        }
    }
}

impl ModuleResolver for JsonModuleResolver {
    fn name(&self) -> &str {
        &self.specifier
    }

    fn resolve<'js>(
        &self,
        ctx: &Ctx<'js>,
        _context: &RuntimeContext,
        specifier: &str,
    ) -> rquickjs::Result<Option<Value<'js>>> {
        if specifier != self.specifier {
            return Ok(None);
        }
        let text = serde_json::to_string(&self.value)
            .map_err(|e| Exception::throw_message(ctx, &e.to_string()))?;
        ctx.json_parse(text).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};

    fn with_ctx<F>(f: F)
    where
        F: for<'js> FnOnce(Ctx<'js>),
    {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(f);
    }

    #[test]
    fn test_react_is_shared() {
        with_ctx(|ctx| {
            let context = RuntimeContext::new();
            let a = ReactModuleResolver
                .resolve(&ctx, &context, "react")
                .unwrap()
                .unwrap();
            let b = ReactModuleResolver
                .resolve(&ctx, &context, "react/jsx-runtime")
                .unwrap()
                .unwrap();
            ctx.globals().set("a", a).unwrap();
            ctx.globals().set("b", b).unwrap();
            assert!(ctx.eval::<bool, _>("a === b && typeof a.useState === 'function'").unwrap());
            assert!(ReactModuleResolver
                .resolve(&ctx, &context, "preact")
                .unwrap()
                .is_none());
        });
    }

    #[test]
    fn test_ui_primitives() {
        with_ctx(|ctx| {
            let context = RuntimeContext::new();
            let button = UiPrimitivesResolver
                .resolve(&ctx, &context, "@/components/ui/button")
                .unwrap()
                .unwrap();
            let button = button.into_object().unwrap();
            assert!(button.get::<_, Function>("Button").is_ok());
            assert!(UiPrimitivesResolver
                .resolve(&ctx, &context, "@/components/ui/carousel")
                .unwrap()
                .is_none());
        });
    }

    #[test]
    fn test_json_module() {
        with_ctx(|ctx| {
            let resolver = JsonModuleResolver::new("@/lib/utils", serde_json::json!({"answer": 42}));
            let context = RuntimeContext::new();
            let value = resolver
                .resolve(&ctx, &context, "@/lib/utils")
                .unwrap()
                .unwrap();
            let answer: i32 = value.into_object().unwrap().get("answer").unwrap();
            assert_eq!(answer, 42);
            assert!(resolver.resolve(&ctx, &context, "react").unwrap().is_none());
        });
    }

    #[test]
    fn test_cn() {
        with_ctx(|ctx| {
            let context = RuntimeContext::new();
            let utils = UtilsModuleResolver
                .resolve(&ctx, &context, UTILS_SPECIFIER)
                .unwrap()
                .unwrap();
            ctx.globals().set("utils", utils).unwrap();
            let joined: String = ctx
                .eval(r#"utils.cn("a", false && "b", ["c", { d: true, e: false }])"#)
                .unwrap();
            assert_eq!(joined, "a c d");
        });
    }
}
