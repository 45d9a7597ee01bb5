//! `console` for widget code, routed into `tracing`.

use rquickjs::{
    prelude::{Func, Rest},
    Ctx, Object, Result, Value,
};

fn format_args<'js>(ctx: &Ctx<'js>, args: Rest<Value<'js>>) -> Result<String> {
    let mut out = String::new();
    for (i, arg) in args.0.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if let Some(text) = arg.as_string() {
            out.push_str(&text.to_string()?);
        } else if let Some(exception) = arg.as_exception() {
            out.push_str(&exception.message().unwrap_or_default());
        } else {
            match ctx.json_stringify(arg.clone())? {
                Some(json) => out.push_str(&json.to_string()?),
                None => out.push_str(arg.type_name()),
            }
        }
    }
    Ok(out)
}

fn log<'js>(ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
    let message = format_args(&ctx, args)?;
    tracing::info!(target: "widget", "{}", message);
    Ok(())
}

fn log_debug<'js>(ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
    let message = format_args(&ctx, args)?;
    tracing::debug!(target: "widget", "{}", message);
    Ok(())
}

fn log_warn<'js>(ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
    let message = format_args(&ctx, args)?;
    tracing::warn!(target: "widget", "{}", message);
    Ok(())
}

fn log_error<'js>(ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
    let message = format_args(&ctx, args)?;
    tracing::error!(target: "widget", "{}", message);
    Ok(())
}

pub fn init(ctx: &Ctx<'_>) -> Result<()> {
    let console = Object::new(ctx.clone())?;

    console.set("debug", Func::from(log_debug))?;
    console.set("error", Func::from(log_error))?;
    console.set("info", Func::from(log))?;
    console.set("log", Func::from(log))?;
    console.set("trace", Func::from(log_debug))?;
    console.set("warn", Func::from(log_warn))?;

    ctx.globals().set("console", console)?;
    Ok(())
}
