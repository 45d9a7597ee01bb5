//! Utility class name to declaration table.

use super::color;

pub type Declarations = Vec<(&'static str, String)>;

fn one(property: &'static str, value: impl Into<String>) -> Option<Declarations> {
    Some(vec![(property, value.into())])
}

fn many(properties: &[&'static str], value: &str) -> Option<Declarations> {
    Some(properties.iter().map(|p| (*p, value.to_string())).collect())
}

/// `[...]` literal with `_` standing for a space.
fn arbitrary(value: &str) -> Option<String> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    (!inner.is_empty()).then(|| inner.replace('_', " "))
}

/// Spacing scale: one step is a quarter rem.
fn spacing(value: &str) -> Option<String> {
    match value {
        "0" => Some("0px".to_string()),
        "px" => Some("1px".to_string()),
        _ => {
            if let Some(v) = arbitrary(value) {
                return Some(v);
            }
            let steps: f32 = value.parse().ok()?;
            if !(steps > 0.0 && steps <= 96.0) || (steps * 2.0).fract() != 0.0 {
                return None;
            }
            Some(format!("{}rem", steps * 0.25))
        }
    }
}

fn fraction(value: &str) -> Option<String> {
    let (num, den) = value.split_once('/')?;
    let num: f32 = num.parse().ok()?;
    let den: f32 = den.parse().ok()?;
    if den == 0.0 || num > den {
        return None;
    }
    let percent = num / den * 100.0;
    Some(format!("{}%", (percent * 1_000_000.0).round() / 1_000_000.0))
}

fn size(value: &str, axis_screen: &str) -> Option<String> {
    match value {
        "full" => Some("100%".to_string()),
        "auto" => Some("auto".to_string()),
        "screen" => Some(axis_screen.to_string()),
        "min" => Some("min-content".to_string()),
        "max" => Some("max-content".to_string()),
        "fit" => Some("fit-content".to_string()),
        _ => fraction(value).or_else(|| spacing(value)),
    }
}

fn max_width(value: &str) -> Option<String> {
    let rem = match value {
        "xs" => "20rem",
        "sm" => "24rem",
        "md" => "28rem",
        "lg" => "32rem",
        "xl" => "36rem",
        "2xl" => "42rem",
        "3xl" => "48rem",
        "4xl" => "56rem",
        "5xl" => "64rem",
        "6xl" => "72rem",
        "7xl" => "80rem",
        "full" => "100%",
        "none" => "none",
        _ => return arbitrary(value),
    };
    Some(rem.to_string())
}

fn font_size(value: &str) -> Option<Declarations> {
    let (size, line) = match value {
        "xs" => ("0.75rem", "1rem"),
        "sm" => ("0.875rem", "1.25rem"),
        "base" => ("1rem", "1.5rem"),
        "lg" => ("1.125rem", "1.75rem"),
        "xl" => ("1.25rem", "1.75rem"),
        "2xl" => ("1.5rem", "2rem"),
        "3xl" => ("1.875rem", "2.25rem"),
        "4xl" => ("2.25rem", "2.5rem"),
        "5xl" => ("3rem", "1"),
        _ => return None,
    };
    Some(vec![
        ("font-size", size.to_string()),
        ("line-height", line.to_string()),
    ])
}

fn radius(value: &str) -> Option<&'static str> {
    Some(match value {
        "" => "0.25rem",
        "none" => "0px",
        "sm" => "0.125rem",
        "md" => "0.375rem",
        "lg" => "0.5rem",
        "xl" => "0.75rem",
        "2xl" => "1rem",
        "3xl" => "1.5rem",
        "full" => "calc(infinity * 1px)",
        _ => return None,
    })
}

fn shadow(value: &str) -> Option<&'static str> {
    Some(match value {
        "" => "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
        "sm" => "0 1px 2px 0 rgb(0 0 0 / 0.05)",
        "md" => "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)",
        "lg" => "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)",
        "xl" => "0 20px 25px -5px rgb(0 0 0 / 0.1), 0 8px 10px -6px rgb(0 0 0 / 0.1)",
        "none" => "0 0 #0000",
        _ => return None,
    })
}

fn border_width(value: &str) -> Option<String> {
    match value {
        "" => Some("1px".to_string()),
        "0" | "2" | "4" | "8" => Some(format!("{value}px")),
        _ => arbitrary(value),
    }
}

fn sides(property: &str, side: &str) -> Option<&'static [&'static str]> {
    let properties: &'static [&'static str] = match (property, side) {
        ("padding", "") => &["padding"],
        ("padding", "x") => &["padding-left", "padding-right"],
        ("padding", "y") => &["padding-top", "padding-bottom"],
        ("padding", "t") => &["padding-top"],
        ("padding", "r") => &["padding-right"],
        ("padding", "b") => &["padding-bottom"],
        ("padding", "l") => &["padding-left"],
        ("margin", "") => &["margin"],
        ("margin", "x") => &["margin-left", "margin-right"],
        ("margin", "y") => &["margin-top", "margin-bottom"],
        ("margin", "t") => &["margin-top"],
        ("margin", "r") => &["margin-right"],
        ("margin", "b") => &["margin-bottom"],
        ("margin", "l") => &["margin-left"],
        ("border", "") => &["border-width"],
        ("border", "x") => &["border-left-width", "border-right-width"],
        ("border", "y") => &["border-top-width", "border-bottom-width"],
        ("border", "t") => &["border-top-width"],
        ("border", "r") => &["border-right-width"],
        ("border", "b") => &["border-bottom-width"],
        ("border", "l") => &["border-left-width"],
        _ => return None,
    };
    Some(properties)
}

/// Declarations for one utility (variants already stripped), or `None` for
/// words that are not utilities.
pub fn declarations(utility: &str) -> Option<Declarations> {
    if let Some(decls) = keyword(utility) {
        return Some(decls);
    }

    let (head, value) = utility.split_once('-').unwrap_or((utility, ""));
    match head {
        "p" | "px" | "py" | "pt" | "pr" | "pb" | "pl" => {
            many(sides("padding", &head[1..])?, &spacing(value)?)
        }
        "m" | "mx" | "my" | "mt" | "mr" | "mb" | "ml" => {
            let value = if value == "auto" {
                "auto".to_string()
            } else {
                spacing(value)?
            };
            many(sides("margin", &head[1..])?, &value)
        }
        "gap" => match value.split_once('-') {
            Some(("x", v)) => one("column-gap", spacing(v)?),
            Some(("y", v)) => one("row-gap", spacing(v)?),
            _ => one("gap", spacing(value)?),
        },
        "w" => one("width", size(value, "100vw")?),
        "h" => one("height", size(value, "100vh")?),
        "size" => many(&["width", "height"], &size(value, "100vw")?),
        "min" => match value.split_once('-') {
            Some(("w", v)) => one("min-width", size(v, "100vw")?),
            Some(("h", v)) => one("min-height", size(v, "100vh")?),
            _ => None,
        },
        "max" => match value.split_once('-') {
            Some(("w", v)) => one("max-width", max_width(v)?),
            Some(("h", v)) => one("max-height", size(v, "100vh")?),
            _ => None,
        },
        "inset" | "top" | "right" | "bottom" | "left" => {
            let value = if value == "auto" {
                "auto".to_string()
            } else {
                fraction(value).or_else(|| spacing(value))?
            };
            match head {
                "inset" => many(&["top", "right", "bottom", "left"], &value),
                "top" => one("top", value),
                "right" => one("right", value),
                "bottom" => one("bottom", value),
                _ => one("left", value),
            }
        }
        "text" => match value {
            "left" | "center" | "right" | "justify" => one("text-align", value),
            _ => font_size(value).or_else(|| one("color", color::lookup(value)?)),
        },
        "bg" => one("background-color", color::lookup(value)?),
        "border" => {
            if let Some(c) = color::lookup(value) {
                return one("border-color", c);
            }
            let (side, width) = match value.split_once('-') {
                Some((side @ ("x" | "y" | "t" | "r" | "b" | "l"), width)) => (side, width),
                _ if matches!(value, "x" | "y" | "t" | "r" | "b" | "l") => (value, ""),
                _ => ("", value),
            };
            let mut decls = many(sides("border", side)?, &border_width(width)?)?;
            decls.push(("border-style", "solid".to_string()));
            Some(decls)
        }
        "rounded" => one("border-radius", radius(value)?),
        "shadow" => one("box-shadow", shadow(value)?),
        "opacity" => {
            let percent: u8 = value.parse().ok().filter(|p| *p <= 100)?;
            one("opacity", format!("{}", f32::from(percent) / 100.0))
        }
        "z" => {
            let z: u16 = value.parse().ok()?;
            one("z-index", z.to_string())
        }
        "font" => one(
            "font-weight",
            match value {
                "thin" => "100",
                "light" => "300",
                "normal" => "400",
                "medium" => "500",
                "semibold" => "600",
                "bold" => "700",
                "extrabold" => "800",
                _ => return None,
            },
        ),
        "leading" => one(
            "line-height",
            match value {
                "none" => "1",
                "tight" => "1.25",
                "snug" => "1.375",
                "normal" => "1.5",
                "relaxed" => "1.625",
                "loose" => "2",
                _ => return None,
            },
        ),
        "tracking" => one(
            "letter-spacing",
            match value {
                "tighter" => "-0.05em",
                "tight" => "-0.025em",
                "normal" => "0em",
                "wide" => "0.025em",
                "wider" => "0.05em",
                _ => return None,
            },
        ),
        "items" => one(
            "align-items",
            match value {
                "start" => "flex-start",
                "end" => "flex-end",
                "center" | "baseline" | "stretch" => value,
                _ => return None,
            },
        ),
        "justify" => one(
            "justify-content",
            match value {
                "start" => "flex-start",
                "end" => "flex-end",
                "center" => "center",
                "between" => "space-between",
                "around" => "space-around",
                "evenly" => "space-evenly",
                _ => return None,
            },
        ),
        "grid" => {
            let n: u8 = value.strip_prefix("cols-")?.parse().ok().filter(|n| (1..=12).contains(n))?;
            one("grid-template-columns", format!("repeat({n}, minmax(0, 1fr))"))
        }
        "col" => {
            let n: u8 = value.strip_prefix("span-")?.parse().ok().filter(|n| (1..=12).contains(n))?;
            one("grid-column", format!("span {n} / span {n}"))
        }
        "overflow" => match value.split_once('-') {
            Some(("x", v)) => one("overflow-x", overflow(v)?),
            Some(("y", v)) => one("overflow-y", overflow(v)?),
            _ => one("overflow", overflow(value)?),
        },
        "cursor" => one(
            "cursor",
            match value {
                "pointer" | "default" | "wait" | "text" | "move" | "not-allowed" => value,
                _ => return None,
            },
        ),
        _ => None,
    }
}

fn overflow(value: &str) -> Option<&'static str> {
    Some(match value {
        "auto" => "auto",
        "hidden" => "hidden",
        "visible" => "visible",
        "scroll" => "scroll",
        _ => return None,
    })
}

fn keyword(utility: &str) -> Option<Declarations> {
    match utility {
        "block" | "inline-block" | "inline" | "flex" | "inline-flex" | "grid" | "table"
        | "contents" => one("display", utility),
        "hidden" => one("display", "none"),
        "flex-row" => one("flex-direction", "row"),
        "flex-col" => one("flex-direction", "column"),
        "flex-wrap" => one("flex-wrap", "wrap"),
        "flex-1" => one("flex", "1 1 0%"),
        "flex-auto" => one("flex", "1 1 auto"),
        "flex-none" => one("flex", "none"),
        "grow" => one("flex-grow", "1"),
        "shrink-0" => one("flex-shrink", "0"),
        "static" | "relative" | "absolute" | "fixed" | "sticky" => one("position", utility),
        "uppercase" | "lowercase" | "capitalize" => one("text-transform", utility),
        "italic" => one("font-style", "italic"),
        "underline" => one("text-decoration-line", "underline"),
        "line-through" => one("text-decoration-line", "line-through"),
        "whitespace-nowrap" => one("white-space", "nowrap"),
        "truncate" => Some(vec![
            ("overflow", "hidden".to_string()),
            ("text-overflow", "ellipsis".to_string()),
            ("white-space", "nowrap".to_string()),
        ]),
        "pointer-events-none" => one("pointer-events", "none"),
        "select-none" => one("user-select", "none"),
        "border-collapse" => one("border-collapse", "collapse"),
        "transition" => Some(vec![
            (
                "transition-property",
                "color, background-color, border-color, opacity, box-shadow, transform".to_string(),
            ),
            ("transition-duration", "150ms".to_string()),
        ]),
        _ => None,
    }
}
