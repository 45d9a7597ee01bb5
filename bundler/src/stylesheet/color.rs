//! Named color palette on an 11-step shade scale, expressed in `oklch`.

/// Shade steps, lightest first.
pub const SHADES: [u16; 11] = [50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950];

const LIGHTNESS: [f32; 11] = [
    0.985, 0.967, 0.922, 0.870, 0.750, 0.637, 0.560, 0.490, 0.420, 0.370, 0.270,
];

/// Share of a hue's peak chroma used at each step.
const CHROMA: [f32; 11] = [
    0.06, 0.13, 0.27, 0.48, 0.80, 1.00, 0.96, 0.86, 0.72, 0.60, 0.42,
];

/// (name, hue, peak chroma)
const HUES: &[(&str, f32, f32)] = &[
    ("slate", 257.4, 0.046),
    ("gray", 264.7, 0.028),
    ("zinc", 285.9, 0.016),
    ("neutral", 0.0, 0.0),
    ("stone", 58.1, 0.013),
    ("red", 25.3, 0.237),
    ("orange", 41.1, 0.213),
    ("amber", 70.1, 0.179),
    ("yellow", 86.0, 0.184),
    ("lime", 130.9, 0.221),
    ("green", 149.6, 0.219),
    ("emerald", 162.5, 0.170),
    ("teal", 182.5, 0.140),
    ("cyan", 215.2, 0.143),
    ("sky", 237.3, 0.169),
    ("blue", 259.8, 0.214),
    ("indigo", 277.1, 0.233),
    ("violet", 293.0, 0.243),
    ("purple", 303.9, 0.265),
    ("fuchsia", 322.1, 0.293),
    ("pink", 354.3, 0.246),
    ("rose", 16.4, 0.246),
];

/// Resolve `white`, `black`, `transparent`, `current` or `<hue>-<shade>`,
/// with an optional `/<opacity>` suffix.
pub fn lookup(name: &str) -> Option<String> {
    let (name, alpha) = match name.split_once('/') {
        Some((name, alpha)) => (name, Some(alpha.parse::<u8>().ok().filter(|a| *a <= 100)?)),
        None => (name, None),
    };

    let (l, c, h) = match name {
        "white" => (1.0, 0.0, 0.0),
        "black" => (0.0, 0.0, 0.0),
        "transparent" => return alpha.is_none().then(|| "transparent".to_string()),
        "current" => return alpha.is_none().then(|| "currentColor".to_string()),
        _ => {
            let (hue, shade) = name.rsplit_once('-')?;
            let shade: u16 = shade.parse().ok()?;
            let step = SHADES.iter().position(|s| *s == shade)?;
            let (_, h, peak) = HUES.iter().find(|(n, _, _)| *n == hue)?;
            (LIGHTNESS[step], peak * CHROMA[step], *h)
        }
    };

    Some(match alpha {
        Some(a) => format!("oklch({l:.3} {c:.3} {h:.1} / {a}%)"),
        None => format!("oklch({l:.3} {c:.3} {h:.1})"),
    })
}
