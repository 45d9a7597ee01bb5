//! Stylesheet derivation
//!
//! Independent of the JS graph: every non-externalized file of the tree is
//! split into words, the words form an ordered candidate set, and each
//! candidate that names a known utility (optionally behind variants such as
//! `hover:` or `md:`) becomes one CSS rule. Anything else is just a word in
//! source text and is skipped.

mod color;
mod utilities;

use std::collections::BTreeSet;

use qyp_vfs::VirtualFs;

pub use color::SHADES;

/// Split raw text into utility-class candidates.
pub fn extract_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '/' | '.' | '%' | '-' | '[' | ']'))
    })
    .map(|word| word.trim_end_matches([':', '.']))
    .filter(|word| !word.is_empty() && !word.starts_with(['/', '.', ':']))
}

/// Candidate set drawn from every file that is bundled (externalized files
/// ship their own styles).
pub fn build_candidates(vfs: &VirtualFs) -> BTreeSet<String> {
    vfs.files()
        .filter(|(_, file)| !file.metadata.externalized)
        .flat_map(|(_, file)| extract_candidates(&file.content))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Variant {
    Hover,
    Focus,
    Sm,
    Md,
    Lg,
    Xl,
    Dark,
}

impl Variant {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "hover" => Variant::Hover,
            "focus" => Variant::Focus,
            "sm" => Variant::Sm,
            "md" => Variant::Md,
            "lg" => Variant::Lg,
            "xl" => Variant::Xl,
            "dark" => Variant::Dark,
            _ => return None,
        })
    }

    fn pseudo_class(self) -> Option<&'static str> {
        match self {
            Variant::Hover => Some(":hover"),
            Variant::Focus => Some(":focus"),
            _ => None,
        }
    }

    fn media_query(self) -> Option<&'static str> {
        match self {
            Variant::Sm => Some("(min-width: 40rem)"),
            Variant::Md => Some("(min-width: 48rem)"),
            Variant::Lg => Some("(min-width: 64rem)"),
            Variant::Xl => Some("(min-width: 80rem)"),
            Variant::Dark => Some("(prefers-color-scheme: dark)"),
            _ => None,
        }
    }
}

/// One generated rule; ordered so that plain utilities come first and more
/// specific variants later in the sheet.
#[derive(Debug)]
struct Rule {
    variants: Vec<Variant>,
    selector: String,
    declarations: utilities::Declarations,
}

impl Rule {
    fn parse(candidate: &str) -> Option<Self> {
        let mut parts: Vec<&str> = candidate.split(':').collect();
        let utility = parts.pop()?;
        let mut variants = parts
            .into_iter()
            .map(Variant::parse)
            .collect::<Option<Vec<_>>>()?;
        let declarations = utilities::declarations(utility)?;
        variants.sort();
        variants.dedup();
        Some(Self {
            variants,
            selector: escape_class(candidate),
            declarations,
        })
    }

    fn write_to(&self, out: &mut String) {
        let mut selector = format!(".{}", self.selector);
        for pseudo in self.variants.iter().filter_map(|v| v.pseudo_class()) {
            selector.push_str(pseudo);
        }
        let queries: Vec<&str> = self.variants.iter().filter_map(|v| v.media_query()).collect();

        let mut indent = String::new();
        for query in &queries {
            out.push_str(&format!("{indent}@media {query} {{\n"));
            indent.push_str("  ");
        }
        out.push_str(&format!("{indent}{selector} {{\n"));
        for (property, value) in &self.declarations {
            out.push_str(&format!("{indent}  {property}: {value};\n"));
        }
        out.push_str(&format!("{indent}}}\n"));
        for _ in &queries {
            indent.truncate(indent.len().saturating_sub(2));
            out.push_str(&format!("{indent}}}\n"));
        }
    }
}

/// Backslash-escape characters that are not valid bare in a class selector.
fn escape_class(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        let plain = c.is_ascii_alphanumeric() || c == '_' || (c == '-' && i > 0);
        if !plain {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

const PREFLIGHT: &str = "\
*, ::before, ::after {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
  border: 0 solid;
}
html, :host {
  line-height: 1.5;
  -webkit-text-size-adjust: 100%;
  font-family: ui-sans-serif, system-ui, sans-serif;
}
button, input, select, textarea {
  font: inherit;
  color: inherit;
  background-color: transparent;
}
table {
  border-collapse: collapse;
}
img, svg, video {
  display: block;
  max-width: 100%;
}
";

/// Turns a candidate set into a stylesheet.
#[derive(Debug, Clone)]
pub struct StylesheetCompiler {
    preflight: bool,
    /// Always emitted, whether or not any file mentions them
    safelist: Vec<String>,
}

impl Default for StylesheetCompiler {
    fn default() -> Self {
        Self {
            preflight: true,
            safelist: Vec::new(),
        }
    }
}

impl StylesheetCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_preflight() -> Self {
        Self {
            preflight: false,
            ..Self::default()
        }
    }

    pub fn with_safelist<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safelist.extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn compile<'a>(&'a self, candidates: impl IntoIterator<Item = &'a str>) -> String {
        let candidates: BTreeSet<&str> = candidates
            .into_iter()
            .chain(self.safelist.iter().map(String::as_str))
            .collect();
        let mut rules: Vec<Rule> = candidates.into_iter().filter_map(Rule::parse).collect();
        // stable: candidate order is kept inside one variant group
        rules.sort_by(|a, b| a.variants.cmp(&b.variants));

        let mut css = String::new();
        if self.preflight {
            css.push_str(PREFLIGHT);
        }
        for rule in &rules {
            rule.write_to(&mut css);
        }
        tracing::debug!(rules = rules.len(), "stylesheet generated");
        css
    }

    /// Candidates from `vfs` straight to CSS.
    pub fn compile_vfs(&self, vfs: &VirtualFs) -> String {
        let candidates = build_candidates(vfs);
        self.compile(candidates.iter().map(String::as_str))
    }
}
