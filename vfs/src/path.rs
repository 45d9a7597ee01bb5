//! POSIX-style path helpers for the virtual tree.
//!
//! Every path stored in a [`VirtualFs`](crate::VirtualFs) is absolute, starts
//! with `/` and is free of `.`/`..` segments. `..` past the root stays at the
//! root, the same way `path.resolve` behaves.

use relative_path::{Component, RelativePath};

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

/// Normalize `path` into an absolute path, resolving it against the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for component in RelativePath::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                segments.pop();
            }
            Component::Normal(name) => segments.push(name),
        }
    }
    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

/// Resolve `specifier` against the directory `base_dir`.
///
/// Absolute specifiers ignore the base.
pub fn resolve(base_dir: &str, specifier: &str) -> String {
    if specifier.starts_with(SEPARATOR) {
        normalize(specifier)
    } else {
        normalize(&join(base_dir, specifier))
    }
}

/// Join two path fragments with exactly one separator between them.
pub fn join(base: &str, child: &str) -> String {
    let base = base.trim_end_matches(SEPARATOR);
    let child = child.trim_start_matches(SEPARATOR);
    let mut out = String::with_capacity(base.len() + child.len() + 1);
    out.push_str(base);
    out.push(SEPARATOR);
    out.push_str(child);
    out
}

/// Parent directory of a normalized path. The root is its own parent.
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(0) | None => ROOT,
        Some(idx) => &path[..idx],
    }
}

/// Last segment of a normalized path; empty for the root.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Number of `/`-separated pieces, counting the leading empty one
/// (`/src` is 2, `/src/lib` is 3).
pub fn depth(path: &str) -> usize {
    path.split(SEPARATOR).count()
}

pub fn is_root(path: &str) -> bool {
    path == ROOT
}
