//! Import specifier resolution against a [`VirtualFs`].
//!
//! A specifier is either a package reference (never looked up in the tree), or
//! a path that must land on a file. Paths are probed exact first, then with
//! each known extension, then as a directory index. The file found decides,
//! through its `externalized` flag, whether it is bundled or left for the host.

use crate::error::ResolveError;
use crate::fs::VirtualFs;
use crate::path;

pub const DEFAULT_ALIAS_PREFIX: &str = "@/";
pub const DEFAULT_SOURCE_ROOT: &str = "/src/";
pub const RESOLVE_EXTENSIONS: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

/// Parser selected for a bundled file, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Tsx,
    Ts,
    Jsx,
    Js,
    Css,
    Json,
}

impl Loader {
    /// Unknown extensions fall back to plain JS.
    pub fn from_path(path: &str) -> Self {
        let name = path::file_name(path);
        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("tsx") => Loader::Tsx,
            Some("ts") => Loader::Ts,
            Some("jsx") => Loader::Jsx,
            Some("css") => Loader::Css,
            Some("json") => Loader::Json,
            _ => Loader::Js,
        }
    }
}

/// Outcome of resolving one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not part of the tree at all (`react`, `@scope/pkg`)
    Package { specifier: String },
    /// Found in the tree but supplied by the host; the import keeps the
    /// specifier as written
    Externalized { specifier: String, path: String },
    /// Found in the tree and bundled from its content
    Bundled { path: String, loader: Loader },
}

impl Resolution {
    pub fn is_external(&self) -> bool {
        !matches!(self, Resolution::Bundled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub alias_prefix: String,
    pub source_root: String,
    pub extensions: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
            extensions: RESOLVE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// `None` for package references; otherwise the absolute path to probe.
    pub fn candidate_path(&self, specifier: &str, importer: Option<&str>) -> Option<String> {
        if let Some(rest) = specifier.strip_prefix(self.options.alias_prefix.as_str()) {
            return Some(path::normalize(&path::join(&self.options.source_root, rest)));
        }
        if !(specifier.starts_with('.') || specifier.starts_with(path::SEPARATOR)) {
            return None;
        }
        let base = importer.map(path::parent).unwrap_or(path::ROOT);
        Some(path::resolve(base, specifier))
    }

    /// First existing file among the probe candidates for `candidate`.
    pub fn probe(&self, vfs: &VirtualFs, candidate: &str) -> Option<String> {
        if vfs.file_exists(candidate) {
            return Some(candidate.to_string());
        }
        let extensions = &self.options.extensions;
        extensions
            .iter()
            .map(|ext| format!("{candidate}{ext}"))
            .chain(
                extensions
                    .iter()
                    .map(|ext| path::join(candidate, &format!("index{ext}"))),
            )
            .find(|probe| vfs.file_exists(probe))
    }

    pub fn resolve(
        &self,
        vfs: &VirtualFs,
        specifier: &str,
        importer: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let Some(candidate) = self.candidate_path(specifier, importer) else {
            tracing::debug!(specifier, "package import");
            return Ok(Resolution::Package {
                specifier: specifier.to_string(),
            });
        };

        let Some(path) = self.probe(vfs, &candidate) else {
            return Err(ResolveError::UnresolvedImport {
                specifier: specifier.to_string(),
                importer: importer.map(str::to_string),
                candidate,
            });
        };

        let externalized = vfs
            .read_file_metadata(&path)
            .map(|m| m.externalized)
            .unwrap_or(false);
        if externalized {
            tracing::debug!(specifier, %path, "externalized import");
            Ok(Resolution::Externalized {
                specifier: specifier.to_string(),
                path,
            })
        } else {
            tracing::debug!(specifier, %path, "bundled import");
            let loader = Loader::from_path(&path);
            Ok(Resolution::Bundled { path, loader })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeMetadata;

    fn tree() -> VirtualFs {
        let mut fs = VirtualFs::new();
        for dir in ["/src", "/src/widget", "/src/lib", "/src/components", "/src/components/ui"] {
            fs.make_directory(dir, None).unwrap();
        }
        fs.write_file("/src/widget/index.tsx", "tsx", None).unwrap();
        fs.write_file("/src/widget/index.ts", "ts", None).unwrap();
        fs.write_file("/src/widget/foo.ts", "", None).unwrap();
        fs.write_file("/src/lib/utils.ts", "// host", Some(NodeMetadata::externalized()))
            .unwrap();
        fs.write_file("/src/components/ui/index.js", "", None).unwrap();
        fs
    }

    #[test]
    fn test_loader_from_extension() {
        assert_eq!(Loader::from_path("/a/b.tsx"), Loader::Tsx);
        assert_eq!(Loader::from_path("/a/b.ts"), Loader::Ts);
        assert_eq!(Loader::from_path("/a/b.jsx"), Loader::Jsx);
        assert_eq!(Loader::from_path("/a/b.css"), Loader::Css);
        assert_eq!(Loader::from_path("/a/b.json"), Loader::Json);
        assert_eq!(Loader::from_path("/a/b.sql"), Loader::Js);
        assert_eq!(Loader::from_path("/a.d/b"), Loader::Js);
    }

    #[test]
    fn test_packages_are_never_probed() {
        let resolver = Resolver::default();
        let fs = tree();
        for specifier in ["react", "react/jsx-runtime", "@scope/pkg"] {
            assert_eq!(
                resolver.resolve(&fs, specifier, Some("/src/widget/index.tsx")).unwrap(),
                Resolution::Package {
                    specifier: specifier.to_string()
                }
            );
        }
    }

    #[test]
    fn test_extension_order_prefers_tsx() {
        let resolver = Resolver::default();
        let fs = tree();
        let resolved = resolver
            .resolve(&fs, "./index", Some("/src/widget/foo.ts"))
            .unwrap();
        assert_eq!(
            resolved,
            Resolution::Bundled {
                path: "/src/widget/index.tsx".into(),
                loader: Loader::Tsx
            }
        );
    }

    #[test]
    fn test_exact_then_index() {
        let resolver = Resolver::default();
        let fs = tree();
        assert_eq!(
            resolver.probe(&fs, "/src/widget/foo.ts").as_deref(),
            Some("/src/widget/foo.ts")
        );
        assert_eq!(
            resolver.probe(&fs, "/src/components/ui").as_deref(),
            Some("/src/components/ui/index.js")
        );
        assert_eq!(resolver.probe(&fs, "/src/nothing"), None);
    }

    #[test]
    fn test_alias_matches_absolute() {
        let resolver = Resolver::default();
        let fs = tree();
        let via_alias = resolver.resolve(&fs, "@/widget/foo", Some("/src/widget/index.tsx")).unwrap();
        let via_root = resolver.resolve(&fs, "/src/widget/foo", Some("/src/lib/other.ts")).unwrap();
        let deep = resolver.resolve(&fs, "@/widget/foo", Some("/a/b/c/d.ts")).unwrap();
        assert_eq!(via_alias, via_root);
        assert_eq!(via_alias, deep);
    }

    #[test]
    fn test_externalized_keeps_specifier() {
        let resolver = Resolver::default();
        let fs = tree();
        let resolved = resolver
            .resolve(&fs, "@/lib/utils", Some("/src/widget/index.tsx"))
            .unwrap();
        assert_eq!(
            resolved,
            Resolution::Externalized {
                specifier: "@/lib/utils".into(),
                path: "/src/lib/utils.ts".into()
            }
        );
        assert!(resolved.is_external());
    }

    #[test]
    fn test_unresolved_import() {
        let resolver = Resolver::default();
        let fs = tree();
        let err = resolver
            .resolve(&fs, "@/widget/missing", Some("/src/widget/index.tsx"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnresolvedImport {
                specifier: "@/widget/missing".into(),
                importer: Some("/src/widget/index.tsx".into()),
                candidate: "/src/widget/missing".into(),
            }
        );
    }

    #[test]
    fn test_entry_without_importer() {
        let resolver = Resolver::default();
        let fs = tree();
        assert!(matches!(
            resolver.resolve(&fs, "./src/widget/foo", None).unwrap(),
            Resolution::Bundled { ref path, .. } if path == "/src/widget/foo.ts"
        ));
    }

    #[test]
    fn test_custom_alias() {
        let resolver = Resolver::new(ResolverOptions {
            alias_prefix: "~/".into(),
            source_root: "/src/lib".into(),
            ..ResolverOptions::default()
        });
        let fs = tree();
        assert!(matches!(
            resolver.resolve(&fs, "~/utils", None).unwrap(),
            Resolution::Externalized { .. }
        ));
        assert!(matches!(
            resolver.resolve(&fs, "@/lib/utils", None).unwrap(),
            Resolution::Package { .. }
        ));
    }
}
