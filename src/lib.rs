//! Outer boundary of the widget pipeline: the compile request handler shared
//! by the CLI and the sidecar protocol.
//!
//! Everything underneath fails loudly. [`handle_compile`] is the one place
//! that turns a failure into output, so a caller always has something to show.

pub mod ipc;

use std::sync::Arc;

use qyp_bundler::{BundleConfig, CompileError, ComponentCompiler};
use qyp_vfs::{path, sort_for_replay, SerializedVirtualNode, VirtualFs, VirtualNode};
use serde::{Deserialize, Serialize};

pub const PING_DEFAULT_MESSAGE: &str = "qYp-mini";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub minify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    #[serde(rename = "serializedVFS", alias = "serializedVfs")]
    pub serialized_vfs: Vec<SerializedVirtualNode>,
    pub entry_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CompileOptions>,
}

impl CompileRequest {
    pub fn new(serialized_vfs: Vec<SerializedVirtualNode>, entry_point: impl Into<String>) -> Self {
        Self {
            serialized_vfs,
            entry_point: entry_point.into(),
            options: None,
        }
    }

    pub fn bundle_config(&self) -> BundleConfig {
        let mut config = BundleConfig::with_entry(self.entry_point.clone());
        config.minify = self.options.as_ref().is_some_and(|o| o.minify);
        config
    }

    /// Raw text of the entry point as sent, if the request carries it.
    pub fn entry_source(&self) -> Option<&str> {
        let entry = path::normalize(&self.entry_point);
        self.serialized_vfs.iter().find_map(|node| match &node.node {
            VirtualNode::File(file) if path::normalize(&node.path) == entry => {
                Some(file.content.as_str())
            }
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    pub js_bundle: String,
    pub css_bundle: String,
}

/// Compile strictly: any failure is returned to the caller.
pub async fn try_compile(request: &CompileRequest) -> Result<CompileResponse, CompileError> {
    let mut nodes = request.serialized_vfs.clone();
    sort_for_replay(&mut nodes);
    let vfs = VirtualFs::from_snapshot(nodes)?;

    let compiler = ComponentCompiler::new(request.bundle_config());
    let result = compiler.compile_vfs(Arc::new(vfs)).await?;
    Ok(CompileResponse {
        js_bundle: result.js_bundle,
        css_bundle: result.css_bundle,
    })
}

/// Compile, degrading any failure to the entry-point source under an error
/// banner.
pub async fn handle_compile(request: &CompileRequest) -> CompileResponse {
    match try_compile(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(entry = %request.entry_point, "compile failed: {}", e);
            degraded_response(&e.to_string(), request.entry_source().unwrap_or_default())
        }
    }
}

fn error_banner(message: &str) -> String {
    format!(
        "/* Compilation failed: {} */",
        message.replace("*/", "* /")
    )
}

fn degraded_response(message: &str, source: &str) -> CompileResponse {
    let banner = error_banner(message);
    CompileResponse {
        js_bundle: format!("{banner}\n{source}"),
        css_bundle: banner,
    }
}

pub fn ping(message: Option<&str>) -> String {
    format!("pong, {}", message.unwrap_or(PING_DEFAULT_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qyp_bundler::template::{DEFAULT_QUERY_SOURCE, DEFAULT_WIDGET_SOURCE};
    use qyp_bundler::{build_default_fs, DEFAULT_ENTRY_POINT};
    use qyp_vfs::NodeMetadata;

    fn default_request() -> CompileRequest {
        let vfs = build_default_fs(DEFAULT_WIDGET_SOURCE, DEFAULT_QUERY_SOURCE).unwrap();
        CompileRequest::new(vfs.serialize(), DEFAULT_ENTRY_POINT)
    }

    #[test]
    fn test_request_wire_shape() {
        let request: CompileRequest = serde_json::from_str(
            r#"{
                "serializedVFS": [
                    {"path": "/src", "type": "directory", "name": "src", "metadata": {}}
                ],
                "entryPoint": "/src/index.tsx",
                "options": {"minify": true}
            }"#,
        )
        .unwrap();
        assert_eq!(request.serialized_vfs.len(), 1);
        assert!(request.bundle_config().minify);
        assert_eq!(request.bundle_config().entry, "/src/index.tsx");

        let response = CompileResponse {
            js_bundle: "js".into(),
            css_bundle: "css".into(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"jsBundle": "js", "cssBundle": "css"})
        );
    }

    #[test]
    fn test_ping() {
        assert_eq!(ping(None), "pong, qYp-mini");
        assert_eq!(ping(Some("test")), "pong, test");
    }

    #[test]
    fn test_banner_cannot_close_early() {
        let banner = error_banner("bad */ input");
        assert_eq!(banner.matches("*/").count(), 1);
        assert!(banner.ends_with("*/"));
    }

    #[tokio::test]
    async fn test_compile_default_workspace() {
        let response = handle_compile(&default_request()).await;
        assert!(!response.js_bundle.starts_with("/*"));
        assert!(response.js_bundle.contains("SELECT COUNT(*)"));
        assert!(response.css_bundle.contains(".p-4"));
    }

    #[tokio::test]
    async fn test_unordered_snapshot_is_replayed() {
        let mut request = default_request();
        request.serialized_vfs.reverse();
        assert!(try_compile(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_source() {
        let source = "import Missing from '@/widget/missing';\nexport default Missing;\n";
        let mut vfs = VirtualFs::new();
        vfs.make_directory("/src", None).unwrap();
        vfs.make_directory("/src/widget", None).unwrap();
        vfs.write_file("/src/widget/index.tsx", source, None).unwrap();
        let request = CompileRequest::new(vfs.serialize(), "/src/widget/index.tsx");

        assert!(try_compile(&request).await.is_err());
        let response = handle_compile(&request).await;
        assert!(response.js_bundle.starts_with("/* Compilation failed:"));
        assert!(response.js_bundle.contains("@/widget/missing"));
        assert!(response.js_bundle.ends_with(source));
        assert!(response.css_bundle.starts_with("/*"));
    }

    #[tokio::test]
    async fn test_missing_entry_degrades_to_banner() {
        let vfs = VirtualFs::new();
        let mut request = CompileRequest::new(vfs.serialize(), "/src/widget/index.tsx");
        request.serialized_vfs.push(SerializedVirtualNode::file(
            "/orphan.ts",
            "x",
            NodeMetadata::default(),
        ));
        let response = handle_compile(&request).await;
        assert!(response.js_bundle.starts_with("/* Compilation failed:"));
        assert!(response.js_bundle.ends_with("*/\n"));
    }
}
