//! Rolldown plugin that serves modules out of a [`VirtualFs`].

use std::borrow::Cow;
use std::sync::Arc;

use arcstr::ArcStr;
use parking_lot::Mutex;
use qyp_vfs::{Loader, Resolution, Resolver, ResolverOptions, VirtualFs};
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::BundleError;

#[derive(Debug)]
pub struct VfsPlugin {
    vfs: Arc<VirtualFs>,
    resolver: Resolver,
    /// First hook failure, kept typed so the caller can surface it as-is
    failure: Mutex<Option<BundleError>>,
}

impl VfsPlugin {
    pub fn new(vfs: Arc<VirtualFs>, options: ResolverOptions) -> Self {
        Self {
            vfs,
            resolver: Resolver::new(options),
            failure: Mutex::new(None),
        }
    }

    pub fn take_failure(&self) -> Option<BundleError> {
        self.failure.lock().take()
    }

    fn fail(&self, error: BundleError) -> anyhow::Error {
        let message = error.to_string();
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
        anyhow::anyhow!(message)
    }
}

/// Ids the bundler owns itself, such as its runtime helpers.
fn is_internal(id: &str) -> bool {
    id.starts_with('\0') || id.starts_with("rolldown:")
}

fn module_type(loader: Loader) -> ModuleType {
    match loader {
        Loader::Tsx => ModuleType::Tsx,
        Loader::Ts => ModuleType::Ts,
        Loader::Jsx => ModuleType::Jsx,
        Loader::Js => ModuleType::Js,
        Loader::Css => ModuleType::Css,
        Loader::Json => ModuleType::Json,
    }
}

impl Plugin for VfsPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("qyp:virtual-files")
    }

    async fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> HookResolveIdReturn {
        if is_internal(args.specifier) {
            return Ok(None);
        }

        let resolution = self
            .resolver
            .resolve(&self.vfs, args.specifier, args.importer)
            .map_err(|e| self.fail(e.into()))?;

        let output = match resolution {
            Resolution::Package { specifier } | Resolution::Externalized { specifier, .. } => {
                HookResolveIdOutput {
                    id: ArcStr::from(specifier),
                    external: Some(true.into()),
                    normalize_external_id: Some(false),
                    ..Default::default()
                }
            }
            Resolution::Bundled { path, .. } => HookResolveIdOutput {
                id: ArcStr::from(path),
                ..Default::default()
            },
        };
        Ok(Some(output))
    }

    async fn load(&self, _ctx: &PluginContext, args: &HookLoadArgs<'_>) -> HookLoadReturn {
        if is_internal(args.id) {
            return Ok(None);
        }
        let file = self.vfs.read_file(args.id).map_err(|e| {
            self.fail(BundleError::Load {
                path: args.id.to_string(),
                message: e.to_string(),
            })
        })?;

        Ok(Some(HookLoadOutput {
            code: ArcStr::from(file.content.as_str()),
            module_type: Some(module_type(Loader::from_path(args.id))),
            ..Default::default()
        }))
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }
}
