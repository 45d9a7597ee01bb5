//! # qyp-vfs - in-memory source tree for widget compilation
//!
//! `qyp-vfs` holds the file tree a widget is compiled from. Nothing here
//! touches the disk: a [`VirtualFs`] is populated by `make_directory` /
//! `write_file` calls (or by replaying a serialized snapshot), handed to the
//! bundler, and dropped once the bundle is produced.
//!
//! ## Usage
//!
//! ```rust
//! use qyp_vfs::{NodeMetadata, Resolution, Resolver, VirtualFs};
//!
//! let mut vfs = VirtualFs::new();
//! vfs.make_directory("/src", None).unwrap();
//! vfs.make_directory("/src/lib", None).unwrap();
//! vfs.write_file("/src/lib/utils.ts", "", Some(NodeMetadata::externalized())).unwrap();
//!
//! let resolved = Resolver::default()
//!     .resolve(&vfs, "@/lib/utils", Some("/src/widget/index.tsx"))
//!     .unwrap();
//! assert!(matches!(resolved, Resolution::Externalized { .. }));
//! ```

pub mod error;
pub mod fs;
pub mod node;
pub mod path;
pub mod resolver;

pub use error::{ResolveError, VfsError, VfsResult};
pub use fs::VirtualFs;
pub use node::{
    sort_for_replay, NodeMetadata, NodeRef, SerializedVirtualNode, VirtualDirectory, VirtualFile,
    VirtualNode,
};
pub use resolver::{
    Loader, Resolution, Resolver, ResolverOptions, DEFAULT_ALIAS_PREFIX, DEFAULT_SOURCE_ROOT,
    RESOLVE_EXTENSIONS,
};
