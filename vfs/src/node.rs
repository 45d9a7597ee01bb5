//! Node types of the virtual tree and their serialized wire form.

use serde::{Deserialize, Serialize};

use crate::path;

/// Flags attached to a file or directory.
///
/// Only these two flags are ever consulted, so the bag is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Editors may only read this node
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,
    /// Supplied by the host at runtime instead of being bundled
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub externalized: bool,
}

impl NodeMetadata {
    pub fn readonly() -> Self {
        Self {
            readonly: true,
            ..Self::default()
        }
    }

    pub fn externalized() -> Self {
        Self {
            externalized: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDirectory {
    pub name: String,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

/// A node of the tree, tagged the same way on the wire (`"type"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VirtualNode {
    File(VirtualFile),
    Directory(VirtualDirectory),
}

impl VirtualNode {
    pub fn name(&self) -> &str {
        match self {
            VirtualNode::File(file) => &file.name,
            VirtualNode::Directory(dir) => &dir.name,
        }
    }

    pub fn metadata(&self) -> &NodeMetadata {
        match self {
            VirtualNode::File(file) => &file.metadata,
            VirtualNode::Directory(dir) => &dir.metadata,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, VirtualNode::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, VirtualNode::Directory(_))
    }
}

/// Borrowed view of a child returned by directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    File(&'a VirtualFile),
    Directory(&'a VirtualDirectory),
}

impl NodeRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            NodeRef::File(file) => &file.name,
            NodeRef::Directory(dir) => &dir.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeRef::File(_))
    }
}

/// Flat record crossing a process boundary:
/// `{ path, type, name, metadata, content? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedVirtualNode {
    pub path: String,
    #[serde(flatten)]
    pub node: VirtualNode,
}

impl SerializedVirtualNode {
    pub fn file(path: impl Into<String>, content: impl Into<String>, metadata: NodeMetadata) -> Self {
        let path = path::normalize(&path.into());
        let name = path::file_name(&path).to_string();
        Self {
            path,
            node: VirtualNode::File(VirtualFile {
                name,
                content: content.into(),
                metadata,
            }),
        }
    }

    pub fn directory(path: impl Into<String>, metadata: NodeMetadata) -> Self {
        let path = path::normalize(&path.into());
        let name = path::file_name(&path).to_string();
        Self {
            path,
            node: VirtualNode::Directory(VirtualDirectory { name, metadata }),
        }
    }
}

/// Put a node list into replay order: directories first, shallow before deep,
/// then lexicographic at equal depth; files keep their relative order.
pub fn sort_for_replay(nodes: &mut [SerializedVirtualNode]) {
    nodes.sort_by(|a, b| match (&a.node, &b.node) {
        (VirtualNode::Directory(_), VirtualNode::Directory(_)) => path::depth(&a.path)
            .cmp(&path::depth(&b.path))
            .then_with(|| a.path.cmp(&b.path)),
        (VirtualNode::Directory(_), VirtualNode::File(_)) => std::cmp::Ordering::Less,
        (VirtualNode::File(_), VirtualNode::Directory(_)) => std::cmp::Ordering::Greater,
        (VirtualNode::File(_), VirtualNode::File(_)) => std::cmp::Ordering::Equal,
    });
}
