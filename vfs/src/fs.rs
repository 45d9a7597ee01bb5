//! The in-memory file tree.
//!
//! Three indexes keyed by normalized absolute path: directories, the ordered
//! child list of each directory, and files. Every mutation checks all of its
//! preconditions first and then updates the index and the parent's child list
//! together, so a failed call leaves the tree untouched.

use indexmap::IndexMap;

use crate::error::{VfsError, VfsResult};
use crate::node::{
    NodeMetadata, NodeRef, SerializedVirtualNode, VirtualDirectory, VirtualFile, VirtualNode,
};
use crate::path;

#[derive(Debug, Clone)]
pub struct VirtualFs {
    directories: IndexMap<String, VirtualDirectory>,
    children: IndexMap<String, Vec<String>>,
    files: IndexMap<String, VirtualFile>,
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFs {
    /// Create an empty tree holding only the root directory.
    pub fn new() -> Self {
        let mut directories = IndexMap::new();
        directories.insert(
            path::ROOT.to_string(),
            VirtualDirectory {
                name: String::new(),
                metadata: NodeMetadata::default(),
            },
        );
        let mut children = IndexMap::new();
        children.insert(path::ROOT.to_string(), Vec::new());
        Self {
            directories,
            children,
            files: IndexMap::new(),
        }
    }

    /// Build a tree by replaying a serialized node list.
    pub fn from_snapshot(
        nodes: impl IntoIterator<Item = SerializedVirtualNode>,
    ) -> VfsResult<Self> {
        let mut fs = Self::new();
        fs.deserialize(nodes)?;
        Ok(fs)
    }

    /// Build a tree from the JSON wire form.
    pub fn from_json(json: &str) -> VfsResult<Self> {
        let nodes: Vec<SerializedVirtualNode> = serde_json::from_str(json)?;
        Self::from_snapshot(nodes)
    }

    /// Create or overwrite a file.
    ///
    /// Overwriting only swaps the content; the metadata of an existing file is
    /// left as it was.
    pub fn write_file(
        &mut self,
        path: &str,
        content: impl Into<String>,
        metadata: Option<NodeMetadata>,
    ) -> VfsResult<()> {
        let path = path::normalize(path);
        if let Some(file) = self.files.get_mut(&path) {
            file.content = content.into();
            tracing::trace!(%path, "file content replaced");
            return Ok(());
        }
        if path::is_root(&path) {
            return Err(VfsError::RootDirectory);
        }
        if self.directories.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path));
        }
        let parent = self.require_parent(&path)?;

        let file = VirtualFile {
            name: path::file_name(&path).to_string(),
            content: content.into(),
            metadata: metadata.unwrap_or_default(),
        };
        self.link_child(&parent, &path);
        self.files.insert(path.clone(), file);
        tracing::trace!(%path, "file created");
        Ok(())
    }

    pub fn read_file(&self, path: &str) -> VfsResult<&VirtualFile> {
        let path = path::normalize(path);
        self.files.get(&path).ok_or(VfsError::NotFound(path))
    }

    pub fn read_file_metadata(&self, path: &str) -> VfsResult<&NodeMetadata> {
        self.read_file(path).map(|file| &file.metadata)
    }

    /// Replace a file's metadata wholesale.
    pub fn write_file_metadata(&mut self, path: &str, metadata: NodeMetadata) -> VfsResult<()> {
        let path = path::normalize(path);
        match self.files.get_mut(&path) {
            Some(file) => {
                file.metadata = metadata;
                Ok(())
            }
            None => Err(VfsError::NotFound(path)),
        }
    }

    pub fn make_directory(&mut self, path: &str, metadata: Option<NodeMetadata>) -> VfsResult<()> {
        let path = path::normalize(path);
        if self.directories.contains_key(&path) || self.files.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path));
        }
        let parent = self.require_parent(&path)?;

        let directory = VirtualDirectory {
            name: path::file_name(&path).to_string(),
            metadata: metadata.unwrap_or_default(),
        };
        self.link_child(&parent, &path);
        self.directories.insert(path.clone(), directory);
        self.children.insert(path.clone(), Vec::new());
        tracing::trace!(%path, "directory created");
        Ok(())
    }

    pub fn read_directory_metadata(&self, path: &str) -> VfsResult<&NodeMetadata> {
        let path = path::normalize(path);
        self.directories
            .get(&path)
            .map(|dir| &dir.metadata)
            .ok_or(VfsError::NotFound(path))
    }

    /// Children of a directory in insertion order.
    pub fn read_directory(&self, path: &str) -> VfsResult<Vec<NodeRef<'_>>> {
        let path = path::normalize(path);
        let children = self.children.get(&path).ok_or(VfsError::NotFound(path))?;
        Ok(children
            .iter()
            .filter_map(|child| {
                if let Some(file) = self.files.get(child) {
                    Some(NodeRef::File(file))
                } else {
                    self.directories.get(child).map(NodeRef::Directory)
                }
            })
            .collect())
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(&path::normalize(path))
    }

    pub fn directory_exists(&self, path: &str) -> bool {
        self.directories.contains_key(&path::normalize(path))
    }

    pub fn unlink_file(&mut self, path: &str) -> VfsResult<()> {
        let path = path::normalize(path);
        if !self.files.contains_key(&path) {
            return Err(VfsError::NotFound(path));
        }
        self.files.shift_remove(&path);
        self.unlink_child(&path);
        tracing::trace!(%path, "file removed");
        Ok(())
    }

    /// Remove an empty directory. Descendants are never removed implicitly:
    /// a directory that still has children is rejected.
    pub fn unlink_directory(&mut self, path: &str) -> VfsResult<()> {
        let path = path::normalize(path);
        if path::is_root(&path) {
            return Err(VfsError::RootDirectory);
        }
        if !self.directories.contains_key(&path) {
            return Err(VfsError::NotFound(path));
        }
        if self.children.get(&path).is_some_and(|c| !c.is_empty()) {
            return Err(VfsError::DirectoryNotEmpty(path));
        }
        self.directories.shift_remove(&path);
        self.children.shift_remove(&path);
        self.unlink_child(&path);
        tracing::trace!(%path, "directory removed");
        Ok(())
    }

    /// All files in creation order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &VirtualFile)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Directories except the root (shallow first, then by path), followed by
    /// the files accepted by `predicate` in creation order.
    pub fn serialize_with<F>(&self, mut predicate: F) -> Vec<SerializedVirtualNode>
    where
        F: FnMut(&str, &VirtualFile) -> bool,
    {
        let mut directories: Vec<(&String, &VirtualDirectory)> = self
            .directories
            .iter()
            .filter(|(path, _)| !path::is_root(path))
            .collect();
        directories.sort_by(|(a, _), (b, _)| {
            path::depth(a)
                .cmp(&path::depth(b))
                .then_with(|| a.cmp(b))
        });

        let mut out = Vec::with_capacity(directories.len() + self.files.len());
        out.extend(directories.into_iter().map(|(path, dir)| SerializedVirtualNode {
            path: path.clone(),
            node: VirtualNode::Directory(dir.clone()),
        }));
        out.extend(
            self.files
                .iter()
                .filter(|(path, file)| predicate(path, file))
                .map(|(path, file)| SerializedVirtualNode {
                    path: path.clone(),
                    node: VirtualNode::File(file.clone()),
                }),
        );
        out
    }

    pub fn serialize(&self) -> Vec<SerializedVirtualNode> {
        self.serialize_with(|_, _| true)
    }

    pub fn to_json(&self) -> VfsResult<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    /// Replay a node list in the order given. Parents must precede children.
    pub fn deserialize(
        &mut self,
        nodes: impl IntoIterator<Item = SerializedVirtualNode>,
    ) -> VfsResult<()> {
        for SerializedVirtualNode { path, node } in nodes {
            match node {
                VirtualNode::Directory(dir) => self.make_directory(&path, Some(dir.metadata))?,
                VirtualNode::File(file) => {
                    self.write_file(&path, file.content, Some(file.metadata))?
                }
            }
        }
        Ok(())
    }

    fn require_parent(&self, path: &str) -> VfsResult<String> {
        let parent = path::parent(path);
        if self.directories.contains_key(parent) {
            Ok(parent.to_string())
        } else {
            Err(VfsError::ParentNotFound {
                path: path.to_string(),
                parent: parent.to_string(),
            })
        }
    }

    fn link_child(&mut self, parent: &str, path: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(path.to_string());
    }

    fn unlink_child(&mut self, path: &str) {
        if let Some(siblings) = self.children.get_mut(path::parent(path)) {
            siblings.retain(|child| child != path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VirtualFs {
        let mut fs = VirtualFs::new();
        fs.make_directory("/src", None).unwrap();
        fs.make_directory("/src/lib", Some(NodeMetadata::readonly())).unwrap();
        fs.make_directory("/src/widget", None).unwrap();
        fs.write_file("/src/widget/index.tsx", "export default function C(){return null}", None)
            .unwrap();
        fs.write_file("/src/lib/utils.ts", "// host", Some(NodeMetadata::externalized()))
            .unwrap();
        fs
    }

    #[test]
    fn test_root_exists() {
        let fs = VirtualFs::new();
        assert!(fs.directory_exists("/"));
        assert_eq!(fs.read_directory_metadata("/").unwrap(), &NodeMetadata::default());
        assert!(fs.read_directory("/").unwrap().is_empty());
    }

    #[test]
    fn test_write_requires_parent() {
        let mut fs = VirtualFs::new();
        let err = fs.write_file("/src/a.ts", "", None).unwrap_err();
        assert!(matches!(err, VfsError::ParentNotFound { ref parent, .. } if parent == "/src"));
        let err = fs.make_directory("/src/lib", None).unwrap_err();
        assert!(matches!(err, VfsError::ParentNotFound { .. }));
        assert!(!fs.file_exists("/src/a.ts"));
    }

    #[test]
    fn test_write_file_is_idempotent() {
        let mut fs = sample();
        fs.write_file("/src/widget/query.ts", "c1", None).unwrap();
        fs.write_file("/src/widget/query.ts", "c2", None).unwrap();
        assert_eq!(fs.read_file("/src/widget/query.ts").unwrap().content, "c2");
        let entries = fs.read_directory("/src/widget").unwrap();
        let names: Vec<&str> = entries.iter().map(|n| n.name()).collect();
        assert_eq!(names, ["index.tsx", "query.ts"]);
    }

    #[test]
    fn test_overwrite_keeps_metadata() {
        let mut fs = sample();
        fs.write_file("/src/lib/utils.ts", "changed", Some(NodeMetadata::default()))
            .unwrap();
        assert!(fs.read_file_metadata("/src/lib/utils.ts").unwrap().externalized);
        fs.write_file_metadata("/src/lib/utils.ts", NodeMetadata::default())
            .unwrap();
        assert!(!fs.read_file_metadata("/src/lib/utils.ts").unwrap().externalized);
        assert!(matches!(
            fs.write_file_metadata("/nope.ts", NodeMetadata::default()),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_paths_are_unique() {
        let mut fs = sample();
        assert!(matches!(fs.make_directory("/src", None), Err(VfsError::AlreadyExists(_))));
        assert!(matches!(
            fs.make_directory("/src/widget/index.tsx", None),
            Err(VfsError::AlreadyExists(_))
        ));
        assert!(matches!(fs.write_file("/src/lib", "x", None), Err(VfsError::AlreadyExists(_))));
        assert!(matches!(fs.write_file("/", "x", None), Err(VfsError::RootDirectory)));
        assert!(fs.directory_exists("/src/lib"));
        assert!(!fs.file_exists("/src/lib"));
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let mut fs = sample();
        fs.write_file("src/widget/../widget/./extra.ts", "x", None).unwrap();
        assert!(fs.file_exists("/src/widget/extra.ts"));
    }

    #[test]
    fn test_unlink_missing_leaves_state_unchanged() {
        let mut fs = sample();
        let before = fs.serialize();
        assert!(matches!(fs.unlink_file("/src/widget/missing.tsx"), Err(VfsError::NotFound(_))));
        assert!(matches!(fs.unlink_directory("/src/missing"), Err(VfsError::NotFound(_))));
        assert_eq!(fs.serialize(), before);
    }

    #[test]
    fn test_unlink() {
        let mut fs = sample();
        fs.unlink_file("/src/widget/index.tsx").unwrap();
        assert!(!fs.file_exists("/src/widget/index.tsx"));
        assert!(fs.read_directory("/src/widget").unwrap().is_empty());

        fs.unlink_directory("/src/widget").unwrap();
        assert!(!fs.directory_exists("/src/widget"));
        let entries = fs.read_directory("/src").unwrap();
        let names: Vec<&str> = entries.iter().map(|n| n.name()).collect();
        assert_eq!(names, ["lib"]);
    }

    #[test]
    fn test_unlink_directory_rejects_nonempty_and_root() {
        let mut fs = sample();
        let before = fs.serialize();
        assert!(matches!(
            fs.unlink_directory("/src/lib"),
            Err(VfsError::DirectoryNotEmpty(_))
        ));
        assert!(matches!(fs.unlink_directory("/"), Err(VfsError::RootDirectory)));
        assert_eq!(fs.serialize(), before);
    }

    #[test]
    fn test_serialize_order() {
        let mut fs = VirtualFs::new();
        fs.make_directory("/src", None).unwrap();
        fs.make_directory("/src/widget", None).unwrap();
        fs.write_file("/src/widget/b.ts", "", None).unwrap();
        fs.make_directory("/src/components", None).unwrap();
        fs.make_directory("/src/components/ui", None).unwrap();
        fs.write_file("/src/widget/a.ts", "", None).unwrap();
        fs.make_directory("/lib", None).unwrap();

        let paths: Vec<String> = fs.serialize().into_iter().map(|n| n.path).collect();
        assert_eq!(
            paths,
            [
                "/lib",
                "/src",
                "/src/components",
                "/src/widget",
                "/src/components/ui",
                "/src/widget/b.ts",
                "/src/widget/a.ts",
            ]
        );
    }

    #[test]
    fn test_serialize_with_predicate() {
        let fs = sample();
        let nodes = fs.serialize_with(|_, file| !file.metadata.externalized);
        assert!(nodes.iter().any(|n| n.path == "/src/widget/index.tsx"));
        assert!(!nodes.iter().any(|n| n.path == "/src/lib/utils.ts"));
        assert!(nodes.iter().any(|n| n.path == "/src/lib"));
    }

    #[test]
    fn test_round_trip() {
        let fs = sample();
        let json = fs.to_json().unwrap();
        let copy = VirtualFs::from_json(&json).unwrap();

        for path in ["/src", "/src/lib", "/src/widget"] {
            assert!(copy.directory_exists(path));
            assert_eq!(
                copy.read_directory_metadata(path).unwrap(),
                fs.read_directory_metadata(path).unwrap()
            );
        }
        for (path, file) in fs.files() {
            assert_eq!(copy.read_file(path).unwrap(), file);
        }
        assert_eq!(copy.file_count(), fs.file_count());
    }

    #[test]
    fn test_deserialize_out_of_order_fails() {
        let nodes = vec![
            SerializedVirtualNode::file("/src/a.ts", "", NodeMetadata::default()),
            SerializedVirtualNode::directory("/src", NodeMetadata::default()),
        ];
        assert!(matches!(
            VirtualFs::from_snapshot(nodes.clone()),
            Err(VfsError::ParentNotFound { .. })
        ));

        let mut nodes = nodes;
        crate::node::sort_for_replay(&mut nodes);
        let fs = VirtualFs::from_snapshot(nodes).unwrap();
        assert!(fs.file_exists("/src/a.ts"));
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = VirtualFs::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), "VFS_INVALID_SNAPSHOT");
    }
}
