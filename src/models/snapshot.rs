//! 압축 파일 내용 스냅샷
//!
//! 엔진이 보고한 평탄한 항목 목록을 디렉토리 트리로 변환합니다.
//! 노드는 스냅샷 내부 배열(arena)에 저장되고, UI에는 세대 번호가 붙은
//! 핸들만 노출됩니다. 다른 세대의 핸들은 항상 "찾을 수 없음"으로 처리됩니다.

use crate::models::archive_entry::ArchiveEntry;
use log::{debug, warn};
use std::collections::HashMap;

const ROOT_INDEX: usize = 0;

/// 디렉토리 노드 핸들 (스냅샷 세대 + 노드 인덱스)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    generation: u64,
    index: usize,
}

/// 파일 항목 핸들 (스냅샷 세대 + 항목 인덱스)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    generation: u64,
    index: usize,
}

/// 트리의 디렉토리 하나
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// 전체 경로 (루트는 "", 그 외는 항상 '/'로 끝남)
    pub full_path: String,
    /// 디렉토리 이름
    pub name: String,
    parent: Option<usize>,
    subdirs: Vec<usize>,
    files: Vec<usize>,
    /// 엔진이 디렉토리 항목을 명시적으로 보고한 경우 해당 항목
    entry: Option<usize>,
    child_index: HashMap<String, usize>,
}

impl DirectoryNode {
    fn new(full_path: String, name: String, parent: Option<usize>) -> Self {
        Self {
            full_path,
            name,
            parent,
            subdirs: Vec::new(),
            files: Vec::new(),
            entry: None,
            child_index: HashMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn subdir_count(&self) -> usize {
        self.subdirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// 잘못된 항목 경로 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    Empty,
    EmptySegment,
    DotSegment,
    Traversal,
}

impl PathRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            PathRejection::Empty => "empty path",
            PathRejection::EmptySegment => "empty path segment",
            PathRejection::DotSegment => "'.' path segment",
            PathRejection::Traversal => "path traversal",
        }
    }
}

/// 정규화된 항목 경로
#[derive(Debug, PartialEq, Eq)]
enum ParsedPath<'a> {
    /// 루트 자체를 가리키는 경로 ("/", "./")
    Root,
    Segments {
        segments: Vec<&'a str>,
        trailing_slash: bool,
    },
}

/// 경로 정규화 및 검증
///
/// 앞의 '/' 하나와 "./" 접두사는 제거합니다. 끝의 '/'는 디렉토리 표시입니다.
fn parse_entry_path(raw: &str) -> Result<ParsedPath<'_>, PathRejection> {
    if raw.is_empty() {
        return Err(PathRejection::Empty);
    }
    let mut path = raw.strip_prefix('/').unwrap_or(raw);
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    if path.is_empty() || path == "." {
        return Ok(ParsedPath::Root);
    }
    let trailing_slash = path.ends_with('/');
    let body = path.strip_suffix('/').unwrap_or(path);

    let mut segments = Vec::new();
    for segment in body.split('/') {
        match segment {
            "" => return Err(PathRejection::EmptySegment),
            "." => return Err(PathRejection::DotSegment),
            ".." => return Err(PathRejection::Traversal),
            other => segments.push(other),
        }
    }
    Ok(ParsedPath::Segments {
        segments,
        trailing_slash,
    })
}

/// 한 번의 목록 읽기 결과로 만든 불변 트리 + 항목 집합
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    nodes: Vec<DirectoryNode>,
    entries: Vec<ArchiveEntry>,
    rejected: usize,
}

impl Snapshot {
    /// 항목 목록으로 트리 생성
    ///
    /// 잘못된 경로의 항목은 경고 로그를 남기고 버립니다. 나머지 항목은 계속 처리합니다.
    pub fn build(generation: u64, entries: Vec<ArchiveEntry>) -> Self {
        let mut snapshot = Self {
            generation,
            nodes: vec![DirectoryNode::new(String::new(), String::new(), None)],
            entries: Vec::new(),
            rejected: 0,
        };

        for (index, entry) in entries.iter().enumerate() {
            let parsed = match parse_entry_path(&entry.path) {
                Ok(parsed) => parsed,
                Err(rejection) => {
                    warn!(
                        "dropping archive entry {:?}: {}",
                        entry.path,
                        rejection.reason()
                    );
                    snapshot.rejected += 1;
                    continue;
                }
            };
            let (segments, trailing_slash) = match parsed {
                ParsedPath::Root => {
                    debug!("ignoring root alias entry {:?}", entry.path);
                    continue;
                }
                ParsedPath::Segments {
                    segments,
                    trailing_slash,
                } => (segments, trailing_slash),
            };

            if entry.is_dir || trailing_slash {
                let node = snapshot.ensure_directory(&segments);
                snapshot.nodes[node].entry = Some(index);
            } else {
                let parents = &segments[..segments.len().saturating_sub(1)];
                let parent = snapshot.ensure_directory(parents);
                snapshot.nodes[parent].files.push(index);
            }
        }

        snapshot.entries = entries;
        snapshot
    }

    /// 경로 요소를 따라 디렉토리 노드를 찾거나 생성
    fn ensure_directory(&mut self, segments: &[&str]) -> usize {
        let mut current = ROOT_INDEX;
        for segment in segments {
            if let Some(&child) = self.nodes[current].child_index.get(*segment) {
                current = child;
                continue;
            }
            let full_path = format!("{}{}/", self.nodes[current].full_path, segment);
            let child = self.nodes.len();
            self.nodes.push(DirectoryNode::new(
                full_path,
                (*segment).to_string(),
                Some(current),
            ));
            let parent = &mut self.nodes[current];
            parent.child_index.insert((*segment).to_string(), child);
            parent.subdirs.push(child);
            current = child;
        }
        current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 버려진 항목 수
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    pub fn root(&self) -> NodeHandle {
        self.node_handle(ROOT_INDEX)
    }

    pub fn is_root(&self, handle: NodeHandle) -> bool {
        self.is_live_node(handle) && handle.index == ROOT_INDEX
    }

    fn node_handle(&self, index: usize) -> NodeHandle {
        NodeHandle {
            generation: self.generation,
            index,
        }
    }

    fn entry_handle(&self, index: usize) -> EntryHandle {
        EntryHandle {
            generation: self.generation,
            index,
        }
    }

    fn is_live_node(&self, handle: NodeHandle) -> bool {
        handle.generation == self.generation && handle.index < self.nodes.len()
    }

    /// 핸들로 노드 조회 (다른 세대 핸들은 None)
    pub fn node(&self, handle: NodeHandle) -> Option<&DirectoryNode> {
        if !self.is_live_node(handle) {
            return None;
        }
        self.nodes.get(handle.index)
    }

    /// 핸들로 항목 조회 (다른 세대 핸들은 None)
    pub fn entry(&self, handle: EntryHandle) -> Option<&ArchiveEntry> {
        if handle.generation != self.generation {
            return None;
        }
        self.entries.get(handle.index)
    }

    /// 디렉토리 노드에 대응하는 명시적 항목
    pub fn node_entry(&self, handle: NodeHandle) -> Option<&ArchiveEntry> {
        let index = self.node(handle)?.entry?;
        self.entries.get(index)
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let parent = self.node(handle)?.parent?;
        Some(self.node_handle(parent))
    }

    /// 하위 디렉토리 핸들 (트리 순서)
    pub fn subdirs(&self, handle: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.node(handle)
            .map(|node| node.subdirs.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&index| self.node_handle(index))
    }

    /// 직속 파일 핸들 (트리 순서)
    pub fn files(&self, handle: NodeHandle) -> impl Iterator<Item = EntryHandle> + '_ {
        self.node(handle)
            .map(|node| node.files.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&index| self.entry_handle(index))
    }

    pub(crate) fn subdir_at(&self, handle: NodeHandle, position: usize) -> Option<NodeHandle> {
        let index = *self.node(handle)?.subdirs.get(position)?;
        Some(self.node_handle(index))
    }

    pub(crate) fn file_at(&self, handle: NodeHandle, position: usize) -> Option<EntryHandle> {
        let index = *self.node(handle)?.files.get(position)?;
        Some(self.entry_handle(index))
    }

    /// 경로로 디렉토리 찾기
    ///
    /// 앞뒤 '/'는 있어도 없어도 됩니다. 없는 경로는 None (정상적인 경우).
    pub fn resolve_by_path(&self, path: &str) -> Option<NodeHandle> {
        if path.is_empty() {
            return Some(self.root());
        }
        let segments = match parse_entry_path(path).ok()? {
            ParsedPath::Root => return Some(self.root()),
            ParsedPath::Segments { segments, .. } => segments,
        };
        let mut current = ROOT_INDEX;
        for segment in segments {
            current = *self.nodes[current].child_index.get(segment)?;
        }
        Some(self.node_handle(current))
    }

    /// 디렉토리 수 (루트 제외)
    pub fn dir_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// 트리에 연결된 파일 수
    pub fn file_count(&self) -> usize {
        self.nodes.iter().map(|node| node.files.len()).sum()
    }

    /// 트리에 연결된 파일의 총 크기
    pub fn total_size(&self) -> u64 {
        self.nodes
            .iter()
            .flat_map(|node| node.files.iter())
            .filter_map(|&index| self.entries.get(index))
            .map(|entry| entry.size)
            .sum()
    }

    /// 암호화된 항목 존재 여부
    pub fn is_encrypted(&self) -> bool {
        self.entries.iter().any(|entry| entry.is_encrypted)
    }

    /// 모든 디렉토리를 전위 순회 (디렉토리 트리 패널용, 깊이 포함)
    pub fn directories(&self) -> Vec<(NodeHandle, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(ROOT_INDEX, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            out.push((self.node_handle(index), depth));
            for &child in self.nodes[index].subdirs.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<ArchiveEntry> {
        paths.iter().map(|p| ArchiveEntry::file(*p, 1)).collect()
    }

    fn subdir_names(snapshot: &Snapshot, handle: NodeHandle) -> Vec<String> {
        snapshot
            .subdirs(handle)
            .map(|h| snapshot.node(h).unwrap().name.clone())
            .collect()
    }

    fn file_names(snapshot: &Snapshot, handle: NodeHandle) -> Vec<String> {
        snapshot
            .files(handle)
            .map(|h| snapshot.entry(h).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_parse_entry_path() {
        assert_eq!(
            parse_entry_path("a/b.txt"),
            Ok(ParsedPath::Segments {
                segments: vec!["a", "b.txt"],
                trailing_slash: false
            })
        );
        assert_eq!(
            parse_entry_path("/a/"),
            Ok(ParsedPath::Segments {
                segments: vec!["a"],
                trailing_slash: true
            })
        );
        assert_eq!(
            parse_entry_path("./a/b"),
            Ok(ParsedPath::Segments {
                segments: vec!["a", "b"],
                trailing_slash: false
            })
        );
        assert_eq!(parse_entry_path("./"), Ok(ParsedPath::Root));
        assert_eq!(parse_entry_path(""), Err(PathRejection::Empty));
        assert_eq!(parse_entry_path("a//b"), Err(PathRejection::EmptySegment));
        assert_eq!(parse_entry_path("a/../b"), Err(PathRejection::Traversal));
        assert_eq!(parse_entry_path("a/./b"), Err(PathRejection::DotSegment));
    }

    #[test]
    fn test_build_scenario_tree() {
        let snapshot = Snapshot::build(1, files(&["a/b/c.txt", "a/d.txt", "e.txt"]));
        let root = snapshot.root();

        assert_eq!(subdir_names(&snapshot, root), vec!["a"]);
        assert_eq!(file_names(&snapshot, root), vec!["e.txt"]);

        let a = snapshot.resolve_by_path("a/").unwrap();
        assert_eq!(subdir_names(&snapshot, a), vec!["b"]);
        assert_eq!(file_names(&snapshot, a), vec!["d.txt"]);

        let b = snapshot.resolve_by_path("a/b").unwrap();
        assert_eq!(snapshot.node(b).unwrap().full_path, "a/b/");
        assert_eq!(file_names(&snapshot, b), vec!["c.txt"]);
        assert_eq!(snapshot.parent(b), Some(a));
    }

    #[test]
    fn test_full_path_is_parent_path_plus_name() {
        let snapshot = Snapshot::build(1, files(&["x/y/z/file.bin", "x/w/other.bin"]));
        for (handle, _) in snapshot.directories() {
            let node = snapshot.node(handle).unwrap();
            match snapshot.parent(handle) {
                None => assert_eq!(node.full_path, ""),
                Some(parent) => {
                    let parent_path = &snapshot.node(parent).unwrap().full_path;
                    assert_eq!(node.full_path, format!("{}{}/", parent_path, node.name));
                }
            }
        }
    }

    #[test]
    fn test_explicit_directory_entry_attaches_metadata() {
        let mut entries = vec![ArchiveEntry::new("docs/", 0, 1_700_000_000, true)];
        entries.extend(files(&["docs/readme.md"]));
        let snapshot = Snapshot::build(1, entries);

        let docs = snapshot.resolve_by_path("docs").unwrap();
        assert_eq!(snapshot.node_entry(docs).unwrap().modified, 1_700_000_000);
        assert_eq!(snapshot.dir_count(), 1);
        assert_eq!(snapshot.file_count(), 1);
    }

    #[test]
    fn test_empty_directory_entry_is_resolvable() {
        let snapshot = Snapshot::build(1, vec![ArchiveEntry::dir("empty/")]);
        let empty = snapshot.resolve_by_path("/empty/").unwrap();
        assert_eq!(snapshot.node(empty).unwrap().subdir_count(), 0);
        assert_eq!(snapshot.node(empty).unwrap().file_count(), 0);
    }

    #[test]
    fn test_malformed_paths_are_dropped() {
        let snapshot = Snapshot::build(
            1,
            files(&["ok.txt", "../evil.txt", "a//b.txt", "", "sub/ok2.txt"]),
        );
        assert_eq!(snapshot.rejected_count(), 3);
        assert_eq!(snapshot.file_count(), 2);
        assert!(snapshot.resolve_by_path("sub").is_some());
    }

    #[test]
    fn test_backslash_paths_are_normalized() {
        let entries = files(&["win\\dir\\file.txt"]);
        assert_eq!(entries[0].path, "win/dir/file.txt");
        let snapshot = Snapshot::build(1, entries.clone());
        assert_eq!(snapshot.entries, entries);
        let dir = snapshot.resolve_by_path("win/dir/").unwrap();
        assert_eq!(file_names(&snapshot, dir), vec!["file.txt"]);
    }

    #[test]
    fn test_every_prefix_directory_resolves() {
        let paths = ["p/q/r/s.txt", "p/t.txt", "u/v/w.txt"];
        let snapshot = Snapshot::build(1, files(&paths));
        for path in paths {
            let segments: Vec<&str> = path.split('/').collect();
            for depth in 1..segments.len() {
                let prefix = segments[..depth].join("/");
                assert!(
                    snapshot.resolve_by_path(&prefix).is_some(),
                    "prefix {} should resolve",
                    prefix
                );
            }
        }
        assert!(snapshot.resolve_by_path("p/t.txt").is_none());
        assert!(snapshot.resolve_by_path("missing").is_none());
        assert_eq!(snapshot.resolve_by_path(""), Some(snapshot.root()));
        assert_eq!(snapshot.resolve_by_path("/"), Some(snapshot.root()));
    }

    #[test]
    fn test_stale_handles_are_rejected() {
        let old = Snapshot::build(1, files(&["a/b.txt"]));
        let new = Snapshot::build(2, files(&["a/b.txt"]));
        let old_a = old.resolve_by_path("a").unwrap();
        let old_file = old.files(old_a).next().unwrap();

        assert!(new.node(old_a).is_none());
        assert!(new.entry(old_file).is_none());
        assert!(new.parent(old_a).is_none());
        assert_eq!(new.subdirs(old_a).count(), 0);
        assert!(!new.is_root(old.root()));
    }

    #[test]
    fn test_directories_preorder_with_depth() {
        let snapshot = Snapshot::build(1, files(&["a/b/c.txt", "a/d.txt", "e/f.txt"]));
        let listed: Vec<(String, usize)> = snapshot
            .directories()
            .into_iter()
            .map(|(h, depth)| (snapshot.node(h).unwrap().full_path.clone(), depth))
            .collect();
        assert_eq!(
            listed,
            vec![
                (String::new(), 0),
                ("a/".to_string(), 1),
                ("a/b/".to_string(), 2),
                ("e/".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_encrypted_and_totals() {
        let entries = vec![
            ArchiveEntry::file("a.txt", 10),
            ArchiveEntry::file("b/c.txt", 32).encrypted(true),
        ];
        let snapshot = Snapshot::build(7, entries);
        assert!(snapshot.is_encrypted());
        assert_eq!(snapshot.total_size(), 42);
        assert_eq!(snapshot.generation(), 7);
    }
}
