//! 스냅샷 투영 (View Projection)
//!
//! 하나의 불변 스냅샷에 대한 두 가지 읽기 전용 조회:
//! - 디렉토리 목록: ".." + 하위 디렉토리 + 직속 파일
//! - 평탄 목록: 모든 파일을 깊이 우선으로 나열
//!
//! 정렬/필터는 표시 계층의 몫입니다.

use crate::models::snapshot::{EntryHandle, NodeHandle, Snapshot};
use crate::utils::mime::DIRECTORY_CONTENT_TYPE;

/// 목록의 한 행
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingRow {
    /// 상위 디렉토리 ("..")
    Parent(NodeHandle),
    /// 하위 디렉토리
    Directory(NodeHandle),
    /// 파일
    File(EntryHandle),
}

impl ListingRow {
    pub fn is_parent(&self) -> bool {
        matches!(self, ListingRow::Parent(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, ListingRow::Parent(_) | ListingRow::Directory(_))
    }
}

/// 표시용 행 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<'a> {
    /// 표시 이름 (평탄 모드에서는 전체 경로, 상위 디렉토리는 "..")
    pub name: &'a str,
    /// 압축 파일 내부 전체 경로
    pub path: &'a str,
    pub size: u64,
    pub modified: i64,
    pub content_type: &'a str,
    pub is_encrypted: bool,
    pub is_dir: bool,
}

/// 디렉토리 목록
///
/// 루트가 아니면 ".."가 맨 앞에 오고, 그 다음 하위 디렉토리, 마지막으로 파일.
/// 호출할 때마다 새로 계산되는 지연 시퀀스입니다. 다른 세대 핸들이면 None.
pub fn list_directory(
    snapshot: &Snapshot,
    node: NodeHandle,
) -> Option<impl Iterator<Item = ListingRow> + '_> {
    snapshot.node(node)?;
    let parent = snapshot.parent(node).map(ListingRow::Parent);
    Some(
        parent
            .into_iter()
            .chain(snapshot.subdirs(node).map(ListingRow::Directory))
            .chain(snapshot.files(node).map(ListingRow::File)),
    )
}

/// 평탄 목록 (모든 파일, 깊이 우선)
pub fn list_flat(snapshot: &Snapshot) -> FlatIter<'_> {
    FlatIter::new(snapshot)
}

struct Frame {
    node: NodeHandle,
    next_subdir: usize,
    next_file: usize,
}

/// 평탄 목록 반복자
///
/// 각 디렉토리에서 하위 디렉토리를 먼저 순회한 뒤 해당 디렉토리의 파일을 냅니다.
pub struct FlatIter<'a> {
    snapshot: &'a Snapshot,
    stack: Vec<Frame>,
}

impl<'a> FlatIter<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            stack: vec![Frame {
                node: snapshot.root(),
                next_subdir: 0,
                next_file: 0,
            }],
        }
    }
}

impl Iterator for FlatIter<'_> {
    type Item = ListingRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if let Some(child) = self.snapshot.subdir_at(frame.node, frame.next_subdir) {
                frame.next_subdir += 1;
                self.stack.push(Frame {
                    node: child,
                    next_subdir: 0,
                    next_file: 0,
                });
                continue;
            }
            if let Some(file) = self.snapshot.file_at(frame.node, frame.next_file) {
                frame.next_file += 1;
                return Some(ListingRow::File(file));
            }
            self.stack.pop();
        }
    }
}

impl Snapshot {
    /// 행 표시 정보 (다른 세대 핸들이면 None)
    pub fn describe(&self, row: &ListingRow, flat: bool) -> Option<RowView<'_>> {
        match *row {
            ListingRow::Parent(handle) => {
                let node = self.node(handle)?;
                Some(RowView {
                    name: "..",
                    path: &node.full_path,
                    size: 0,
                    modified: self.node_entry(handle).map(|e| e.modified).unwrap_or(0),
                    content_type: DIRECTORY_CONTENT_TYPE,
                    is_encrypted: false,
                    is_dir: true,
                })
            }
            ListingRow::Directory(handle) => {
                let node = self.node(handle)?;
                let entry = self.node_entry(handle);
                Some(RowView {
                    name: if flat { &node.full_path } else { &node.name },
                    path: &node.full_path,
                    size: 0,
                    modified: entry.map(|e| e.modified).unwrap_or(0),
                    content_type: DIRECTORY_CONTENT_TYPE,
                    is_encrypted: entry.is_some_and(|e| e.is_encrypted),
                    is_dir: true,
                })
            }
            ListingRow::File(handle) => {
                let entry = self.entry(handle)?;
                Some(RowView {
                    name: if flat { &entry.path } else { &entry.name },
                    path: &entry.path,
                    size: entry.size,
                    modified: entry.modified,
                    content_type: &entry.content_type,
                    is_encrypted: entry.is_encrypted,
                    is_dir: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::archive_entry::ArchiveEntry;

    fn build(paths: &[&str]) -> Snapshot {
        Snapshot::build(
            1,
            paths.iter().map(|p| ArchiveEntry::file(*p, 1)).collect(),
        )
    }

    fn names(snapshot: &Snapshot, rows: impl Iterator<Item = ListingRow>, flat: bool) -> Vec<String> {
        rows.map(|row| snapshot.describe(&row, flat).unwrap().name.to_string())
            .collect()
    }

    #[test]
    fn test_list_flat_scenario_order() {
        let snapshot = build(&["a/b/c.txt", "a/d.txt", "e.txt"]);
        assert_eq!(
            names(&snapshot, list_flat(&snapshot), true),
            vec!["a/b/c.txt", "a/d.txt", "e.txt"]
        );
    }

    #[test]
    fn test_list_flat_yields_every_file_once() {
        let mut entries: Vec<ArchiveEntry> = ["z.txt", "m/n/o.txt", "m/p.txt", "q/r.txt", "m/n/s.txt"]
            .iter()
            .map(|p| ArchiveEntry::file(*p, 1))
            .collect();
        entries.push(ArchiveEntry::dir("m/"));
        entries.push(ArchiveEntry::dir("empty/"));
        let snapshot = Snapshot::build(1, entries);

        let rows: Vec<ListingRow> = list_flat(&snapshot).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| matches!(row, ListingRow::File(_))));

        let mut paths = names(&snapshot, rows.into_iter(), true);
        paths.sort();
        assert_eq!(
            paths,
            vec!["m/n/o.txt", "m/n/s.txt", "m/p.txt", "q/r.txt", "z.txt"]
        );
    }

    #[test]
    fn test_list_flat_is_restartable() {
        let snapshot = build(&["a/b.txt", "c.txt"]);
        let first: Vec<ListingRow> = list_flat(&snapshot).collect();
        let second: Vec<ListingRow> = list_flat(&snapshot).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_directory_root_has_no_parent_row() {
        let snapshot = build(&["a/b/c.txt", "a/d.txt", "e.txt"]);
        let rows: Vec<ListingRow> = list_directory(&snapshot, snapshot.root()).unwrap().collect();
        assert!(!rows.iter().any(ListingRow::is_parent));
        assert_eq!(names(&snapshot, rows.into_iter(), false), vec!["a", "e.txt"]);
    }

    #[test]
    fn test_list_directory_dirs_first_with_parent() {
        let snapshot = build(&["a/z.txt", "a/b/c.txt", "a/y.txt", "a/x/w.txt"]);
        let a = snapshot.resolve_by_path("a").unwrap();
        let rows: Vec<ListingRow> = list_directory(&snapshot, a).unwrap().collect();

        assert_eq!(rows[0], ListingRow::Parent(snapshot.root()));
        assert_eq!(
            names(&snapshot, rows.iter().copied(), false),
            vec!["..", "b", "x", "z.txt", "y.txt"]
        );

        let first_file = rows.iter().position(|r| matches!(r, ListingRow::File(_))).unwrap();
        assert!(rows[first_file..].iter().all(|r| !r.is_directory()));
    }

    #[test]
    fn test_list_directory_stale_handle() {
        let old = build(&["a/b.txt"]);
        let new = Snapshot::build(2, vec![ArchiveEntry::file("a/b.txt", 1)]);
        let stale = old.resolve_by_path("a").unwrap();
        assert!(list_directory(&new, stale).is_none());
        assert!(new.describe(&ListingRow::Directory(stale), false).is_none());
    }

    #[test]
    fn test_projections_are_deterministic() {
        let paths = ["k/l/m.txt", "k/n.txt", "o.txt", "k/l/p.txt"];
        let one = build(&paths);
        let two = build(&paths);

        let flat_one = names(&one, list_flat(&one), true);
        let flat_two = names(&two, list_flat(&two), true);
        assert_eq!(flat_one, flat_two);

        for (handle, _) in one.directories() {
            let path = one.node(handle).unwrap().full_path.clone();
            let other = two.resolve_by_path(&path).unwrap();
            assert_eq!(
                names(&one, list_directory(&one, handle).unwrap(), false),
                names(&two, list_directory(&two, other).unwrap(), false)
            );
        }
    }

    #[test]
    fn test_describe_rows() {
        let snapshot = Snapshot::build(
            1,
            vec![
                ArchiveEntry::new("docs/", 0, 99, true),
                ArchiveEntry::new("docs/a.png", 2048, 100, false).encrypted(true),
            ],
        );
        let docs = snapshot.resolve_by_path("docs").unwrap();

        let dir_view = snapshot.describe(&ListingRow::Directory(docs), false).unwrap();
        assert_eq!(dir_view.name, "docs");
        assert_eq!(dir_view.path, "docs/");
        assert_eq!(dir_view.modified, 99);
        assert!(dir_view.is_dir);

        let file = snapshot.files(docs).next().unwrap();
        let file_view = snapshot.describe(&ListingRow::File(file), true).unwrap();
        assert_eq!(file_view.name, "docs/a.png");
        assert_eq!(file_view.size, 2048);
        assert_eq!(file_view.content_type, "image/png");
        assert!(file_view.is_encrypted);

        let parent_view = snapshot.describe(&ListingRow::Parent(snapshot.root()), false).unwrap();
        assert_eq!(parent_view.name, "..");
    }
}
