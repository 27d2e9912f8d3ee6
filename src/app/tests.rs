use super::*;
use crate::system::LocalEngine;
use crate::ui::{ConfirmPurpose, InputPurpose};
use crossterm::event::{KeyCode, KeyModifiers};
use std::fs::{self, File};
use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions as ZipFileOptions;
use zip::ZipWriter;

fn make_zip(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    for (entry, content) in files {
        writer.start_file(*entry, ZipFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn make_test_app(temp: &TempDir) -> App<LocalEngine> {
    let config = Config {
        default_dir: Some(temp.path().to_path_buf()),
        ..Config::default()
    };
    App::new(LocalEngine::new(), config)
}

fn run_until_idle(app: &mut App<LocalEngine>) {
    let mut guard = 0usize;
    loop {
        app.poll();
        if !app.is_busy() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
        guard += 1;
        assert!(guard < 10_000, "archive operation loop guard exceeded");
    }
}

fn opened_app(temp: &TempDir, files: &[(&str, &str)]) -> App<LocalEngine> {
    let archive = make_zip(temp.path(), "sample.zip", files);
    let mut app = make_test_app(temp);
    app.open_archive(&archive);
    run_until_idle(&mut app);
    app
}

fn press(app: &mut App<LocalEngine>, code: KeyCode) {
    app.handle_key(KeyModifiers::NONE, code);
}

fn type_text(app: &mut App<LocalEngine>, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// 입력 다이얼로그 내용을 지우고 새 값 입력 후 확인
fn replace_input(app: &mut App<LocalEngine>, text: &str) {
    app.handle_key(KeyModifiers::CONTROL, KeyCode::Char('u'));
    type_text(app, text);
    press(app, KeyCode::Enter);
}

fn row_names(app: &App<LocalEngine>) -> Vec<String> {
    let snapshot = app.session().navigator().snapshot().unwrap();
    let flat = app.view_mode() == ViewMode::Flat;
    app.rows()
        .iter()
        .map(|row| snapshot.describe(row, flat).unwrap().name.to_string())
        .collect()
}

#[test]
fn test_open_archive_lists_root() {
    let temp = TempDir::new().unwrap();
    let app = opened_app(&temp, &[("docs/a.txt", "a"), ("readme.md", "r")]);

    assert_eq!(row_names(&app), vec!["docs", "readme.md"]);
    assert_eq!(app.title(), "sample.zip:/");
    assert!(app.dialog.is_none());
}

#[test]
fn test_enter_folder_and_back_focuses_left_folder() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/x.txt", "x"), ("b/y.txt", "y"), ("z.txt", "z")]);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session().navigator().current_path(), "b/");
    assert_eq!(row_names(&app), vec!["..", "y.txt"]);
    assert_eq!(app.title(), "sample.zip:/b/");

    press(&mut app, KeyCode::Backspace);
    assert!(app.session().navigator().is_at_root());
    assert_eq!(app.cursor(), 1);
}

#[test]
fn test_archive_actions_need_open_archive() {
    let temp = TempDir::new().unwrap();
    let mut app = make_test_app(&temp);

    press(&mut app, KeyCode::Char('d'));
    assert!(app.dialog.is_none());
    assert_eq!(app.toast_display(), Some("No archive open"));

    press(&mut app, KeyCode::Char('o'));
    assert!(matches!(
        app.dialog,
        Some(DialogKind::Input {
            purpose: InputPurpose::OpenArchive,
            ..
        })
    ));
}

#[test]
fn test_busy_session_refuses_commands() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a.txt", "a")]);

    press(&mut app, KeyCode::Char('r'));
    assert!(app.is_busy());
    press(&mut app, KeyCode::Char('d'));
    assert!(app.toast_display().is_some_and(|t| t.contains("wait")));
    assert!(!app.command_items().iter().any(|i| i.key == "d" && i.enabled));

    run_until_idle(&mut app);
    assert_eq!(row_names(&app), vec!["a.txt"]);
}

#[test]
fn test_delete_with_confirmation_then_reload() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("docs/a.txt", "a"), ("readme.md", "r")]);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('d'));
    assert!(matches!(
        &app.dialog,
        Some(DialogKind::Confirm {
            purpose: ConfirmPurpose::Delete { selection },
            ..
        }) if selection == &vec!["readme.md".to_string()]
    ));

    press(&mut app, KeyCode::Char('y'));
    run_until_idle(&mut app);

    assert_eq!(row_names(&app), vec!["docs"]);
    assert_eq!(app.cursor(), 0);
    assert!(app.dialog.is_none());
}

#[test]
fn test_delete_marked_rows_without_confirmation() {
    let temp = TempDir::new().unwrap();
    let archive = make_zip(
        temp.path(),
        "sample.zip",
        &[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")],
    );
    let config = Config {
        confirm_delete: false,
        default_dir: Some(temp.path().to_path_buf()),
        ..Config::default()
    };
    let mut app = App::new(LocalEngine::new(), config);
    app.open_archive(&archive);
    run_until_idle(&mut app);

    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.marked().len(), 2);
    assert_eq!(app.cursor(), 2);

    press(&mut app, KeyCode::Char('d'));
    run_until_idle(&mut app);
    assert_eq!(row_names(&app), vec!["c.txt"]);
    assert!(app.marked().is_empty());
}

#[test]
fn test_add_files_into_current_folder() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("docs/a.txt", "a")]);
    let source = temp.path().join("my notes.txt");
    fs::write(&source, "hello").unwrap();

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session().navigator().current_path(), "docs/");

    press(&mut app, KeyCode::Char('+'));
    replace_input(&mut app, &format!("'{}'", source.display()));
    run_until_idle(&mut app);

    assert_eq!(app.session().navigator().current_path(), "docs/");
    assert_eq!(row_names(&app), vec!["..", "a.txt", "my notes.txt"]);
}

#[test]
fn test_add_rejects_unbalanced_quotes() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a.txt", "a")]);

    press(&mut app, KeyCode::Char('+'));
    replace_input(&mut app, "'unterminated");
    assert!(!app.is_busy());
    assert_eq!(app.toast_display(), Some("Unbalanced quotes in file list"));
}

#[test]
fn test_extract_all_to_new_folder() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("docs/a.txt", "alpha"), ("readme.md", "r")]);
    let dest = temp.path().join("out");

    press(&mut app, KeyCode::Char('x'));
    replace_input(&mut app, &dest.display().to_string());
    assert!(matches!(
        app.dialog,
        Some(DialogKind::Confirm {
            purpose: ConfirmPurpose::CreateDestination { .. },
            ..
        })
    ));

    press(&mut app, KeyCode::Enter);
    run_until_idle(&mut app);

    assert_eq!(fs::read_to_string(dest.join("docs/a.txt")).unwrap(), "alpha");
    assert!(dest.join("readme.md").exists());
    assert!(app.dialog.is_none());
}

#[test]
fn test_extract_marked_rows_from_folder() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("docs/a.txt", "alpha"), ("docs/b.txt", "beta")]);
    let dest = temp.path().join("picked");
    fs::create_dir(&dest).unwrap();

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('x'));
    replace_input(&mut app, &dest.display().to_string());
    run_until_idle(&mut app);

    assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
    assert!(!dest.join("b.txt").exists());
}

#[test]
fn test_toggle_view_mode_lists_all_files() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/b/c.txt", "c"), ("a/d.txt", "d"), ("e.txt", "e")]);

    press(&mut app, KeyCode::Char('v'));
    assert_eq!(app.view_mode(), ViewMode::Flat);
    assert_eq!(row_names(&app), vec!["a/b/c.txt", "a/d.txt", "e.txt"]);

    press(&mut app, KeyCode::Char('v'));
    assert_eq!(row_names(&app), vec!["a", "e.txt"]);
}

#[test]
fn test_go_to_path() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/b/c.txt", "c")]);

    press(&mut app, KeyCode::Char('g'));
    replace_input(&mut app, "a/b");
    assert_eq!(app.session().navigator().current_path(), "a/b/");

    press(&mut app, KeyCode::Char('g'));
    replace_input(&mut app, "missing");
    assert!(matches!(app.dialog, Some(DialogKind::Error { .. })));
    assert_eq!(app.session().navigator().current_path(), "a/b/");

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('g'));
    replace_input(&mut app, "");
    assert!(app.session().navigator().is_at_root());
}

#[test]
fn test_failed_open_keeps_listing() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a.txt", "a")]);

    press(&mut app, KeyCode::Char('o'));
    replace_input(&mut app, &temp.path().join("missing.zip").display().to_string());
    run_until_idle(&mut app);

    assert!(matches!(app.dialog, Some(DialogKind::Error { .. })));
    assert_eq!(row_names(&app), vec!["a.txt"]);
    assert_eq!(app.title(), "sample.zip:/");
}

#[test]
fn test_integrity_test_reports_result() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a.txt", "a"), ("b.txt", "b")]);

    press(&mut app, KeyCode::Char('t'));
    run_until_idle(&mut app);

    match &app.dialog {
        Some(DialogKind::Message { title, message }) => {
            assert_eq!(title, "Test archive");
            assert!(message.contains("2 files"));
        }
        other => panic!("unexpected dialog {:?}", other),
    }
    press(&mut app, KeyCode::Enter);
    assert!(app.dialog.is_none());
}

#[test]
fn test_new_archive_refuses_existing_file() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join("taken.zip");
    fs::write(&existing, "x").unwrap();
    let mut app = make_test_app(&temp);

    press(&mut app, KeyCode::Char('n'));
    replace_input(&mut app, &existing.display().to_string());
    assert!(matches!(app.dialog, Some(DialogKind::Error { .. })));
    assert!(!app.is_busy());

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('n'));
    replace_input(&mut app, "fresh.tar");
    run_until_idle(&mut app);
    assert_eq!(app.title(), "fresh.tar:/");
    assert!(temp.path().join("fresh.tar").exists());
}

#[test]
fn test_cursor_and_scroll_follow_page_keys() {
    let temp = TempDir::new().unwrap();
    let names: Vec<String> = (0..30).map(|i| format!("f{:02}.txt", i)).collect();
    let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
    let mut app = opened_app(&temp, &files);
    app.layout.update(ratatui::layout::Rect::new(0, 0, 60, 13), false);
    let page = app.layout.visible_rows();
    assert_eq!(page, 7);

    press(&mut app, KeyCode::PageDown);
    assert_eq!(app.cursor(), page);
    assert_eq!(app.scroll_offset(), 1);

    press(&mut app, KeyCode::End);
    assert_eq!(app.cursor(), 29);
    assert_eq!(app.scroll_offset(), 30 - page);

    press(&mut app, KeyCode::Home);
    assert_eq!((app.cursor(), app.scroll_offset()), (0, 0));
}

#[test]
fn test_resolve_input_path_relative_to_working_dir() {
    let temp = TempDir::new().unwrap();
    let app = make_test_app(&temp);
    assert_eq!(
        app.resolve_input_path(" out/x "),
        temp.path().join("out/x")
    );
    assert_eq!(app.resolve_input_path("/abs"), PathBuf::from("/abs"));
}

#[test]
fn test_tree_selection_changes_listing() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/x.txt", "x"), ("b/y.txt", "y"), ("z.txt", "z")]);
    assert!(app.tree_visible());

    press(&mut app, KeyCode::Tab);
    assert!(app.is_tree_focused());

    press(&mut app, KeyCode::Down);
    assert_eq!(app.session().navigator().current_path(), "a/");
    assert_eq!(row_names(&app), vec!["..", "x.txt"]);
    assert_eq!(app.title(), "sample.zip:/a/");

    press(&mut app, KeyCode::Down);
    assert_eq!(app.session().navigator().current_path(), "b/");
    assert_eq!(row_names(&app), vec!["..", "y.txt"]);

    // 마지막 폴더에서 더 내려가지 않음
    press(&mut app, KeyCode::Down);
    assert_eq!(app.session().navigator().current_path(), "b/");

    press(&mut app, KeyCode::Home);
    assert!(app.session().navigator().is_at_root());
    assert_eq!(row_names(&app), vec!["a", "b", "z.txt"]);

    // 목록으로 돌아오면 방향키가 커서를 움직임
    press(&mut app, KeyCode::Tab);
    assert!(!app.is_tree_focused());
    press(&mut app, KeyCode::Down);
    assert!(app.session().navigator().is_at_root());
    assert_eq!(app.cursor(), 1);
}

#[test]
fn test_hiding_tree_pane_keeps_view_mode() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/x.txt", "x")]);
    let area = ratatui::layout::Rect::new(0, 0, 100, 30);
    app.update_layout(area);
    assert_eq!(app.layout.mode(), LayoutMode::WithTree);

    press(&mut app, KeyCode::Tab);
    assert!(app.is_tree_focused());

    app.handle_key(KeyModifiers::SHIFT, KeyCode::Char('T'));
    assert!(!app.tree_visible());
    assert!(!app.is_tree_focused());
    assert_eq!(app.view_mode(), ViewMode::Tree);
    assert_eq!(app.toast_display(), Some("Folder tree hidden"));
    app.update_layout(area);
    assert_eq!(app.layout.mode(), LayoutMode::ListOnly);

    press(&mut app, KeyCode::Tab);
    assert!(!app.is_tree_focused());
    assert_eq!(app.toast_display(), Some("Folder tree is hidden"));

    app.handle_key(KeyModifiers::SHIFT, KeyCode::Char('T'));
    app.update_layout(area);
    assert_eq!(app.layout.mode(), LayoutMode::WithTree);

    // 평면 보기에서는 설정과 무관하게 트리 창이 숨겨짐
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('v'));
    assert_eq!(app.view_mode(), ViewMode::Flat);
    assert!(!app.is_tree_focused());
    app.update_layout(area);
    assert_eq!(app.layout.mode(), LayoutMode::ListOnly);
}

#[test]
fn test_narrow_terminal_returns_focus_to_list() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a/x.txt", "x")]);

    press(&mut app, KeyCode::Tab);
    assert!(app.is_tree_focused());
    app.update_layout(ratatui::layout::Rect::new(0, 0, 60, 20));
    assert!(!app.is_tree_focused());
}

#[test]
fn test_add_folder_into_current_folder() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("docs/a.txt", "a")]);
    let folder = temp.path().join("pics");
    fs::create_dir_all(folder.join("2024")).unwrap();
    fs::write(folder.join("2024").join("cat.png"), "png").unwrap();

    press(&mut app, KeyCode::Enter);
    app.handle_key(KeyModifiers::SHIFT, KeyCode::Char('A'));
    assert!(matches!(
        app.dialog,
        Some(DialogKind::Input {
            purpose: InputPurpose::AddFolder,
            ..
        })
    ));
    replace_input(&mut app, &folder.display().to_string());
    run_until_idle(&mut app);

    assert_eq!(app.session().navigator().current_path(), "docs/");
    assert_eq!(row_names(&app), vec!["..", "pics", "a.txt"]);
    app.go_to_path("docs/pics/2024");
    assert_eq!(row_names(&app), vec!["..", "cat.png"]);
}

#[test]
fn test_add_folder_rejects_plain_file() {
    let temp = TempDir::new().unwrap();
    let mut app = opened_app(&temp, &[("a.txt", "a")]);
    let file = temp.path().join("note.txt");
    fs::write(&file, "n").unwrap();

    app.handle_key(KeyModifiers::SHIFT, KeyCode::Char('A'));
    replace_input(&mut app, &file.display().to_string());
    assert!(!app.is_busy());
    assert!(matches!(app.dialog, Some(DialogKind::Error { .. })));
}
