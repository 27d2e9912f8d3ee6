use anyhow::{Context, Result};
use boksl_archiver::app::App;
use boksl_archiver::cli::{self, CliOutcome, LaunchConfig, LaunchMode};
use boksl_archiver::config::Config;
use boksl_archiver::core::navigation::ViewMode;
use boksl_archiver::system::LocalEngine;
use boksl_archiver::ui::{
    CommandBar, Dialog, DirTree, FileList, LayoutMode, StatusBar, WarningScreen,
};
use boksl_archiver::utils::formatter::format_file_size;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    style::Style,
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> Result<ExitCode> {
    let launch = LaunchConfig::parse();
    let mode = launch.mode();
    init_logging(matches!(mode, LaunchMode::Browse(_)));

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(dir) = &launch.default_dir {
        config.default_dir = Some(dir.clone());
    }

    match mode {
        LaunchMode::Browse(archive) => {
            run_tui(config, archive)?;
            Ok(ExitCode::SUCCESS)
        }
        mode => match cli::run(mode, &config, launch.force) {
            Ok(CliOutcome::Done) => Ok(ExitCode::SUCCESS),
            Ok(CliOutcome::Cancelled) => Ok(ExitCode::from(1)),
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::from(1))
            }
        },
    }
}

/// 로그 초기화 (TUI는 RUST_LOG가 없으면 끔: 대체 화면이 깨지지 않도록)
fn init_logging(tui: bool) {
    let default_filter = if tui { "off" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_tui(config: Config, archive: Option<PathBuf>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(LocalEngine::new(), config);
    if let Some(path) = archive {
        app.open_archive(&path);
    }

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<LocalEngine>) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // 작업 중에는 진행률 갱신을 위해 짧게 대기
        let poll_timeout = if app.is_busy() {
            Duration::from_millis(30)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.modifiers, key.code);
                }
            }
        }

        app.poll();

        if app.should_quit() {
            break;
        }
    }

    // 중지 요청한 작업이 압축 파일을 정리할 때까지 대기
    while app.is_busy() {
        app.poll();
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}

fn render(f: &mut Frame<'_>, app: &mut App<LocalEngine>) {
    let size = f.area();
    app.update_layout(size);

    match app.layout.mode() {
        LayoutMode::TooSmall => {
            let (width, height) = app.layout.terminal_size();
            let warning = WarningScreen::new(app.theme()).current_size(width, height);
            f.render_widget(warning, size);
        }
        LayoutMode::WithTree | LayoutMode::ListOnly => render_main_ui(f, app),
    }
}

/// 메인 UI 렌더링
fn render_main_ui(f: &mut Frame<'_>, app: &App<LocalEngine>) {
    let areas = app.layout.areas();
    let theme = app.theme();
    let navigator = app.session().navigator();
    let snapshot = navigator.snapshot();
    let flat = app.view_mode() == ViewMode::Flat;

    let title = Paragraph::new(format!(" {}", app.title())).style(
        Style::default()
            .fg(theme.title_bar_fg.to_color())
            .bg(theme.title_bar_bg.to_color()),
    );
    f.render_widget(title, areas.title_bar);

    if app.layout.mode() == LayoutMode::WithTree {
        let root_label = app.archive_name().unwrap_or_else(|| "/".to_string());
        let tree = DirTree::new(snapshot, theme)
            .current(navigator.current_dir())
            .root_label(&root_label)
            .focused(app.is_tree_focused() && !app.is_dialog_active());
        f.render_widget(tree, areas.tree_pane);
    }

    let list_title = if flat {
        "All files".to_string()
    } else {
        format!("/{}", navigator.current_path())
    };
    let placeholder = if app.is_busy() {
        app.activity().message.as_str()
    } else {
        "No archive open. Press o to open or n to create one."
    };
    let list = FileList::new(app.rows(), snapshot)
        .title(&list_title)
        .flat(flat)
        .cursor(app.cursor())
        .scroll_offset(app.scroll_offset())
        .marked(app.marked())
        .placeholder(placeholder)
        .active(!app.is_dialog_active() && !app.is_tree_focused())
        .theme(theme);
    f.render_widget(list, areas.list_pane);

    let (file_count, dir_count, total_size) = snapshot
        .map(|s| (s.file_count(), s.dir_count(), s.total_size()))
        .unwrap_or((0, 0, 0));
    let total_size = format_file_size(total_size);
    let activity = app.activity();
    let message = app
        .toast_display()
        .unwrap_or(activity.message.as_str());
    let status_bar = StatusBar::new()
        .counts(file_count, dir_count)
        .total_size(&total_size)
        .marked_count(app.marked().len())
        .progress(activity.action.map(|_| activity.fraction))
        .message(message)
        .view_mode(app.view_mode().label())
        .theme(theme);
    f.render_widget(status_bar, areas.status_bar);

    let command_bar = CommandBar::new(app.command_items()).theme(theme);
    f.render_widget(command_bar, areas.command_bar);

    if let Some(ref dialog_kind) = app.dialog {
        let dialog = Dialog::new(dialog_kind, theme);
        f.render_widget(dialog, f.area());
    }
}
