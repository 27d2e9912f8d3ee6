//! 명령줄 모드
//!
//! 인자가 없거나 압축 파일만 주어지면 TUI를 띄우고, 추가/해제 옵션이
//! 있으면 화면 없이 한 번 실행하고 끝냅니다.

use crate::app::{ArchiveSession, SessionNotice};
use crate::config::Config;
use crate::core::dispatcher::Command;
use crate::core::navigation::ViewMode;
use crate::system::LocalEngine;
use crate::utils::error::{ArchiverError, Result};
use crate::utils::formatter::{format_percent, pluralize};
use clap::{ArgAction, ArgGroup, Parser};
use dialoguer::{Confirm, Input, Password};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 실행 인자
#[derive(Debug, Clone, Parser)]
#[command(
    name = "boksl-archiver",
    version,
    about = "Browse and edit archive files",
    disable_help_flag = true
)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
pub struct LaunchConfig {
    /// 압축 파일 (추가 모드에서는 추가할 파일)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// 파일을 ARCHIVE에 추가 (없으면 새로 만듦)
    #[arg(short = 'a', long = "add-to", value_name = "ARCHIVE", group = "mode")]
    pub add_to: Option<PathBuf>,

    /// 압축 파일 이름을 물어본 뒤 파일 추가
    #[arg(short = 'd', long = "add", group = "mode")]
    pub add: bool,

    /// 압축 파일을 FOLDER에 해제
    #[arg(short = 'e', long = "extract-to", value_name = "FOLDER", group = "mode")]
    pub extract_to: Option<PathBuf>,

    /// 해제 폴더를 물어본 뒤 해제
    #[arg(short = 'f', long = "extract", group = "mode")]
    pub extract: bool,

    /// 압축 파일 옆에 해제
    #[arg(short = 'h', long = "extract-here", group = "mode")]
    pub extract_here: bool,

    /// 상대 경로와 물어보는 폴더의 기준
    #[arg(long = "default-dir", value_name = "FOLDER")]
    pub default_dir: Option<PathBuf>,

    /// 해제 폴더가 없으면 묻지 않고 만듦
    #[arg(long)]
    pub force: bool,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

/// 실행 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// TUI (첫 번째 압축 파일을 엶)
    Browse(Option<PathBuf>),
    AddTo {
        archive: PathBuf,
        files: Vec<PathBuf>,
    },
    Add {
        files: Vec<PathBuf>,
    },
    ExtractTo {
        dest: PathBuf,
        archives: Vec<PathBuf>,
    },
    Extract {
        archives: Vec<PathBuf>,
    },
    ExtractHere {
        archives: Vec<PathBuf>,
    },
}

impl LaunchConfig {
    pub fn mode(&self) -> LaunchMode {
        let paths = self.paths.clone();
        if let Some(archive) = &self.add_to {
            LaunchMode::AddTo {
                archive: archive.clone(),
                files: paths,
            }
        } else if self.add {
            LaunchMode::Add { files: paths }
        } else if let Some(dest) = &self.extract_to {
            LaunchMode::ExtractTo {
                dest: dest.clone(),
                archives: paths,
            }
        } else if self.extract {
            LaunchMode::Extract { archives: paths }
        } else if self.extract_here {
            LaunchMode::ExtractHere { archives: paths }
        } else {
            LaunchMode::Browse(paths.into_iter().next())
        }
    }
}

/// 한 번 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliOutcome {
    Done,
    /// 사용자가 입력을 취소함
    Cancelled,
}

/// 화면 없는 실행 (TUI 모드는 호출하지 않음)
pub fn run(mode: LaunchMode, config: &Config, force: bool) -> Result<CliOutcome> {
    let mut runner = Runner::new(config, force);
    match mode {
        LaunchMode::Browse(_) => Err(ArchiverError::InvalidArguments(
            "no one-shot operation given".to_string(),
        )),
        LaunchMode::AddTo { archive, files } => runner.add_to(&archive, files),
        LaunchMode::Add { files } => {
            require_paths(&files, "no files to add")?;
            let Some(archive) = runner.ask_path("Archive to create or update", None)? else {
                return Ok(CliOutcome::Cancelled);
            };
            runner.add_to(&archive, files)
        }
        LaunchMode::ExtractTo { dest, archives } => runner.extract_to(&dest, &archives),
        LaunchMode::Extract { archives } => {
            require_paths(&archives, "no archives to extract")?;
            let initial = runner.default_dir.clone();
            let Some(dest) = runner.ask_path("Extract to folder", initial)? else {
                return Ok(CliOutcome::Cancelled);
            };
            runner.extract_to(&dest, &archives)
        }
        LaunchMode::ExtractHere { archives } => runner.extract_here(&archives),
    }
}

fn require_paths(paths: &[PathBuf], message: &str) -> Result<()> {
    if paths.is_empty() {
        return Err(ArchiverError::InvalidArguments(message.to_string()));
    }
    Ok(())
}

struct Runner {
    session: ArchiveSession<LocalEngine>,
    default_dir: Option<PathBuf>,
    force: bool,
}

impl Runner {
    fn new(config: &Config, force: bool) -> Self {
        let session = ArchiveSession::new(LocalEngine::new(), ViewMode::Tree)
            .with_compression(config.compression)
            .with_overwrite(config.overwrite_on_extract);
        Self {
            session,
            default_dir: config.default_dir.clone(),
            force,
        }
    }

    fn add_to(&mut self, archive: &Path, files: Vec<PathBuf>) -> Result<CliOutcome> {
        require_paths(&files, "no files to add")?;
        let archive = self.resolve(archive);
        if archive.exists() {
            self.execute(Command::Open { path: archive })?;
            self.execute(Command::AddFiles { paths: files })?;
        } else {
            self.execute(Command::Create {
                path: archive,
                queued: files,
            })?;
        }
        Ok(CliOutcome::Done)
    }

    fn extract_to(&mut self, dest: &Path, archives: &[PathBuf]) -> Result<CliOutcome> {
        require_paths(archives, "no archives to extract")?;
        let dest = self.resolve(dest);
        if !self.ensure_destination(&dest)? {
            return Ok(CliOutcome::Cancelled);
        }
        for archive in archives {
            self.execute(Command::Open {
                path: self.resolve(archive),
            })?;
            let password = self.ask_password_if_needed(archive)?;
            self.execute(Command::Extract {
                dest: dest.clone(),
                selection: Vec::new(),
                password,
            })?;
        }
        Ok(CliOutcome::Done)
    }

    fn extract_here(&mut self, archives: &[PathBuf]) -> Result<CliOutcome> {
        require_paths(archives, "no archives to extract")?;
        for archive in archives {
            self.execute(Command::Open {
                path: self.resolve(archive),
            })?;
            let password = self.ask_password_if_needed(archive)?;
            self.execute(Command::ExtractHere { password })?;
        }
        Ok(CliOutcome::Done)
    }

    /// 명령 시작 후 후속 작업까지 모두 끝날 때까지 대기
    fn execute(&mut self, command: Command) -> Result<()> {
        debug!("cli command: {:?}", command);
        self.session.execute(command)?;
        let mut failure = None;
        let mut current = None;
        loop {
            for notice in self.session.pump() {
                match notice {
                    SessionNotice::Started(action) => current = Some(action),
                    SessionNotice::Progress(fraction) => {
                        if let Some(action) = current {
                            eprint!("\r{}: {}", action, format_percent(fraction));
                        }
                    }
                    SessionNotice::Completed { action, summary } => {
                        eprintln!(
                            "\r{}: {} done",
                            action,
                            pluralize(summary.items_processed, "item", "items")
                        );
                    }
                    SessionNotice::Error { action, message } => {
                        failure.get_or_insert(ArchiverError::OperationFailed { action, message });
                    }
                    _ => {}
                }
            }
            if !self.session.is_busy() {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.default_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 해제 폴더 준비 (없으면 만들지 물어봄)
    fn ensure_destination(&self, dest: &Path) -> Result<bool> {
        if dest.is_dir() {
            return Ok(true);
        }
        if !self.force {
            let answer = Confirm::new()
                .with_prompt(format!("Folder {} does not exist. Create it?", dest.display()))
                .default(true)
                .interact_opt()
                .map_err(|dialoguer::Error::IO(e)| e)?;
            if answer != Some(true) {
                return Ok(false);
            }
        }
        fs::create_dir_all(dest)?;
        Ok(true)
    }

    /// 경로 입력 (빈 입력은 취소)
    fn ask_path(&self, prompt: &str, initial: Option<PathBuf>) -> Result<Option<PathBuf>> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial.display().to_string());
        }
        let value = input.interact_text().map_err(|dialoguer::Error::IO(e)| e)?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.resolve(Path::new(value))))
    }

    fn ask_password_if_needed(&self, archive: &Path) -> Result<Option<String>> {
        if !self.session.requires_password() {
            return Ok(None);
        }
        let password = Password::new()
            .with_prompt(format!("Password for {}", archive.display()))
            .allow_empty_password(true)
            .interact()
            .map_err(|dialoguer::Error::IO(e)| e)?;
        Ok(Some(password).filter(|p| !p.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::archive::list_entries;
    use crate::system::engine::ArchiveEngine;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> LaunchConfig {
        LaunchConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_mode_browse_takes_first_archive() {
        let launch = parse(&["boksl-archiver", "a.zip", "b.zip"]);
        assert_eq!(launch.mode(), LaunchMode::Browse(Some(PathBuf::from("a.zip"))));
        assert_eq!(parse(&["boksl-archiver"]).mode(), LaunchMode::Browse(None));
    }

    #[test]
    fn test_mode_add_to_and_extract_here() {
        let launch = parse(&["boksl-archiver", "-a", "out.zip", "x.txt", "y.txt"]);
        assert_eq!(
            launch.mode(),
            LaunchMode::AddTo {
                archive: PathBuf::from("out.zip"),
                files: vec![PathBuf::from("x.txt"), PathBuf::from("y.txt")],
            }
        );

        let launch = parse(&["boksl-archiver", "-h", "a.zip"]);
        assert_eq!(
            launch.mode(),
            LaunchMode::ExtractHere {
                archives: vec![PathBuf::from("a.zip")],
            }
        );
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(LaunchConfig::try_parse_from(["boksl-archiver", "-f", "-h", "a.zip"]).is_err());
        assert!(LaunchConfig::try_parse_from(["boksl-archiver", "--help"]).is_err());
    }

    #[test]
    fn test_add_to_creates_archive_then_extract_with_force() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("note.txt");
        fs::write(&source, "memo").unwrap();
        let archive = temp.path().join("new.zip");
        let config = Config::default();

        let outcome = run(
            LaunchMode::AddTo {
                archive: archive.clone(),
                files: vec![source],
            },
            &config,
            false,
        )
        .unwrap();
        assert_eq!(outcome, CliOutcome::Done);
        let entries = list_entries(&archive, None).unwrap();
        assert!(entries.iter().any(|e| e.path == "note.txt"));

        let dest = temp.path().join("out/inner");
        let outcome = run(
            LaunchMode::ExtractTo {
                dest: dest.clone(),
                archives: vec![archive],
            },
            &config,
            true,
        )
        .unwrap();
        assert_eq!(outcome, CliOutcome::Done);
        assert_eq!(fs::read_to_string(dest.join("note.txt")).unwrap(), "memo");
    }

    #[test]
    fn test_missing_archive_reports_error() {
        let temp = TempDir::new().unwrap();
        let mut runner = Runner::new(&Config::default(), true);
        let result = runner.extract_here(&[temp.path().join("missing.zip")]);
        assert!(result.is_err());
        assert!(!runner.session.engine().is_loaded());
    }

    #[test]
    fn test_relative_paths_use_default_dir() {
        let config = Config {
            default_dir: Some(PathBuf::from("/data")),
            ..Config::default()
        };
        let runner = Runner::new(&config, false);
        assert_eq!(runner.resolve(Path::new("a.zip")), PathBuf::from("/data/a.zip"));
        assert_eq!(runner.resolve(Path::new("/tmp/a.zip")), PathBuf::from("/tmp/a.zip"));
    }

    #[test]
    fn test_one_shot_modes_need_paths() {
        let result = run(
            LaunchMode::ExtractHere {
                archives: Vec::new(),
            },
            &Config::default(),
            false,
        );
        assert!(matches!(result, Err(ArchiverError::InvalidArguments(_))));
    }
}
