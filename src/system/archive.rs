//! 압축 파일 형식 계층
//!
//! zip/jar/war, tar, tar.gz, tar.zst, 7z 목록 읽기와 해제, 검사.
//! 7z를 제외한 형식은 항목 추가/삭제도 지원하며, 편집은 항상 같은 폴더의
//! 임시 파일에 새로 쓴 뒤 원본 자리로 옮깁니다.

use crate::models::archive_entry::ArchiveEntry;
use crate::models::operation::{AddOptions, ArchiveSummary, CompressionLevel, ExtractOptions};
use crate::utils::error::{ArchiverError, Result};
use chrono::{Local, NaiveDate};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use sevenz_rust2::Error as SevenZError;
use sevenz_rust2::Password as SevenZPassword;
use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tar::{Archive as TarArchive, Builder as TarBuilder};
use zip::result::ZipError;
use zip::write::SimpleFileOptions as ZipFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};
use zstd::stream::read::Decoder as ZstdDecoder;
use zstd::stream::write::Encoder as ZstdEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarZst,
    SevenZ,
    Jar,
    War,
}

impl ArchiveFormat {
    /// 생성/추가/삭제 가능 여부
    pub fn supports_editing(&self) -> bool {
        !matches!(self, ArchiveFormat::SevenZ)
    }

    fn is_zip_like(&self) -> bool {
        matches!(
            self,
            ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War
        )
    }
}

/// 항목 단위 진행 이벤트
#[derive(Debug, Clone)]
pub struct ArchiveProgressEvent {
    pub current_file: String,
    pub items_processed: usize,
    pub total_items: usize,
    pub fraction: f64,
}

/// 진행 보고 채널 + 취소 플래그
#[derive(Debug, Clone)]
pub struct OperationControl {
    progress_tx: Sender<ArchiveProgressEvent>,
    cancel_flag: Arc<AtomicBool>,
}

impl OperationControl {
    pub fn new(progress_tx: Sender<ArchiveProgressEvent>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            progress_tx,
            cancel_flag,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ArchiverError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn report(&self, current_file: &str, summary: &ArchiveSummary) {
        let _ = self.progress_tx.send(ArchiveProgressEvent {
            current_file: current_file.to_string(),
            items_processed: summary.items_processed,
            total_items: summary.total_items,
            fraction: summary.fraction(),
        });
    }
}

/// 해제 요청 (선택이 비어 있으면 전체)
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractRequest {
    pub archive_path: PathBuf,
    pub dest_dir: PathBuf,
    pub selection: Vec<String>,
    /// 선택 항목 경로에서 제거할 접두 디렉토리
    pub base_dir: String,
    pub options: ExtractOptions,
}

impl ArchiveExtractRequest {
    pub fn all(archive_path: &Path, dest_dir: &Path, options: ExtractOptions) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            options,
            ..Self::default()
        }
    }

    fn selects(&self, entry_name: &str) -> bool {
        self.selection.is_empty() || is_selected(&self.selection, entry_name)
    }

    /// 항목의 해제 위치 결정
    fn target(&self, entry_name: &str, is_dir: bool) -> ExtractTarget {
        let name = normalize_entry_name(entry_name);
        if name.is_empty() || !self.selects(&name) {
            return ExtractTarget::Skip;
        }

        let relative = if self.options.junk_paths {
            if is_dir {
                return ExtractTarget::Skip;
            }
            name.rsplit('/').next().unwrap_or_default()
        } else {
            let base = normalize_entry_name(&self.base_dir);
            if base.is_empty() {
                name.as_str()
            } else {
                name.strip_prefix(&format!("{}/", base))
                    .unwrap_or(name.as_str())
            }
        };
        if relative.is_empty() {
            return ExtractTarget::Skip;
        }

        match sanitize_extract_path(&self.dest_dir, Path::new(relative)) {
            Some(path) => ExtractTarget::Write(path),
            None => ExtractTarget::Blocked,
        }
    }
}

enum ExtractTarget {
    Skip,
    Blocked,
    Write(PathBuf),
}

/// 오류 분류용 작업 단계
#[derive(Debug, Clone, Copy)]
enum Stage {
    List,
    Create,
    Add,
    Remove,
    Extract,
    Test,
}

impl Stage {
    fn failure(self, path: &Path, reason: impl fmt::Display) -> ArchiverError {
        let path = path.to_path_buf();
        let reason = reason.to_string();
        match self {
            Stage::List => ArchiverError::ArchiveListFailed { path, reason },
            Stage::Create => ArchiverError::ArchiveCreateFailed { path, reason },
            Stage::Add => ArchiverError::ArchiveAddFailed { path, reason },
            Stage::Remove => ArchiverError::ArchiveRemoveFailed { path, reason },
            Stage::Extract => ArchiverError::ArchiveExtractFailed { path, reason },
            Stage::Test => ArchiverError::ArchiveTestFailed { path, reason },
        }
    }
}

#[derive(Debug, Clone)]
struct ArchiveSourceItem {
    source_path: PathBuf,
    archive_name: String,
    is_dir: bool,
    size: u64,
}

pub fn detect_archive_format(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return Some(ArchiveFormat::TarGz);
    }
    if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
        return Some(ArchiveFormat::TarZst);
    }
    match path
        .extension()
        .and_then(OsStr::to_str)?
        .to_lowercase()
        .as_str()
    {
        "zip" => Some(ArchiveFormat::Zip),
        "tar" => Some(ArchiveFormat::Tar),
        "7z" => Some(ArchiveFormat::SevenZ),
        "jar" => Some(ArchiveFormat::Jar),
        "war" => Some(ArchiveFormat::War),
        _ => None,
    }
}

fn require_format(path: &Path) -> Result<ArchiveFormat> {
    detect_archive_format(path).ok_or_else(|| ArchiverError::ArchiveUnsupportedFormat {
        path: path.to_path_buf(),
    })
}

fn require_editable(path: &Path, operation: &'static str) -> Result<ArchiveFormat> {
    let format = require_format(path)?;
    if !format.supports_editing() {
        return Err(ArchiverError::ArchiveUnsupportedOperation {
            path: path.to_path_buf(),
            operation,
        });
    }
    Ok(format)
}

/// 항목 목록 읽기
///
/// zip은 암호 없이도 목록을 읽습니다. 7z는 헤더가 암호화된 경우 암호가 필요합니다.
pub fn list_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    match require_format(path)? {
        ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War => list_zip_entries(path),
        format @ (ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarZst) => {
            let reader = open_tar_reader(path, format)?;
            list_tar_like_entries(TarArchive::new(reader), path)
        }
        ArchiveFormat::SevenZ => list_7z_entries(path, password),
    }
}

/// 빈 압축 파일 생성
pub fn create_empty(path: &Path) -> Result<()> {
    let format = require_editable(path, "Creating archives")?;
    if path.exists() {
        return Err(Stage::Create.failure(path, "Destination archive already exists"));
    }

    let result = if format.is_zip_like() {
        File::create(path)
            .map_err(ArchiverError::Io)
            .and_then(|file| {
                ZipWriter::new(file)
                    .finish()
                    .map(|_| ())
                    .map_err(|e| Stage::Create.failure(path, e))
            })
    } else {
        TarSink::create(path, format, CompressionLevel::Normal).and_then(|sink| {
            TarBuilder::new(sink)
                .into_inner()
                .and_then(TarSink::finish)
                .map_err(|e| Stage::Create.failure(path, e))
        })
    };

    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

/// 로컬 파일/폴더를 `base_dir` 아래에 추가 (같은 이름 항목은 교체)
pub fn add_entries(
    archive_path: &Path,
    sources: &[PathBuf],
    base_dir: &str,
    options: &AddOptions,
    control: &OperationControl,
) -> Result<ArchiveSummary> {
    let format = require_editable(archive_path, "Adding files")?;
    if sources.is_empty() {
        return Err(Stage::Add.failure(archive_path, "No source selected"));
    }

    let temp_path = temp_sibling(archive_path);
    let prefix = normalize_entry_name(base_dir);
    let items = collect_source_items(sources, &prefix, &[archive_path, temp_path.as_path()])?;
    let replaced: HashSet<String> = items.iter().map(|i| i.archive_name.clone()).collect();
    let total_bytes = items.iter().map(|i| i.size).sum::<u64>();
    let mut summary = ArchiveSummary::new(items.len(), total_bytes);
    control.report("", &summary);

    let keep = |name: &str| !replaced.contains(name);
    let result = if format.is_zip_like() {
        rewrite_zip(
            archive_path,
            &temp_path,
            Stage::Add,
            keep,
            |writer| append_zip_items(writer, &items, options, control, &mut summary),
            control,
        )
    } else {
        rewrite_tar(
            archive_path,
            &temp_path,
            format,
            options.compression,
            Stage::Add,
            keep,
            |builder| append_tar_items(builder, &items, control, &mut summary),
            control,
        )
    };
    commit_rewrite(archive_path, &temp_path, result)?;
    debug!(
        "added {} item(s) to {}",
        summary.items_processed,
        archive_path.display()
    );
    Ok(summary)
}

/// 항목 삭제 (디렉토리 경로는 하위 항목 전체)
pub fn remove_entries(
    archive_path: &Path,
    paths: &[String],
    control: &OperationControl,
) -> Result<ArchiveSummary> {
    let format = require_editable(archive_path, "Deleting files")?;
    let selection: Vec<String> = paths
        .iter()
        .map(|p| normalize_entry_name(p))
        .filter(|p| !p.is_empty())
        .collect();
    if selection.is_empty() {
        return Err(Stage::Remove.failure(archive_path, "No entry selected"));
    }

    let temp_path = temp_sibling(archive_path);
    let keep = |name: &str| !is_selected(&selection, name);
    let result = if format.is_zip_like() {
        rewrite_zip(
            archive_path,
            &temp_path,
            Stage::Remove,
            keep,
            |_| Ok(()),
            control,
        )
    } else {
        rewrite_tar(
            archive_path,
            &temp_path,
            format,
            CompressionLevel::Normal,
            Stage::Remove,
            keep,
            |_| Ok(()),
            control,
        )
    };
    let removed = commit_rewrite(archive_path, &temp_path, result)?;

    let mut summary = ArchiveSummary::new(removed, 0);
    summary.items_processed = removed;
    control.report("", &summary);
    Ok(summary)
}

/// 해제
pub fn extract_archive(
    request: &ArchiveExtractRequest,
    control: &OperationControl,
) -> Result<ArchiveSummary> {
    let format = require_format(&request.archive_path)?;
    if !request.dest_dir.is_dir() {
        return Err(Stage::Extract.failure(
            &request.archive_path,
            format!(
                "Destination directory does not exist: {}",
                request.dest_dir.display()
            ),
        ));
    }

    let password = request.options.password.as_deref();
    let list = list_entries(&request.archive_path, password)?;
    let selected: Vec<&ArchiveEntry> = list.iter().filter(|e| request.selects(&e.path)).collect();
    let total_bytes = selected.iter().map(|e| e.size).sum::<u64>();
    let mut summary = ArchiveSummary::new(selected.len(), total_bytes);
    control.report("", &summary);

    match format {
        ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War => {
            extract_zip_archive(request, control, &mut summary)?
        }
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarZst => {
            let reader = open_tar_reader(&request.archive_path, format)?;
            extract_tar_like_archive(TarArchive::new(reader), request, control, &mut summary)?
        }
        ArchiveFormat::SevenZ => extract_7z_archive(request, control, &mut summary)?,
    }
    Ok(summary)
}

/// 무결성 검사 (모든 항목을 끝까지 읽음)
pub fn test_archive(
    path: &Path,
    password: Option<&str>,
    control: &OperationControl,
) -> Result<ArchiveSummary> {
    let format = require_format(path)?;
    let list = list_entries(path, password)?;
    let files = list.iter().filter(|e| !e.is_dir).count();
    let total_bytes = list.iter().map(|e| e.size).sum::<u64>();
    let mut summary = ArchiveSummary::new(files, total_bytes);
    control.report("", &summary);

    match format {
        ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War => {
            test_zip_archive(path, password, control, &mut summary)?
        }
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarZst => {
            let reader = open_tar_reader(path, format)?;
            test_tar_like_archive(TarArchive::new(reader), path, control, &mut summary)?
        }
        ArchiveFormat::SevenZ => test_7z_archive(path, password, control, &mut summary)?,
    }
    Ok(summary)
}

/// 압축 파일 옆 해제 위치
///
/// 최상위 항목이 디렉토리 하나뿐이면 압축 파일이 있는 폴더, 아니면
/// 압축 파일 이름의 하위 폴더 (이미 있으면 "_(n)" 접미사).
pub fn extract_here_destination(archive_path: &Path, entries: &[ArchiveEntry]) -> PathBuf {
    let parent = archive_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    if detect_single_root_dir(entries).is_some() {
        parent
    } else {
        next_unique_extract_dir(&parent, &auto_extract_base_name(archive_path))
    }
}

pub fn detect_single_root_dir(entries: &[ArchiveEntry]) -> Option<String> {
    let mut top_levels = BTreeSet::new();
    for entry in entries {
        let normalized = normalize_entry_name(&entry.path);
        if let Some(first) = normalized.split('/').next().filter(|s| !s.is_empty()) {
            top_levels.insert(first.to_string());
        }
    }

    if top_levels.len() != 1 {
        return None;
    }
    let root = top_levels.into_iter().next()?;

    let nested_prefix = format!("{}/", root);
    let is_directory = entries.iter().any(|entry| {
        let normalized = normalize_entry_name(&entry.path);
        normalized.starts_with(&nested_prefix) || (entry.is_dir && normalized == root)
    });
    is_directory.then_some(root)
}

pub fn auto_extract_base_name(archive_path: &Path) -> String {
    let file_name = archive_path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("archive")
        .to_string();
    let lower = file_name.to_ascii_lowercase();

    let suffixes = [
        ".tar.gz", ".tar.zst", ".tgz", ".tzst", ".zip", ".7z", ".jar", ".war", ".tar",
    ];
    for suffix in suffixes {
        if lower.ends_with(suffix) && file_name.len() > suffix.len() {
            let base = &file_name[..file_name.len() - suffix.len()];
            if !base.trim().is_empty() {
                return base.to_string();
            }
        }
    }

    archive_path
        .file_stem()
        .and_then(OsStr::to_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("archive")
        .to_string()
}

fn next_unique_extract_dir(base_dir: &Path, desired_name: &str) -> PathBuf {
    let seed = desired_name.trim();
    let base_name = if seed.is_empty() { "archive" } else { seed };
    let mut index = 0usize;
    loop {
        let name = if index == 0 {
            base_name.to_string()
        } else {
            format!("{}_({})", base_name, index)
        };
        let candidate = base_dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

fn collect_source_items(
    sources: &[PathBuf],
    prefix: &str,
    excluded: &[&Path],
) -> Result<Vec<ArchiveSourceItem>> {
    let mut items = Vec::new();
    for source in sources {
        let name = source
            .file_name()
            .ok_or_else(|| Stage::Add.failure(source, "Invalid source name"))?
            .to_string_lossy();
        let archive_name = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        };
        collect_source_item_recursive(source, archive_name, excluded, &mut items)?;
    }
    Ok(items)
}

fn collect_source_item_recursive(
    source_path: &Path,
    archive_name: String,
    excluded: &[&Path],
    out: &mut Vec<ArchiveSourceItem>,
) -> Result<()> {
    if excluded.iter().any(|p| *p == source_path) {
        return Ok(());
    }
    let meta = fs::symlink_metadata(source_path)?;
    if meta.is_dir() {
        out.push(ArchiveSourceItem {
            source_path: source_path.to_path_buf(),
            archive_name: archive_name.clone(),
            is_dir: true,
            size: 0,
        });
        for entry in fs::read_dir(source_path)? {
            let entry = entry?;
            let child_name = format!("{}/{}", archive_name, entry.file_name().to_string_lossy());
            collect_source_item_recursive(&entry.path(), child_name, excluded, out)?;
        }
    } else {
        out.push(ArchiveSourceItem {
            source_path: source_path.to_path_buf(),
            archive_name,
            is_dir: false,
            size: meta.len(),
        });
    }
    Ok(())
}

fn archive_display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(v) => Some(v.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/").trim_matches('/').to_string()
}

/// 선택 경로 자체이거나 그 하위 항목인지
fn is_selected(selection: &[String], entry_name: &str) -> bool {
    let normalized = normalize_entry_name(entry_name);
    selection.iter().any(|item| {
        let item = normalize_entry_name(item);
        !item.is_empty()
            && (normalized == item
                || normalized
                    .strip_prefix(item.as_str())
                    .is_some_and(|rest| rest.starts_with('/')))
    })
}

/// 같은 폴더의 임시 파일 경로
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("archive");
    path.with_file_name(format!(".{}.{}.partial", name, std::process::id()))
}

fn commit_rewrite<T>(archive_path: &Path, temp_path: &Path, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Err(e) = fs::rename(temp_path, archive_path) {
                let _ = fs::remove_file(temp_path);
                return Err(ArchiverError::Io(e));
            }
            Ok(value)
        }
        Err(e) => {
            let _ = fs::remove_file(temp_path);
            Err(e)
        }
    }
}

/// 해제 대상 위치 준비
///
/// 이미 있는 디렉토리에 디렉토리 항목이면 Ok(false) (건너뜀).
fn prepare_destination(
    dest_path: &Path,
    is_dir: bool,
    overwrite: bool,
) -> std::result::Result<bool, String> {
    if !dest_path.exists() {
        return Ok(true);
    }
    if is_dir && dest_path.is_dir() {
        return Ok(false);
    }
    if !overwrite {
        return Err("destination exists".to_string());
    }
    let removed = if dest_path.is_dir() {
        fs::remove_dir_all(dest_path)
    } else {
        fs::remove_file(dest_path)
    };
    removed.map(|_| true).map_err(|e| e.to_string())
}

fn map_zip_error(path: &Path, error: ZipError, password: Option<&str>, stage: Stage) -> ArchiverError {
    match error {
        ZipError::UnsupportedArchive(detail)
            if detail == ZipError::PASSWORD_REQUIRED && password.is_none() =>
        {
            ArchiverError::ArchivePasswordRequired {
                path: path.to_path_buf(),
            }
        }
        ZipError::InvalidPassword => ArchiverError::ArchiveInvalidPassword {
            path: path.to_path_buf(),
            reason: "Invalid ZIP password".to_string(),
        },
        ZipError::UnsupportedArchive(detail)
            if password.is_some() && detail.to_ascii_lowercase().contains("password") =>
        {
            ArchiverError::ArchiveInvalidPassword {
                path: path.to_path_buf(),
                reason: detail.to_string(),
            }
        }
        other => stage.failure(path, other),
    }
}

fn map_7z_error(path: &Path, error: SevenZError, password: Option<&str>, stage: Stage) -> ArchiverError {
    match error {
        SevenZError::PasswordRequired if password.is_none() => {
            ArchiverError::ArchivePasswordRequired {
                path: path.to_path_buf(),
            }
        }
        SevenZError::PasswordRequired => ArchiverError::ArchiveInvalidPassword {
            path: path.to_path_buf(),
            reason: "Password required".to_string(),
        },
        SevenZError::MaybeBadPassword(inner) => ArchiverError::ArchiveInvalidPassword {
            path: path.to_path_buf(),
            reason: inner.to_string(),
        },
        other => {
            let reason = other.to_string();
            if password.is_some() && reason.to_ascii_lowercase().contains("password") {
                ArchiverError::ArchiveInvalidPassword {
                    path: path.to_path_buf(),
                    reason,
                }
            } else {
                stage.failure(path, reason)
            }
        }
    }
}

/// zip 수정 시간을 Unix timestamp로 (로컬 시간 기준)
fn zip_time_to_unix(time: zip::DateTime) -> i64 {
    NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(time.hour()),
            u32::from(time.minute()),
            u32::from(time.second()),
        )
    })
    .and_then(|naive| naive.and_local_timezone(Local).earliest())
    .map(|local| local.timestamp())
    .unwrap_or(0)
}

/// tar 계열 출력 스트림
enum TarSink {
    Plain(File),
    Gzip(GzEncoder<File>),
    Zstd(ZstdEncoder<'static, File>),
}

impl TarSink {
    fn create(path: &Path, format: ArchiveFormat, level: CompressionLevel) -> Result<Self> {
        let file = File::create(path)?;
        Ok(match format {
            ArchiveFormat::TarGz => {
                TarSink::Gzip(GzEncoder::new(file, Compression::new(level.deflate_level())))
            }
            ArchiveFormat::TarZst => TarSink::Zstd(ZstdEncoder::new(file, level.zstd_level())?),
            _ => TarSink::Plain(file),
        })
    }

    fn finish(self) -> io::Result<()> {
        match self {
            TarSink::Plain(mut file) => file.flush(),
            TarSink::Gzip(encoder) => encoder.finish().map(|_| ()),
            TarSink::Zstd(encoder) => encoder.finish().map(|_| ()),
        }
    }
}

impl Write for TarSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TarSink::Plain(file) => file.write(buf),
            TarSink::Gzip(encoder) => encoder.write(buf),
            TarSink::Zstd(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TarSink::Plain(file) => file.flush(),
            TarSink::Gzip(encoder) => encoder.flush(),
            TarSink::Zstd(encoder) => encoder.flush(),
        }
    }
}

fn open_tar_reader(path: &Path, format: ArchiveFormat) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    Ok(match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveFormat::TarZst => Box::new(ZstdDecoder::new(file)?),
        _ => Box::new(file),
    })
}

/// zip 재작성: `keep`이 거부한 항목을 빼고 원본 그대로 복사한 뒤 `append` 실행
///
/// 반환값은 빠진 항목 수
fn rewrite_zip<K, A>(
    archive_path: &Path,
    temp_path: &Path,
    stage: Stage,
    keep: K,
    append: A,
    control: &OperationControl,
) -> Result<usize>
where
    K: Fn(&str) -> bool,
    A: FnOnce(&mut ZipWriter<File>) -> Result<()>,
{
    let file = File::open(archive_path)?;
    let mut source =
        ZipArchive::new(file).map_err(|e| map_zip_error(archive_path, e, None, stage))?;
    let mut writer = ZipWriter::new(File::create(temp_path)?);

    let mut dropped = 0usize;
    for idx in 0..source.len() {
        control.check_cancelled()?;
        let entry = source
            .by_index_raw(idx)
            .map_err(|e| map_zip_error(archive_path, e, None, stage))?;
        if !keep(&normalize_entry_name(entry.name())) {
            dropped += 1;
            continue;
        }
        writer
            .raw_copy_file(entry)
            .map_err(|e| stage.failure(archive_path, e))?;
    }

    append(&mut writer)?;
    writer
        .finish()
        .map_err(|e| stage.failure(archive_path, e))?;
    Ok(dropped)
}

fn append_zip_items(
    writer: &mut ZipWriter<File>,
    items: &[ArchiveSourceItem],
    options: &AddOptions,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    let mut file_options = ZipFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(i64::from(options.compression.deflate_level())));
    if let Some(pass) = options.password.as_deref() {
        file_options = file_options.with_aes_encryption(AesMode::Aes256, pass);
    }

    for item in items {
        control.check_cancelled()?;

        let result = if item.is_dir {
            writer
                .add_directory(format!("{}/", item.archive_name), file_options)
                .map_err(|e| e.to_string())
        } else {
            (|| -> std::result::Result<(), String> {
                writer
                    .start_file(item.archive_name.clone(), file_options)
                    .map_err(|e| e.to_string())?;
                let mut src = File::open(&item.source_path).map_err(|e| e.to_string())?;
                io::copy(&mut src, writer).map_err(|e| e.to_string())?;
                Ok(())
            })()
        };

        match result {
            Ok(()) => summary.record_success(),
            Err(e) => summary.record_failure(&item.archive_name, e),
        }
        control.report(&item.archive_name, summary);
    }
    Ok(())
}

/// tar 계열 재작성 (zip과 같은 규칙)
#[allow(clippy::too_many_arguments)]
fn rewrite_tar<K, A>(
    archive_path: &Path,
    temp_path: &Path,
    format: ArchiveFormat,
    level: CompressionLevel,
    stage: Stage,
    keep: K,
    append: A,
    control: &OperationControl,
) -> Result<usize>
where
    K: Fn(&str) -> bool,
    A: FnOnce(&mut TarBuilder<TarSink>) -> Result<()>,
{
    let mut source = TarArchive::new(open_tar_reader(archive_path, format)?);
    let mut builder = TarBuilder::new(TarSink::create(temp_path, format, level)?);

    let mut dropped = 0usize;
    for entry_result in source
        .entries()
        .map_err(|e| stage.failure(archive_path, e))?
    {
        control.check_cancelled()?;
        let mut entry = entry_result.map_err(|e| stage.failure(archive_path, e))?;
        let path = entry
            .path()
            .map_err(|e| stage.failure(archive_path, e))?
            .into_owned();
        if !keep(&archive_display_path(&path)) {
            dropped += 1;
            continue;
        }
        let mut header = entry.header().clone();
        builder
            .append_data(&mut header, &path, &mut entry)
            .map_err(|e| stage.failure(archive_path, e))?;
    }

    append(&mut builder)?;
    builder
        .into_inner()
        .and_then(TarSink::finish)
        .map_err(|e| stage.failure(archive_path, e))?;
    Ok(dropped)
}

fn append_tar_items(
    builder: &mut TarBuilder<TarSink>,
    items: &[ArchiveSourceItem],
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    for item in items {
        control.check_cancelled()?;

        let result = if item.is_dir {
            builder.append_dir(&item.archive_name, &item.source_path)
        } else {
            File::open(&item.source_path)
                .and_then(|mut src| builder.append_file(&item.archive_name, &mut src))
        };

        match result {
            Ok(()) => summary.record_success(),
            Err(e) => summary.record_failure(&item.archive_name, e),
        }
        control.report(&item.archive_name, summary);
    }
    Ok(())
}

fn extract_zip_archive(
    request: &ArchiveExtractRequest,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    let archive_path = &request.archive_path;
    let password = request.options.password.as_deref();
    let file = File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| map_zip_error(archive_path, e, password, Stage::Extract))?;

    for idx in 0..archive.len() {
        control.check_cancelled()?;

        let (name, is_dir, encrypted) = {
            let raw = archive
                .by_index_raw(idx)
                .map_err(|e| map_zip_error(archive_path, e, password, Stage::Extract))?;
            (raw.name().to_string(), raw.is_dir(), raw.encrypted())
        };
        let dest_path = match request.target(&name, is_dir) {
            ExtractTarget::Skip => continue,
            ExtractTarget::Blocked => {
                summary.record_failure(&name, "blocked unsafe path");
                continue;
            }
            ExtractTarget::Write(path) => path,
        };

        match prepare_destination(&dest_path, is_dir, request.options.overwrite) {
            Ok(true) => {}
            Ok(false) => {
                summary.record_success();
                continue;
            }
            Err(e) => {
                summary.record_failure(&name, e);
                continue;
            }
        }

        if is_dir {
            if let Err(e) = fs::create_dir_all(&dest_path) {
                summary.record_failure(&name, e);
                continue;
            }
        } else {
            let mut entry = match (encrypted, password) {
                (true, Some(pass)) => archive.by_index_decrypt(idx, pass.as_bytes()),
                _ => archive.by_index(idx),
            }
            .map_err(|e| map_zip_error(archive_path, e, password, Stage::Extract))?;

            if let Some(parent) = dest_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let written = File::create(&dest_path).and_then(|mut out| io::copy(&mut entry, &mut out));
            if let Err(e) = written {
                summary.record_failure(&name, e);
                continue;
            }
        }

        summary.record_success();
        control.report(&name, summary);
    }
    Ok(())
}

fn extract_tar_like_archive<R: Read>(
    mut archive: TarArchive<R>,
    request: &ArchiveExtractRequest,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    for entry_result in archive
        .entries()
        .map_err(|e| Stage::Extract.failure(&request.archive_path, e))?
    {
        control.check_cancelled()?;

        let mut entry = match entry_result {
            Ok(v) => v,
            Err(e) => {
                summary.record_failure("?", e);
                continue;
            }
        };
        let name = match entry.path() {
            Ok(v) => archive_display_path(&v),
            Err(e) => {
                summary.record_failure("?", e);
                continue;
            }
        };
        let is_dir = entry.header().entry_type().is_dir();
        let dest_path = match request.target(&name, is_dir) {
            ExtractTarget::Skip => continue,
            ExtractTarget::Blocked => {
                summary.record_failure(&name, "blocked unsafe path");
                continue;
            }
            ExtractTarget::Write(path) => path,
        };

        match prepare_destination(&dest_path, is_dir, request.options.overwrite) {
            Ok(true) => {}
            Ok(false) => {
                summary.record_success();
                continue;
            }
            Err(e) => {
                summary.record_failure(&name, e);
                continue;
            }
        }

        if let Some(parent) = dest_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match entry.unpack(&dest_path) {
            Ok(_) => summary.record_success(),
            Err(e) => summary.record_failure(&name, e),
        }
        control.report(&name, summary);
    }
    Ok(())
}

fn extract_7z_archive(
    request: &ArchiveExtractRequest,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    control.check_cancelled()?;

    let file = File::open(&request.archive_path)?;
    let mut extract_fn = |entry: &sevenz_rust2::SevenZArchiveEntry,
                          reader: &mut dyn Read,
                          _output_path: &PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        if control.is_cancelled() {
            return Ok(false);
        }

        let entry_name = entry.name.clone();
        let dest_path = match request.target(&entry_name, entry.is_directory) {
            ExtractTarget::Skip => {
                // 선택되지 않은 항목도 스트림은 소비
                let _ = io::copy(reader, &mut io::sink());
                return Ok(true);
            }
            ExtractTarget::Blocked => {
                summary.record_failure(&entry_name, "blocked unsafe path");
                return Ok(true);
            }
            ExtractTarget::Write(path) => path,
        };

        match prepare_destination(&dest_path, entry.is_directory, request.options.overwrite) {
            Ok(true) => {}
            Ok(false) => {
                summary.record_success();
                return Ok(true);
            }
            Err(e) => {
                summary.record_failure(&entry_name, e);
                return Ok(true);
            }
        }

        let written = if entry.is_directory {
            fs::create_dir_all(&dest_path)
        } else {
            if let Some(parent) = dest_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            File::create(&dest_path).and_then(|mut out| io::copy(reader, &mut out).map(|_| ()))
        };
        match written {
            Ok(()) => summary.record_success(),
            Err(e) => summary.record_failure(&entry_name, e),
        }
        control.report(&entry_name, summary);
        Ok(true)
    };

    let password = request.options.password.as_deref();
    let result = if let Some(password) = password {
        sevenz_rust2::decompress_with_extract_fn_and_password(
            file,
            &request.dest_dir,
            SevenZPassword::from(password),
            &mut extract_fn,
        )
    } else {
        sevenz_rust2::decompress_with_extract_fn(file, &request.dest_dir, &mut extract_fn)
    };

    result.map_err(|e| map_7z_error(&request.archive_path, e, password, Stage::Extract))?;
    control.check_cancelled()
}

fn test_zip_archive(
    path: &Path,
    password: Option<&str>,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| map_zip_error(path, e, password, Stage::Test))?;

    for idx in 0..archive.len() {
        control.check_cancelled()?;
        let (name, is_dir, encrypted) = {
            let raw = archive
                .by_index_raw(idx)
                .map_err(|e| map_zip_error(path, e, password, Stage::Test))?;
            (raw.name().to_string(), raw.is_dir(), raw.encrypted())
        };
        if is_dir {
            continue;
        }

        let mut entry = match (encrypted, password) {
            (true, Some(pass)) => archive.by_index_decrypt(idx, pass.as_bytes()),
            _ => archive.by_index(idx),
        }
        .map_err(|e| map_zip_error(path, e, password, Stage::Test))?;

        match io::copy(&mut entry, &mut io::sink()) {
            Ok(_) => summary.record_success(),
            Err(e) => summary.record_failure(&name, e),
        }
        control.report(&name, summary);
    }
    Ok(())
}

fn test_tar_like_archive<R: Read>(
    mut archive: TarArchive<R>,
    path: &Path,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    for entry_result in archive.entries().map_err(|e| Stage::Test.failure(path, e))? {
        control.check_cancelled()?;
        let mut entry = entry_result.map_err(|e| Stage::Test.failure(path, e))?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let name = entry
            .path()
            .map(|p| archive_display_path(&p))
            .unwrap_or_default();
        match io::copy(&mut entry, &mut io::sink()) {
            Ok(_) => summary.record_success(),
            Err(e) => summary.record_failure(&name, e),
        }
        control.report(&name, summary);
    }
    Ok(())
}

fn test_7z_archive(
    path: &Path,
    password: Option<&str>,
    control: &OperationControl,
    summary: &mut ArchiveSummary,
) -> Result<()> {
    let file = File::open(path)?;
    let scratch = std::env::temp_dir();
    let mut test_fn = |entry: &sevenz_rust2::SevenZArchiveEntry,
                       reader: &mut dyn Read,
                       _output_path: &PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        if control.is_cancelled() {
            return Ok(false);
        }
        if entry.is_directory {
            return Ok(true);
        }
        match io::copy(reader, &mut io::sink()) {
            Ok(_) => summary.record_success(),
            Err(e) => summary.record_failure(&entry.name, e),
        }
        control.report(&entry.name, summary);
        Ok(true)
    };

    let result = if let Some(pass) = password {
        sevenz_rust2::decompress_with_extract_fn_and_password(
            file,
            &scratch,
            SevenZPassword::from(pass),
            &mut test_fn,
        )
    } else {
        sevenz_rust2::decompress_with_extract_fn(file, &scratch, &mut test_fn)
    };
    result.map_err(|e| map_7z_error(path, e, password, Stage::Test))?;
    control.check_cancelled()
}

fn list_zip_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| map_zip_error(path, e, None, Stage::List))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| map_zip_error(path, e, None, Stage::List))?;
        let modified = entry.last_modified().map(zip_time_to_unix).unwrap_or(0);
        entries.push(
            ArchiveEntry::new(entry.name(), entry.size(), modified, entry.is_dir())
                .encrypted(entry.encrypted()),
        );
    }
    Ok(entries)
}

fn list_tar_like_entries<R: Read>(
    mut archive: TarArchive<R>,
    src: &Path,
) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry_result in archive
        .entries()
        .map_err(|e| Stage::List.failure(src, e))?
    {
        let entry = entry_result.map_err(|e| Stage::List.failure(src, e))?;
        let path = entry.path().map_err(|e| Stage::List.failure(src, e))?;
        let is_dir = entry.header().entry_type().is_dir();
        let modified = entry.header().mtime().unwrap_or(0) as i64;
        entries.push(ArchiveEntry::new(
            archive_display_path(&path),
            entry.size(),
            modified,
            is_dir,
        ));
    }
    Ok(entries)
}

fn list_7z_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let password_hint = password;
    let password = password
        .map(SevenZPassword::from)
        .unwrap_or_else(SevenZPassword::empty);
    let reader = sevenz_rust2::SevenZReader::new(file, password)
        .map_err(|e| map_7z_error(path, e, password_hint, Stage::List))?;

    Ok(reader
        .archive()
        .files
        .iter()
        .map(|e| {
            ArchiveEntry::new(e.name.clone(), e.size, 0, e.is_directory)
                .encrypted(password_hint.is_some())
        })
        .collect())
}

fn sanitize_extract_path(dest_root: &Path, raw_path: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for comp in raw_path.components() {
        match comp {
            Component::Normal(v) => clean.push(v),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    let out = dest_root.join(clean);
    if out.starts_with(dest_root) {
        Some(out)
    } else {
        None
    }
}
