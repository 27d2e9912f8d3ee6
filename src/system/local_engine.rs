//! 로컬 압축 엔진
//!
//! 작업마다 작업 스레드를 하나 띄우고, 진행 이벤트는 채널로 받아
//! `poll_event` 호출 시 UI 스레드에 넘깁니다.

use crate::models::archive_entry::ArchiveEntry;
use crate::models::operation::{ActionKind, AddOptions, ArchiveSummary, ExtractOptions};
use crate::system::archive::{
    self, ArchiveExtractRequest, ArchiveProgressEvent, OperationControl,
};
use crate::system::engine::{ActionOutput, ArchiveEngine, EngineEvent};
use crate::utils::error::{ArchiverError, Result};
use log::{debug, info};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug)]
struct WorkerState {
    action: ActionKind,
    progress_rx: Receiver<ArchiveProgressEvent>,
    join_handle: Option<JoinHandle<Result<ActionOutput>>>,
    cancel_flag: Arc<AtomicBool>,
    /// 목록 읽기 성공 시 확정할 압축 파일 경로
    pending_path: Option<PathBuf>,
}

/// 로컬 파일 시스템 압축 엔진
#[derive(Debug, Default)]
pub struct LocalEngine {
    archive_path: Option<PathBuf>,
    worker: Option<WorkerState>,
    events: VecDeque<EngineEvent>,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.worker.is_some()
    }

    fn loaded_path(&self) -> Result<PathBuf> {
        self.archive_path.clone().ok_or(ArchiverError::NoArchiveLoaded)
    }

    /// 작업 스레드 시작
    fn start<F>(&mut self, action: ActionKind, pending_path: Option<PathBuf>, job: F) -> Result<()>
    where
        F: FnOnce(&OperationControl) -> Result<ActionOutput> + Send + 'static,
    {
        if let Some(worker) = &self.worker {
            return Err(ArchiverError::OperationInProgress(worker.action));
        }

        let (progress_tx, progress_rx) = mpsc::channel::<ArchiveProgressEvent>();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let control = OperationControl::new(progress_tx, Arc::clone(&cancel_flag));
        let handle = std::thread::spawn(move || job(&control));

        debug!("engine action started: {}", action);
        self.events.push_back(EngineEvent::Start(action));
        if action.mutates_content() {
            self.events.push_back(EngineEvent::ContentInvalidated);
        }
        self.events.push_back(EngineEvent::Stoppable(true));

        self.worker = Some(WorkerState {
            action,
            progress_rx,
            join_handle: Some(handle),
            cancel_flag,
            pending_path,
        });
        Ok(())
    }

    /// 작업 스레드 상태를 이벤트 큐로 옮김
    fn collect_worker_events(&mut self) {
        let Some(worker) = &mut self.worker else {
            return;
        };

        while let Ok(event) = worker.progress_rx.try_recv() {
            self.events.push_back(EngineEvent::Progress(event.fraction));
            if !event.current_file.is_empty() {
                self.events.push_back(EngineEvent::Message(format!(
                    "{}: {}",
                    worker.action, event.current_file
                )));
            }
        }

        let is_finished = worker
            .join_handle
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        if !is_finished {
            return;
        }

        let Some(mut worker) = self.worker.take() else {
            return;
        };
        let Some(handle) = worker.join_handle.take() else {
            return;
        };
        let result = handle.join().unwrap_or_else(|_| {
            Err(ArchiverError::Io(std::io::Error::other(
                "archive worker thread panicked",
            )))
        });

        match &result {
            Ok(_) => {
                info!("engine action finished: {}", worker.action);
                if let Some(path) = worker.pending_path.take() {
                    self.archive_path = Some(path);
                }
            }
            Err(e) => debug!("engine action failed: {}: {}", worker.action, e),
        }

        self.events.push_back(EngineEvent::Stoppable(false));
        self.events.push_back(EngineEvent::Finish {
            action: worker.action,
            result,
        });
    }
}

/// 실패 항목이 있는 요약은 부분 실패 오류로
fn summary_output(action: ActionKind, summary: ArchiveSummary) -> Result<ActionOutput> {
    if summary.items_failed > 0 {
        return Err(ArchiverError::PartialFailure {
            action,
            failed: summary.items_failed,
            details: summary.errors.join("\n"),
        });
    }
    Ok(ActionOutput::Summary(summary))
}

fn listing_output(entries: Vec<ArchiveEntry>) -> Result<ActionOutput> {
    Ok(ActionOutput::Listing(entries))
}

impl ArchiveEngine for LocalEngine {
    fn open(&mut self, path: &Path) -> Result<()> {
        let target = path.to_path_buf();
        self.start(
            ActionKind::ListingContent,
            Some(path.to_path_buf()),
            move |_| archive::list_entries(&target, None).and_then(listing_output),
        )
    }

    fn create_new(&mut self, path: &Path) -> Result<()> {
        let target = path.to_path_buf();
        self.start(
            ActionKind::CreatingNewArchive,
            Some(path.to_path_buf()),
            move |_| {
                archive::create_empty(&target)?;
                listing_output(Vec::new())
            },
        )
    }

    fn add_entries(
        &mut self,
        paths: &[PathBuf],
        base_dir: &str,
        options: AddOptions,
    ) -> Result<()> {
        let archive_path = self.loaded_path()?;
        let sources = paths.to_vec();
        let base_dir = base_dir.to_string();
        self.start(ActionKind::AddingFiles, None, move |control| {
            archive::add_entries(&archive_path, &sources, &base_dir, &options, control)
                .and_then(|summary| summary_output(ActionKind::AddingFiles, summary))
        })
    }

    fn remove_entries(&mut self, paths: &[String]) -> Result<()> {
        let archive_path = self.loaded_path()?;
        let selection = paths.to_vec();
        self.start(ActionKind::DeletingFiles, None, move |control| {
            archive::remove_entries(&archive_path, &selection, control)
                .and_then(|summary| summary_output(ActionKind::DeletingFiles, summary))
        })
    }

    fn extract_all(&mut self, dest: &Path, options: ExtractOptions) -> Result<()> {
        let request = ArchiveExtractRequest::all(&self.loaded_path()?, dest, options);
        self.start(ActionKind::ExtractingFiles, None, move |control| {
            archive::extract_archive(&request, control)
                .and_then(|summary| summary_output(ActionKind::ExtractingFiles, summary))
        })
    }

    fn extract_entries(
        &mut self,
        paths: &[String],
        dest: &Path,
        base_dir: &str,
        options: ExtractOptions,
    ) -> Result<()> {
        let request = ArchiveExtractRequest {
            archive_path: self.loaded_path()?,
            dest_dir: dest.to_path_buf(),
            selection: paths.to_vec(),
            base_dir: base_dir.to_string(),
            options,
        };
        self.start(ActionKind::ExtractingFiles, None, move |control| {
            archive::extract_archive(&request, control)
                .and_then(|summary| summary_output(ActionKind::ExtractingFiles, summary))
        })
    }

    fn extract_here(&mut self, options: ExtractOptions) -> Result<()> {
        let archive_path = self.loaded_path()?;
        self.start(ActionKind::ExtractingFiles, None, move |control| {
            let entries = archive::list_entries(&archive_path, options.password.as_deref())?;
            let dest = archive::extract_here_destination(&archive_path, &entries);
            fs::create_dir_all(&dest)?;
            let request = ArchiveExtractRequest::all(&archive_path, &dest, options);
            archive::extract_archive(&request, control)
                .and_then(|summary| summary_output(ActionKind::ExtractingFiles, summary))
        })
    }

    fn test_integrity(&mut self, password: Option<&str>) -> Result<()> {
        let archive_path = self.loaded_path()?;
        let password = password.map(str::to_string);
        self.start(ActionKind::TestingArchive, None, move |control| {
            archive::test_archive(&archive_path, password.as_deref(), control)
                .and_then(|summary| summary_output(ActionKind::TestingArchive, summary))
        })
    }

    fn reload(&mut self) -> Result<()> {
        let archive_path = self.loaded_path()?;
        self.open(&archive_path)
    }

    fn stop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.cancel_flag.store(true, Ordering::Relaxed);
            self.events
                .push_back(EngineEvent::Message("Stopping...".to_string()));
        }
    }

    fn is_loaded(&self) -> bool {
        self.archive_path.is_some()
    }

    fn archive_path(&self) -> Option<&Path> {
        self.archive_path.as_deref()
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        if self.events.is_empty() {
            self.collect_worker_events();
        }
        self.events.pop_front()
    }
}
