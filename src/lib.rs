//! 터미널 압축 파일 탐색기
//!
//! 압축 파일 내용을 디렉토리 트리로 보여 주고, 파일 추가/삭제/해제/검사를
//! 작업 스레드에서 실행합니다.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod models;
pub mod system;
pub mod ui;
pub mod utils;
