//! データ取得元
//!
//! 公開スプレッドシート（HTTP）かローカルファイル（CSV/Excel）から
//! 点検記録を読み込み、共通ライブラリの取り込み処理に渡す。

pub mod http;
pub mod xlsx;

pub use http::HttpSource;

use crate::config::Config;
use crate::error::{KilnError, Result};
use kiln_common::{parse_csv, Ingested};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub enum DataSource {
    Http(HttpSource),
    File(PathBuf),
}

impl DataSource {
    /// 設定と引数から取得元を決める（`input` があればファイル優先）
    pub fn from_config(config: &Config, input: Option<&Path>, timeout: Option<u64>) -> Result<Self> {
        if let Some(path) = input {
            return Ok(DataSource::File(path.to_path_buf()));
        }

        let seconds = timeout.unwrap_or(config.timeout_seconds);
        if seconds == 0 {
            return Err(KilnError::Config("タイムアウトは1秒以上を指定してください".into()));
        }
        let source = HttpSource::new(config.get_sheet_url(), Duration::from_secs(seconds))?;
        Ok(DataSource::Http(source))
    }

    /// 表示用の取得元
    pub fn describe(&self) -> String {
        match self {
            DataSource::Http(source) => source.url().to_string(),
            DataSource::File(path) => path.display().to_string(),
        }
    }

    /// 読み込んで取り込み結果を返す
    ///
    /// 取得元に到達できない場合は `FetchFailure`
    pub async fn load(&self) -> Result<Ingested> {
        match self {
            DataSource::Http(source) => {
                let text = source.fetch_text().await?;
                Ok(parse_csv(&text)?)
            }
            DataSource::File(path) => {
                if !path.exists() {
                    return Err(KilnError::FetchFailure(format!(
                        "ファイルが見つかりません: {}",
                        path.display()
                    )));
                }
                if xlsx::is_workbook(path) {
                    // calamine の読み込みはブロッキング
                    let path = path.clone();
                    return tokio::task::spawn_blocking(move || xlsx::read_workbook(&path, None))
                        .await
                        .map_err(|e| KilnError::Spreadsheet(format!("読み込みタスクが中断しました: {}", e)))?;
                }

                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| KilnError::FetchFailure(format!("{}: {}", path.display(), e)))?;
                Ok(parse_csv(&text)?)
            }
        }
    }
}
