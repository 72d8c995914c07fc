//! HTTP取得（公開スプレッドシートのCSVエクスポート）

use crate::error::{KilnError, Result};
use std::time::Duration;

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// タイムアウト付きのクライアントを作る
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KilnError::Config(format!("HTTPクライアント作成エラー: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 本文を取得（2xx以外・タイムアウト・接続失敗はすべて FetchFailure）
    pub async fn fetch_text(&self) -> Result<String> {
        log::info!("取得開始: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KilnError::FetchFailure(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KilnError::FetchFailure(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KilnError::FetchFailure(describe(&e)))?;

        log::info!("取得完了: {} bytes", body.len());
        Ok(body)
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("タイムアウト: {}", e)
    } else if e.is_connect() {
        format!("接続できません: {}", e)
    } else {
        e.to_string()
    }
}
