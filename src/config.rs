use crate::error::{KilnError, Result};
use kiln_common::{FieldAliases, KeyResolver};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 公開スプレッドシートのCSVエクスポートURL
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1mB3Cb6GVbPVI_mK2q7BRWlvgXSikxS7ZvA-0_8_T7WY/export?format=csv&gid=356457835";

/// 環境変数（設定ファイルより優先）
pub const SHEET_URL_ENV: &str = "KILN_SHEET_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet_url: String,
    pub timeout_seconds: u64,
    pub refresh_interval_seconds: u64,
    pub default_unit: Option<String>,
    /// 正規フィールドID → 追加のヘッダ表記
    pub aliases: FieldAliases,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.into(),
            timeout_seconds: 30,
            refresh_interval_seconds: 300,
            default_unit: None,
            aliases: FieldAliases::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込む（なければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| KilnError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("kiln-monitor").join("config.json"))
    }

    /// 取得先URL
    pub fn get_sheet_url(&self) -> String {
        // 環境変数を優先
        if let Ok(url) = std::env::var(SHEET_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }

        self.sheet_url.clone()
    }

    /// 設定の別名を反映した解決器
    pub fn resolver(&self) -> Result<KeyResolver> {
        self.resolver_with(None)
    }

    /// 別名ファイルの表記を設定の別名の後ろに加えた解決器
    pub fn resolver_with(&self, alias_file: Option<&Path>) -> Result<KeyResolver> {
        let mut aliases = self.aliases.clone();
        if let Some(path) = alias_file {
            let content = std::fs::read_to_string(path)?;
            aliases.merge(&FieldAliases::from_json(&content)?);
        }
        Ok(KeyResolver::standard().with_aliases(&aliases)?)
    }

    pub fn set_sheet_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(KilnError::Config(format!("URLが不正です: {}", url)));
        }
        self.sheet_url = url;
        self.save()
    }

    pub fn set_default_unit(&mut self, unit: String) -> Result<()> {
        let unit = unit.trim().to_string();
        self.default_unit = if unit.is_empty() { None } else { Some(unit) };
        self.save()
    }
}
