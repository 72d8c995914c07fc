use thiserror::Error;

#[derive(Error, Debug)]
pub enum KilnError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("データ取得に失敗: {0}")]
    FetchFailure(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] kiln_common::Error),
}

pub type Result<T> = std::result::Result<T, KilnError>;
