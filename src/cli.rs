use clap::{Parser, Subcommand};
use kiln_common::Selection;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiln-monitor")]
#[command(about = "窯点検スプレッドシートの月別集計・状況表示ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ローカルのCSV/Excelファイルを読む（省略時は設定のURLから取得）
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// 取得タイムアウト（秒、省略時は設定値）
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// 追加のヘッダ表記（JSON、設定の別名に追加）
    #[arg(long, global = true)]
    pub aliases: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 最新の点検記録から現況を表示
    Overview {
        /// 炉の名前（All で全炉）
        #[arg(short, long)]
        unit: Option<String>,

        /// 集計月（All で全期間）
        #[arg(short, long)]
        period: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 月別集計を表示
    Trend {
        /// 炉の名前（省略時は既定の炉）
        #[arg(short, long)]
        unit: Option<String>,

        /// 表示する区分 (thermal/gas/safety/all)
        #[arg(short, long, default_value = "all")]
        section: Section,

        /// 集計月を年月順に並べる
        #[arg(long)]
        chronological: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 月別集計をファイルに出力
    Export {
        /// 炉の名前（省略時は既定の炉）
        #[arg(short, long)]
        unit: Option<String>,

        /// 出力形式 (json/csv/excel/all)
        #[arg(short, long, default_value = "all")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ファイル名（ディレクトリ指定時）
        #[arg(short, long, default_value = "kiln-trend")]
        title: String,

        /// 集計月を年月順に並べる
        #[arg(long)]
        chronological: bool,
    },

    /// 定期的に再取得して状態を表示
    Watch {
        /// 炉の名前（省略時は既定の炉）
        #[arg(short, long)]
        unit: Option<String>,

        /// 取得間隔（秒、省略時は設定値）
        #[arg(long)]
        interval: Option<u64>,

        /// 取得回数（省略時は無制限）
        #[arg(long)]
        cycles: Option<u32>,
    },

    /// 炉と集計月の一覧を表示
    Units,

    /// 設定を表示/編集
    Config {
        /// 取得先URLを設定
        #[arg(long)]
        set_url: Option<String>,

        /// 既定の炉を設定（空文字で解除）
        #[arg(long)]
        set_default_unit: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 集計表示の区分
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    Thermal,
    Gas,
    Safety,
    #[default]
    All,
}

impl Section {
    pub fn includes(&self, other: Section) -> bool {
        *self == Section::All || *self == other
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thermal" | "temp" => Ok(Section::Thermal),
            "gas" => Ok(Section::Gas),
            "safety" | "leak" => Ok(Section::Safety),
            "all" => Ok(Section::All),
            _ => Err(format!("Unknown section: {}. Use thermal, gas, safety, or all", s)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Excel,
    #[default]
    All,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "all" => Ok(ExportFormat::All),
            _ => Err(format!("Unknown format: {}. Use json, csv, excel, or all", s)),
        }
    }
}

/// 引数の選択値を変換（`All` / `*` はワイルドカード）
///
/// 未指定は `None`（既定の炉を使う）
pub fn selection_arg(value: Option<&str>) -> Option<Selection> {
    let value = value?.trim();
    if value.eq_ignore_ascii_case("all") || value == "*" {
        Some(Selection::All)
    } else {
        Some(Selection::only(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_arg() {
        assert_eq!(selection_arg(None), None);
        assert_eq!(selection_arg(Some("All")), Some(Selection::All));
        assert_eq!(selection_arg(Some("*")), Some(Selection::All));
        assert_eq!(selection_arg(Some(" KilnA ")), Some(Selection::only("KilnA")));
    }

    #[test]
    fn test_section_includes() {
        assert!(Section::All.includes(Section::Gas));
        assert!(Section::Gas.includes(Section::Gas));
        assert!(!Section::Thermal.includes(Section::Gas));
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("xlsx".parse::<ExportFormat>(), Ok(ExportFormat::Excel));
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!("safety".parse::<Section>(), Ok(Section::Safety));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "kiln-monitor",
            "trend",
            "--unit",
            "KilnA",
            "--section",
            "gas",
            "--input",
            "data.csv",
            "--verbose",
            "--aliases",
            "aliases.json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.input, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.aliases, Some(PathBuf::from("aliases.json")));
        match cli.command {
            Commands::Trend { unit, section, chronological, .. } => {
                assert_eq!(unit.as_deref(), Some("KilnA"));
                assert_eq!(section, Section::Gas);
                assert!(!chronological);
            }
            _ => panic!("trend expected"),
        }
    }
}
