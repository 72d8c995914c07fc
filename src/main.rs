use anyhow::{bail, Context};
use clap::Parser;
use env_logger::{Builder, Target};
use indicatif::{ProgressBar, ProgressStyle};
use kiln_common::{Action, DashboardState, KeyResolver, PeriodOrder, Selection};
use kiln_monitor::{cli, config, export, refresh, report, source};
use cli::{selection_arg, Cli, Commands};
use config::Config;
use refresh::{RefreshOutcome, Refresher};
use source::DataSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn init_logger(verbose: bool) {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false);

    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.init();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 炉の選択（未指定なら設定の既定の炉）
fn unit_choice(arg: Option<&str>, config: &Config) -> Option<Selection> {
    selection_arg(arg).or_else(|| config.default_unit.as_deref().map(Selection::only))
}

/// 1回取得して状態を作る
async fn load_state(
    cli: &Cli,
    config: &Config,
    step: &str,
) -> anyhow::Result<DashboardState> {
    let source = DataSource::from_config(config, cli.input.as_deref(), cli.timeout)?;
    println!("{} データを取得中...", step);

    let refresher = Refresher::new(source);
    let pb = spinner(refresher.source().describe());
    let outcome = refresher.refresh().await;
    pb.finish_and_clear();

    let mut state = DashboardState::new();
    if let Some(action) = outcome.into_action() {
        state = state.apply(action);
    }
    println!("{}\n", report::status_line(state.status()));

    match state.status() {
        kiln_common::LoadStatus::FetchFailed { message } => {
            bail!("データ取得に失敗しました: {}", message)
        }
        kiln_common::LoadStatus::Unreadable { message } => {
            bail!("データを読み込めませんでした: {}", message)
        }
        _ => {}
    }
    Ok(state)
}

fn apply_selection(
    state: DashboardState,
    unit: Option<Selection>,
    period: Option<Selection>,
    order: PeriodOrder,
) -> DashboardState {
    let mut state = state.apply(Action::SetPeriodOrder(order));
    if let Some(unit) = unit {
        state = state.apply(Action::SelectUnit(unit));
    }
    if let Some(period) = period {
        state = state.apply(Action::SelectPeriod(period));
    }
    state
}

fn period_order(chronological: bool) -> PeriodOrder {
    if chronological {
        PeriodOrder::Chronological
    } else {
        PeriodOrder::FirstSeen
    }
}

async fn watch(
    refresher: Refresher,
    state: DashboardState,
    resolver: &KeyResolver,
    interval: u64,
    cycles: Option<u32>,
) -> anyhow::Result<()> {
    let refresher = Arc::new(refresher);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RefreshOutcome>();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    let mut state = state;
    let mut started: u32 = 0;
    let mut finished: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick(), if cycles.map_or(true, |n| started < n) => {
                started += 1;
                let refresher = Arc::clone(&refresher);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(refresher.refresh().await);
                });
            }
            Some(outcome) = rx.recv() => {
                finished += 1;
                let now = chrono::Local::now().format("%H:%M:%S");

                if outcome.is_skipped() {
                    println!("[{}] - 前回の取得が未完了のためスキップ", now);
                } else if let Some(action) = outcome.into_action() {
                    state = state.apply(action);
                    let view = state.view(resolver);
                    let latest = view
                        .trend
                        .last()
                        .map(|a| format!(" | {} {} {}% {}", a.unit, a.period, a.normal_percent, a.safety_rating))
                        .unwrap_or_default();
                    println!("[{}] {}{}", now, report::status_line(&view.status), latest);
                }

                if cycles.is_some_and(|n| finished >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n中断しました");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = Config::load().context("設定ファイルの読み込みに失敗しました")?;
    let resolver = config
        .resolver_with(cli.aliases.as_deref())
        .context("別名（aliases）の設定が不正です")?;

    match &cli.command {
        Commands::Overview { unit, period, json } => {
            println!("🔥 kiln-monitor - 現況\n");
            let state = load_state(&cli, &config, "[1/2]").await?;
            let state = apply_selection(
                state,
                unit_choice(unit.as_deref(), &config),
                selection_arg(period.as_deref()),
                PeriodOrder::FirstSeen,
            );

            println!("[2/2] 表示データを作成中...");
            let view = state.view(&resolver);
            if *json {
                println!("{}", serde_json::to_string_pretty(&view.snapshot)?);
            } else {
                print!("{}", report::render_overview(&view));
            }
        }

        Commands::Trend { unit, section, chronological, json } => {
            println!("📈 kiln-monitor - 月別集計\n");
            let state = load_state(&cli, &config, "[1/2]").await?;
            let state = apply_selection(
                state,
                unit_choice(unit.as_deref(), &config),
                None,
                period_order(*chronological),
            );

            println!("[2/2] 集計中...");
            let view = state.view(&resolver);
            if let Some(unit) = &view.effective_unit {
                println!("✔ 炉: {} ({}か月)\n", unit, view.trend.len());
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&view.trend)?);
            } else {
                print!("{}", report::render_trend(&view.trend, *section));
            }
        }

        Commands::Export { unit, format, output, title, chronological } => {
            println!("📄 kiln-monitor - エクスポート\n");
            let state = load_state(&cli, &config, "[1/3]").await?;
            let state = apply_selection(
                state,
                unit_choice(unit.as_deref(), &config),
                None,
                period_order(*chronological),
            );

            println!("[2/3] 集計中...");
            let view = state.view(&resolver);
            println!("✔ {}か月分の集計\n", view.trend.len());

            println!("[3/3] 出力中...");
            let output_dir = output.clone().unwrap_or_else(|| PathBuf::from("."));
            export::export_aggregates(&view.trend, format, &output_dir, title)
                .context("エクスポートに失敗しました")?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Watch { unit, interval, cycles } => {
            println!("👀 kiln-monitor - 定期取得\n");
            let refresher =
                Refresher::new(DataSource::from_config(&config, cli.input.as_deref(), cli.timeout)?);
            println!("取得元: {}", refresher.source().describe());

            let interval = interval.unwrap_or(config.refresh_interval_seconds);
            println!("間隔: {}秒\n", interval);

            let state = apply_selection(
                DashboardState::new(),
                unit_choice(unit.as_deref(), &config),
                None,
                PeriodOrder::FirstSeen,
            );
            watch(refresher, state, &resolver, interval, *cycles).await?;
        }

        Commands::Units => {
            let state = load_state(&cli, &config, "[1/1]").await?;
            let state = apply_selection(
                state,
                unit_choice(None, &config),
                None,
                PeriodOrder::FirstSeen,
            );
            print!("{}", report::render_options(&state.view(&resolver)));
        }

        Commands::Config { set_url, set_default_unit, show } => {
            if let Some(url) = set_url {
                config.set_sheet_url(url.clone())?;
                println!("✔ 取得先URLを設定しました");
            }

            if let Some(unit) = set_default_unit {
                config.set_default_unit(unit.clone())?;
                println!("✔ 既定の炉を設定しました");
            }

            if *show {
                println!("設定:");
                println!("  取得先URL: {}", config.get_sheet_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  更新間隔: {}秒", config.refresh_interval_seconds);
                println!(
                    "  既定の炉: {}",
                    config.default_unit.as_deref().unwrap_or("未設定（先頭の炉）")
                );
                println!("  追加表記: {}件", config.aliases.entries.len());
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
