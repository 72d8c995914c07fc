//! 取得・再取得の統合テスト
//!
//! ローカルのTCPサーバーで応答（成功・遅延・500・接続拒否）を再現して検証

use kiln_common::{Action, CellValue, DashboardState, Ingested, KeyResolver, LoadStatus};
use kiln_monitor::error::KilnError;
use kiln_monitor::refresh::{RefreshOutcome, Refresher};
use kiln_monitor::source::{DataSource, HttpSource};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

const SHEET_CSV: &str = "\
ประทับเวลา,ชื่อเตา,Month,Main gas - ค่าที่วัดได้ (ppm),ตำแหน่ง Main gas
1/5/2025 8:00:00,KilnA,January,5,Normal
1/20/2025 8:00:00,KilnA,January,7,Normal
";

/// 固定の応答を返すHTTPサーバーを起動し、URLとアクセス数を返す
fn serve(status: &'static str, body: &'static str, delay: Duration) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind失敗");
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);

            // リクエストヘッダを読み切る
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{}/export?format=csv", addr), hits)
}

fn http_refresher(url: &str, timeout: Duration) -> Refresher {
    Refresher::new(DataSource::Http(HttpSource::new(url, timeout).unwrap()))
}

/// 正常に取得できる
#[tokio::test]
async fn test_http_refresh_success() {
    let (url, hits) = serve("200 OK", SHEET_CSV, Duration::ZERO);
    let refresher = http_refresher(&url, Duration::from_secs(5));

    match refresher.refresh().await {
        RefreshOutcome::Loaded(records) => assert_eq!(records.len(), 2),
        other => panic!("Loaded expected: {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!refresher.is_in_flight());
}

/// ヘッダのみは Empty
#[tokio::test]
async fn test_http_refresh_header_only() {
    let (url, _) = serve("200 OK", "ประทับเวลา,ชื่อเตา,Month\n", Duration::ZERO);
    let refresher = http_refresher(&url, Duration::from_secs(5));

    assert_eq!(refresher.refresh().await, RefreshOutcome::Empty);
}

/// 取得中の再取得は見送られ、取得元へのアクセスは1回だけ
#[tokio::test]
async fn test_concurrent_refresh_is_coalesced() {
    let (url, hits) = serve("200 OK", SHEET_CSV, Duration::from_millis(500));
    let refresher = http_refresher(&url, Duration::from_secs(5));

    let (first, second) = tokio::join!(refresher.refresh(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        refresher.refresh().await
    });

    assert!(matches!(first, RefreshOutcome::Loaded(_)));
    assert_eq!(second, RefreshOutcome::Skipped);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // 完了後は再び取得できる
    assert!(matches!(refresher.refresh().await, RefreshOutcome::Loaded(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

/// 2xx以外は取得失敗
#[tokio::test]
async fn test_http_500_is_fetch_failure() {
    let (url, _) = serve("500 Internal Server Error", "oops", Duration::ZERO);
    let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();

    let err = source.fetch_text().await.unwrap_err();
    assert!(matches!(err, KilnError::FetchFailure(_)));
    assert!(err.to_string().contains("500"));
}

/// タイムアウトは取得失敗
#[tokio::test]
async fn test_timeout_is_fetch_failure() {
    let (url, _) = serve("200 OK", SHEET_CSV, Duration::from_secs(3));
    let source = HttpSource::new(url, Duration::from_millis(300)).unwrap();

    let err = source.fetch_text().await.unwrap_err();
    assert!(matches!(err, KilnError::FetchFailure(_)));
}

/// 接続拒否は取得失敗
#[tokio::test]
async fn test_connection_refused_is_fetch_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let refresher = http_refresher(
        &format!("http://127.0.0.1:{}/export", port),
        Duration::from_secs(2),
    );

    let outcome = refresher.refresh().await;
    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    assert!(!refresher.is_in_flight());
}

/// 取得失敗後も前回のデータと集計を保持する
#[tokio::test]
async fn test_failure_keeps_previous_state() {
    let resolver = KeyResolver::standard();
    let (ok_url, _) = serve("200 OK", SHEET_CSV, Duration::ZERO);
    let (bad_url, _) = serve("500 Internal Server Error", "", Duration::ZERO);

    let mut state = DashboardState::new();
    let outcome = http_refresher(&ok_url, Duration::from_secs(5)).refresh().await;
    state = state.apply(outcome.into_action().unwrap());
    let before = state.view(&resolver);
    assert_eq!(before.trend[0].leak.main, 6.0);

    let outcome = http_refresher(&bad_url, Duration::from_secs(5)).refresh().await;
    state = state.apply(outcome.into_action().unwrap());
    let after = state.view(&resolver);

    assert!(matches!(after.status, LoadStatus::FetchFailed { .. }));
    assert_eq!(after.trend, before.trend);
    assert_eq!(after.latest, before.latest);
}

/// ローカルCSVファイルから読む
#[tokio::test]
async fn test_file_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kiln.csv");
    std::fs::write(&path, SHEET_CSV).unwrap();

    let refresher = Refresher::new(DataSource::File(path));
    let outcome = refresher.refresh().await;
    let state = DashboardState::new().apply(outcome.into_action().unwrap());
    assert_eq!(state.status(), &LoadStatus::Loaded { records: 2 });
}

/// 空のワークブックファイル（不正な内容）は読み込みエラー
#[tokio::test]
async fn test_broken_workbook_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kiln.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    let err = DataSource::File(path).load().await.unwrap_err();
    assert!(matches!(err, KilnError::Spreadsheet(_)));
}

/// 内容を読めないワークブックは取得失敗と区別される
#[tokio::test]
async fn test_broken_workbook_is_unreadable_status() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kiln.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    let outcome = Refresher::new(DataSource::File(path)).refresh().await;
    assert!(matches!(outcome, RefreshOutcome::Unreadable(_)));

    let state = DashboardState::new().apply(outcome.into_action().unwrap());
    assert!(matches!(state.status(), LoadStatus::Unreadable { .. }));
}

/// ワークブックを読み込む（1行目がヘッダ、空行とタイムスタンプなしの行は除外）
#[tokio::test]
async fn test_workbook_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kiln.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let headers = [
        "  ประทับเวลา ",
        "ชื่อเตา",
        "Month",
        " Main gas - ค่าที่วัดได้ (ppm)",
        "ตำแหน่ง Main gas",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    sheet.write_string(1, 0, "1/5/2025 8:00:00").unwrap();
    sheet.write_string(1, 1, "KilnA").unwrap();
    sheet.write_string(1, 2, "January").unwrap();
    sheet.write_number(1, 3, 5).unwrap();
    sheet.write_string(1, 4, "Normal").unwrap();

    // タイムスタンプなし
    sheet.write_string(2, 1, "KilnA").unwrap();
    sheet.write_string(2, 2, "January").unwrap();
    sheet.write_number(2, 3, 9).unwrap();
    sheet.write_string(2, 4, "Leak").unwrap();

    // 3行目は空行
    let stamp = ExcelDateTime::parse_from_str("2025-02-03 08:00:00").unwrap();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    sheet.write_datetime_with_format(4, 0, &stamp, &date_format).unwrap();
    sheet.write_string(4, 1, "KilnA").unwrap();
    sheet.write_string(4, 2, "February").unwrap();
    sheet.write_string(4, 3, " 7 ").unwrap();
    sheet.write_string(4, 4, "Normal").unwrap();
    workbook.save(&path).unwrap();

    let ingested = DataSource::File(path).load().await.expect("読み込み失敗");
    let Ingested::Records(records) = ingested else {
        panic!("records expected");
    };
    assert_eq!(records.len(), 2);

    let gas = "Main gas - ค่าที่วัดได้ (ppm)";
    assert_eq!(
        records[0].get("ประทับเวลา"),
        Some(&CellValue::Text("1/5/2025 8:00:00".into()))
    );
    assert_eq!(records[0].get(gas), Some(&CellValue::Number(5.0)));
    assert_eq!(records[1].get(gas), Some(&CellValue::Number(7.0)));
    match records[1].get("ประทับเวลา") {
        // 2025-02-03 08:00 のシリアル値
        Some(CellValue::Number(serial)) => assert!((*serial - 45691.333).abs() < 0.01),
        other => panic!("serial date expected: {:?}", other),
    }

    let view = DashboardState::new()
        .apply(Action::Loaded(records))
        .view(&KeyResolver::standard());
    assert_eq!(view.trend.len(), 2);
    assert_eq!(view.trend[0].leak.main, 5.0);
    assert_eq!(view.trend[0].normal_percent, 100);
}

/// 存在しないファイルは取得失敗
#[tokio::test]
async fn test_missing_file_is_fetch_failure() {
    let err = DataSource::File("/nonexistent/kiln.csv".into())
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, KilnError::FetchFailure(_)));
}

/// 取得失敗は状態操作に変換される
#[test]
fn test_failed_outcome_action() {
    assert!(matches!(
        RefreshOutcome::Failed("HTTP 500".into()).into_action(),
        Some(Action::LoadFailed(_))
    ));
}
