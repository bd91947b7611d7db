//! Report rendering and artifact export.
//!
//! Formats produced from a `ScreenReport`:
//! - **Text**: the chat-style summary (bucket icon, symbol, RS, setup, score)
//! - **Watchlist**: TradingView import line, `BINANCE:SYM,BINANCE:SYM2`
//! - **JSON**: full report with schema versioning
//! - **CSV**: candidates and stage funnel
//! - **Markdown**: run metadata, funnel and candidate tables
//!
//! Wall-clock time only enters through the `generated_at` arguments, so the
//! JSON artifact stays byte-identical across reruns.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use trendscan_core::domain::{Bucket, Candidate};
use trendscan_core::screen::{ScreenReport, StageResult, REPORT_SCHEMA_VERSION};

pub const EMPTY_MESSAGE: &str = "No assets passed the strict criteria this round.";

fn bucket_icon(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Leader => "🚀",
        Bucket::PowerPlay => "⚡",
        Bucket::Turning | Bucket::None => "🔄",
    }
}

// ─── Text ───────────────────────────────────────────────────────────

/// Chat-style summary. An empty list renders as [`EMPTY_MESSAGE`] alone.
pub fn render_text(candidates: &[Candidate], generated_at: DateTime<Utc>) -> String {
    if candidates.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }
    let mut msg = format!(
        "📊 **Screening Result** ({})\nTop {} Candidates\n\n",
        generated_at.format("%H:%M"),
        candidates.len()
    );
    for c in candidates {
        msg.push_str(&format!(
            "{} **{}** (RS:{})\n   Type: {} | Score: {}\n",
            bucket_icon(c.bucket),
            c.symbol,
            c.rs_rank,
            c.setup,
            c.score
        ));
    }
    msg
}

// ─── Watchlist ──────────────────────────────────────────────────────

/// TradingView watchlist line, or `None` when there is nothing to watch.
pub fn render_watchlist(candidates: &[Candidate]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    Some(
        candidates
            .iter()
            .map(|c| format!("BINANCE:{}", c.symbol))
            .collect::<Vec<_>>()
            .join(","),
    )
}

pub fn watchlist_file_name(generated_at: DateTime<Utc>) -> String {
    format!("watchlist_{}.txt", generated_at.format("%Y%m%d_%H%M"))
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &ScreenReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScreenReport to JSON")
}

/// Parse a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<ScreenReport> {
    let report: ScreenReport =
        serde_json::from_str(json).context("failed to deserialize ScreenReport from JSON")?;
    if report.schema_version > REPORT_SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            REPORT_SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: rank, symbol, bucket, rs_rank, score, price, setup
pub fn export_candidates_csv(candidates: &[Candidate]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["rank", "symbol", "bucket", "rs_rank", "score", "price", "setup"])?;
    for (i, c) in candidates.iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &c.symbol,
            &c.bucket.to_string(),
            &format!("{:.1}", c.rs_rank),
            &format!("{:.1}", c.score),
            &c.price.to_string(),
            &c.setup.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_funnel_csv(funnel: &[StageResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["stage", "input", "passed", "eliminated"])?;
    for s in funnel {
        wtr.write_record([
            s.stage.as_str(),
            &s.input.to_string(),
            &s.passed.to_string(),
            &s.eliminated.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

pub fn generate_markdown(report: &ScreenReport, generated_at: DateTime<Utc>) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Screening Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Generated | {} |\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(&format!("| Benchmark | {} |\n", report.benchmark));
    md.push_str(&format!("| Universe | {} |\n", report.universe_size));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash.short()));
    md.push_str(&format!("| Config Hash | {} |\n", report.config_hash));
    md.push('\n');

    md.push_str("## Funnel\n\n");
    md.push_str("| Stage | In | Passed | Eliminated | Rate |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
    for s in &report.funnel {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% |\n",
            s.stage,
            s.input,
            s.passed,
            s.eliminated,
            s.elimination_rate() * 100.0
        ));
    }
    md.push('\n');

    md.push_str("## Candidates\n\n");
    if report.candidates.is_empty() {
        md.push_str(EMPTY_MESSAGE);
        md.push('\n');
        return md;
    }
    md.push_str("| # | Symbol | Bucket | RS | Score | Setup | Price |\n");
    md.push_str("| ---: | --- | --- | ---: | ---: | --- | ---: |\n");
    for (i, c) in report.candidates.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} {} | {:.1} | {:.1} | {} | {} |\n",
            i + 1,
            c.symbol,
            bucket_icon(c.bucket),
            c.bucket,
            c.rs_rank,
            c.score,
            c.setup,
            c.price
        ));
    }
    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the artifact set for one run.
///
/// Creates `scan_{timestamp}/` under `output_dir` containing `report.json`,
/// `candidates.csv`, `funnel.csv`, `report.md` and, when there are
/// candidates, the watchlist file. Returns the created directory.
pub fn save_artifacts(
    report: &ScreenReport,
    output_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let run_dir = output_dir.join(format!("scan_{}", generated_at.format("%Y%m%d_%H%M%S")));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("report.json"), &export_json(report)?)?;
    write(
        &run_dir.join("candidates.csv"),
        &export_candidates_csv(&report.candidates)?,
    )?;
    write(&run_dir.join("funnel.csv"), &export_funnel_csv(&report.funnel)?)?;
    write(
        &run_dir.join("report.md"),
        &generate_markdown(report, generated_at),
    )?;
    if let Some(watchlist) = render_watchlist(&report.candidates) {
        write(&run_dir.join(watchlist_file_name(generated_at)), &watchlist)?;
    }

    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a report back from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<ScreenReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trendscan_core::domain::{ConfigHash, DatasetHash, SetupKind};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 59, 0).unwrap()
    }

    fn candidate(symbol: &str, bucket: Bucket, rs: f64, score: f64, setup: SetupKind) -> Candidate {
        Candidate {
            symbol: symbol.into(),
            bucket,
            rs_rank: rs,
            score,
            price: 1.25,
            setup,
        }
    }

    fn sample_report() -> ScreenReport {
        ScreenReport {
            schema_version: REPORT_SCHEMA_VERSION,
            benchmark: "BTCUSDT".into(),
            universe_size: 3,
            candidates: vec![
                candidate("SOLUSDT", Bucket::Leader, 100.0, 96.0, SetupKind::Vcp),
                candidate("ARBUSDT", Bucket::PowerPlay, 83.3, 70.0, SetupKind::PowerPlay),
                candidate("OPUSDT", Bucket::Turning, 66.7, 60.0, SetupKind::Vcp),
            ],
            funnel: vec![StageResult {
                stage: "noise_gate".into(),
                input: 4,
                passed: 3,
                eliminated: 1,
            }],
            dataset_hash: DatasetHash::from_hash(blake3::hash(b"panel")),
            config_hash: ConfigHash::from_bytes(b"config"),
        }
    }

    #[test]
    fn text_uses_bucket_icons() {
        let report = sample_report();
        let text = render_text(&report.candidates, at());
        assert!(text.starts_with("📊 **Screening Result** (15:59)\nTop 3 Candidates\n\n"));
        assert!(text.contains("🚀 **SOLUSDT** (RS:100)\n   Type: VCP | Score: 96\n"));
        assert!(text.contains("⚡ **ARBUSDT** (RS:83.3)\n   Type: PP | Score: 70\n"));
        assert!(text.contains("🔄 **OPUSDT** (RS:66.7)"));
    }

    #[test]
    fn empty_run_renders_fixed_message() {
        assert_eq!(render_text(&[], at()), EMPTY_MESSAGE);
        assert_eq!(render_watchlist(&[]), None);
    }

    #[test]
    fn watchlist_keeps_rank_order() {
        let report = sample_report();
        assert_eq!(
            render_watchlist(&report.candidates).unwrap(),
            "BINANCE:SOLUSDT,BINANCE:ARBUSDT,BINANCE:OPUSDT"
        );
        assert_eq!(watchlist_file_name(at()), "watchlist_20240301_1559.txt");
    }

    #[test]
    fn candidates_csv_has_header_and_rows() {
        let csv = export_candidates_csv(&sample_report().candidates).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "rank,symbol,bucket,rs_rank,score,price,setup");
        assert_eq!(lines[1], "1,SOLUSDT,Leader,100.0,96.0,1.25,VCP");
        assert_eq!(lines[2], "2,ARBUSDT,PowerPlay,83.3,70.0,1.25,PP");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn json_rejects_future_schema() {
        let mut report = sample_report();
        report.schema_version = REPORT_SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn markdown_lists_funnel_and_candidates() {
        let md = generate_markdown(&sample_report(), at());
        assert!(md.contains("| Benchmark | BTCUSDT |"));
        assert!(md.contains("| noise_gate | 4 | 3 | 1 | 25.0% |"));
        assert!(md.contains("| 2 | ARBUSDT | ⚡ PowerPlay | 83.3 | 70.0 | PP | 1.25 |"));
    }

    #[test]
    fn save_and_load_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let run_dir = save_artifacts(&report, dir.path(), at()).unwrap();

        assert!(run_dir.ends_with("scan_20240301_155900"));
        for name in ["report.json", "candidates.csv", "funnel.csv", "report.md"] {
            assert!(run_dir.join(name).exists(), "{name} missing");
        }
        let watchlist =
            std::fs::read_to_string(run_dir.join("watchlist_20240301_1559.txt")).unwrap();
        assert!(watchlist.starts_with("BINANCE:SOLUSDT"));

        assert_eq!(load_artifacts(&run_dir).unwrap(), report);
    }

    #[test]
    fn empty_report_writes_no_watchlist() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = sample_report();
        report.candidates.clear();
        let run_dir = save_artifacts(&report, dir.path(), at()).unwrap();
        let files = std::fs::read_dir(&run_dir).unwrap().count();
        assert_eq!(files, 4);
        let md = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
        assert!(md.contains(EMPTY_MESSAGE));
    }
}
