//! `opnly status`: one snapshot of system identity and resource usage.

use std::time::Duration;

use bytesize::ByteSize;
use tabled::Tabled;

use opnly_core::{Controller, Snapshot, SnapshotReport};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Formatting ──────────────────────────────────────────────────────

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn format_uptime(secs: u64) -> String {
    if secs == 0 {
        return "-".into();
    }
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

fn format_usage(used: u64, total: u64) -> String {
    if total == 0 {
        return "-".into();
    }
    format!(
        "{} / {} ({:.1}%)",
        ByteSize::b(used),
        ByteSize::b(total),
        percent(used, total)
    )
}

fn snapshot_detail(s: &Snapshot) -> String {
    [
        format!("Hostname:     {}", or_dash(&s.hostname)),
        format!("Product:      {}", or_dash(&s.product_type)),
        format!("Version:      {}", or_dash(&s.version)),
        format!("Architecture: {}", or_dash(&s.architecture)),
        format!("Platform:     {}", or_dash(&s.platform_label)),
        format!("Commit:       {}", or_dash(&s.commit_hash)),
        format!("Repository:   {}", or_dash(&s.repository_label)),
        format!("Mirror:       {}", or_dash(&s.mirror_url)),
        format!("Last update:  {}", or_dash(&s.last_update)),
        format!("Uptime:       {}", format_uptime(s.uptime_secs)),
        format!("CPU:          {:.1}%", s.cpu_usage_pct),
        format!(
            "Memory:       {}",
            format_usage(s.memory_used_bytes, s.memory_total_bytes)
        ),
        format!(
            "Disk (/):     {}",
            format_usage(s.disk_used_bytes, s.disk_total_bytes)
        ),
    ]
    .join("\n")
}

// ── Source table ────────────────────────────────────────────────────

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Answered by")]
    endpoint: String,
}

fn source_rows(report: &SnapshotReport, color: bool) -> Vec<SourceRow> {
    let sources = &report.sources;
    [
        ("resources", &sources.resources),
        ("identity", &sources.identity),
        ("activity", &sources.activity),
        ("disk", &sources.disk),
    ]
    .into_iter()
    .map(|(source, endpoint)| SourceRow {
        source,
        endpoint: endpoint
            .clone()
            .unwrap_or_else(|| output::warn_text("(defaults)", color)),
    })
    .collect()
}

fn report_detail(report: &SnapshotReport, color: bool) -> String {
    format!(
        "{}\n\n{}",
        snapshot_detail(&report.snapshot),
        output::render_table(&source_rows(report, color))
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = if args.sources {
        let report = controller.fetch_snapshot_report().await?;
        let color = output::should_color(&global.color);
        output::render_single(
            &global.output,
            &report,
            |r| report_detail(r, color),
            |r| r.snapshot.hostname.clone(),
        )?
    } else {
        let snapshot = controller.fetch_snapshot().await?;
        output::render_single(&global.output, &snapshot, snapshot_detail, |s| {
            s.hostname.clone()
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
