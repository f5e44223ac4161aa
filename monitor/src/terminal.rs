//! Terminal presenter: redraws the status table in place on a fixed cadence.

use alloc::sync::Arc;
use core::{net::Ipv4Addr, time::Duration};
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use colored::Colorize as _;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use eyre::WrapErr as _;
use tokio::time::{MissedTickBehavior, interval};

use crate::store::{StatusMap, StatusRecord, StatusStore};

/// Formats the table for `targets`, in that order, as of `now`.
///
/// Targets missing from `snapshot` are skipped.
#[must_use]
pub fn render_table(targets: &[Ipv4Addr], snapshot: &StatusMap, now: DateTime<Utc>) -> String {
    let mut lines = Vec::with_capacity(targets.len() + 2);
    lines.push(format!(
        "{:<15} {:<30} {:<6} {}",
        "IP", "Hostname", "Status", "Last Seen"
    ));
    lines.push("-".repeat(70));
    lines.extend(
        targets
            .iter()
            .filter_map(|ip| snapshot.get(ip))
            .map(|record| render_row(record, now)),
    );
    lines.push(String::new());
    lines.join("\n")
}

fn render_row(record: &StatusRecord, now: DateTime<Utc>) -> String {
    let status = if record.reachable {
        format!("{:<6}", "UP").green()
    } else {
        format!("{:<6}", "DOWN").red()
    };
    format!(
        "{:<15} {:<30} {} {}",
        record.ip,
        record.hostname,
        status,
        last_seen(record, now)
    )
}

/// `"{n}s ago"` since the last successful probe while the host is up, otherwise `"never"`.
fn last_seen(record: &StatusRecord, now: DateTime<Utc>) -> String {
    match record.last_seen {
        Some(at) if record.reachable => format!("{}s ago", (now - at).num_seconds().max(0)),
        _ => "never".to_owned(),
    }
}

/// Clears the terminal and writes `table` from the top-left corner.
fn draw(out: &mut impl Write, table: &str) -> io::Result<()> {
    execute!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    out.write_all(table.as_bytes())?;
    out.flush()
}

/// Redraws the table every `every` until stdout fails.
///
/// # Errors
///
/// Returns an error if stdout can no longer be written to.
pub async fn run(targets: Arc<[Ipv4Addr]>, store: StatusStore, every: Duration) -> eyre::Result<()> {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let table = render_table(&targets, &store.snapshot(), Utc::now());
        draw(&mut io::stdout().lock(), &table).wrap_err("failed to draw status table")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;
    use chrono::TimeDelta;

    const A: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
    const B: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 2);

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn header_and_rule_come_first() {
        plain();
        let table = render_table(&[], &StatusMap::new(), Utc::now());
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        for column in ["IP", "Hostname", "Status", "Last Seen"] {
            assert!(header.contains(column), "{header}");
        }
        assert_eq!(lines.next(), Some("-".repeat(70).as_str()));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn rows_follow_target_order_and_show_state() {
        plain();
        let store = StatusStore::new([A, B]);
        store.apply_probe_result(B, ProbeOutcome::reachable(Some("printer.lan".into())));
        let snapshot = store.snapshot();
        let seen = snapshot[&B].last_seen.unwrap();

        let table = render_table(&[B, A], &snapshot, seen + TimeDelta::seconds(42));
        let rows: Vec<_> = table.lines().skip(2).collect();
        assert_eq!(rows.len(), 2);

        assert!(rows[0].starts_with("192.168.1.2 "), "{}", rows[0]);
        assert!(rows[0].contains("printer.lan"));
        assert!(rows[0].contains("UP"));
        assert!(rows[0].ends_with("42s ago"), "{}", rows[0]);

        assert!(rows[1].starts_with("192.168.1.1 "), "{}", rows[1]);
        assert!(rows[1].contains("unknown"));
        assert!(rows[1].contains("DOWN"));
        assert!(rows[1].ends_with("never"), "{}", rows[1]);
    }

    #[test]
    fn down_host_shows_never_even_when_seen_before() {
        plain();
        let store = StatusStore::new([A]);
        store.apply_probe_result(A, ProbeOutcome::reachable(Some("nas".into())));
        store.apply_probe_result(A, ProbeOutcome::unreachable());
        let snapshot = store.snapshot();
        let seen = snapshot[&A].last_seen.unwrap();

        let table = render_table(&[A], &snapshot, seen + TimeDelta::seconds(7));
        let row = table.lines().nth(2).unwrap();
        assert!(row.contains("nas"));
        assert!(row.contains("DOWN"));
        assert!(row.ends_with("never"), "{row}");
    }

    #[test]
    fn unknown_targets_are_skipped() {
        plain();
        let store = StatusStore::new([A]);
        let table = render_table(&[B, A], &store.snapshot(), Utc::now());
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn last_seen_never_goes_negative() {
        let now = Utc::now();
        let record = StatusRecord {
            reachable: true,
            last_seen: Some(now + TimeDelta::seconds(3)),
            ..StatusRecord::new(A)
        };
        assert_eq!(last_seen(&record, now), "0s ago");
        assert_eq!(last_seen(&StatusRecord::new(A), now), "never");
    }

    #[test]
    fn draw_clears_then_writes_table() {
        let mut out = Vec::new();
        draw(&mut out, "table\n").unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with('\u{1b}'), "{written:?}");
        assert!(written.ends_with("table\n"));
    }
}
