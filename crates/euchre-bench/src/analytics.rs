use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use euchre_core::game::record::DealRecord;
use euchre_core::model::player::Seat;
use euchre_core::model::suit::CallRelation;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::RunMode;

const CONFIDENCE: f64 = 0.95;
const CALL_POSITIONS: usize = 8;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("failed to build normal distribution: {0}")]
    Distribution(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Running counts for one slice of the finished deals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub deals: u64,
    pub bids: u64,
    pub makes: u64,
    pub marches: u64,
    pub euchres: u64,
    /// Caller-relative points summed over bid deals.
    pub points: i64,
}

impl Tally {
    fn record(&mut self, record: &DealRecord) {
        self.deals += 1;
        if record.is_passed() {
            return;
        }
        self.bids += 1;
        if record.is_made() {
            self.makes += 1;
        }
        if record.is_march() {
            self.marches += 1;
        }
        if record.is_euchre() {
            self.euchres += 1;
        }
        self.points += i64::from(record.points);
    }

    pub fn passes(&self) -> u64 {
        self.deals - self.bids
    }

    pub fn make_rate(&self) -> f64 {
        ratio(self.makes, self.bids)
    }

    pub fn avg_points(&self) -> f64 {
        if self.bids == 0 {
            0.0
        } else {
            self.points as f64 / self.bids as f64
        }
    }
}

/// Accumulates deal records into the rollups shown in the summary.
pub struct AnalyticsCollector {
    mode: RunMode,
    z: f64,
    overall: Tally,
    by_turncard_level: BTreeMap<u8, Tally>,
    by_call_position: [Tally; CALL_POSITIONS],
    by_call_seat: [Tally; 4],
    by_relation: [Tally; 3],
    by_variant: BTreeMap<u8, Tally>,
}

impl AnalyticsCollector {
    pub fn new(mode: RunMode) -> Result<Self, AnalyticsError> {
        let normal =
            Normal::new(0.0, 1.0).map_err(|err| AnalyticsError::Distribution(err.to_string()))?;
        let z = normal.inverse_cdf(1.0 - (1.0 - CONFIDENCE) / 2.0);
        Ok(Self {
            mode,
            z,
            overall: Tally::default(),
            by_turncard_level: BTreeMap::new(),
            by_call_position: [Tally::default(); CALL_POSITIONS],
            by_call_seat: [Tally::default(); 4],
            by_relation: [Tally::default(); 3],
            by_variant: BTreeMap::new(),
        })
    }

    pub fn record_deal(&mut self, record: &DealRecord, variant: Option<u8>) {
        self.overall.record(record);
        self.by_turncard_level
            .entry(record.turncard_level)
            .or_default()
            .record(record);
        if let Some(variant) = variant {
            self.by_variant.entry(variant).or_default().record(record);
        }
        if let Some(position) = record.call_position {
            if let Some(tally) = self.by_call_position.get_mut(usize::from(position)) {
                tally.record(record);
            }
        }
        if let Some(seat) = record.call_seat {
            self.by_call_seat[seat.index()].record(record);
        }
        if let Some(relation) = record.call_suit_relation {
            self.by_relation[relation.index()].record(record);
        }
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let z = self.z;
        let row = |label: String, tally: Tally| BreakdownRow::new(label, tally, z);

        AnalyticsSummary {
            mode: self.mode,
            z,
            overall: row("all deals".to_string(), self.overall),
            by_turncard_level: self
                .by_turncard_level
                .into_iter()
                .map(|(level, tally)| row(format!("level {level}"), tally))
                .collect(),
            by_call_position: self
                .by_call_position
                .into_iter()
                .enumerate()
                .map(|(position, tally)| row(position_label(position), tally))
                .collect(),
            by_call_seat: Seat::LOOP
                .into_iter()
                .map(|seat| row(seat.to_string(), self.by_call_seat[seat.index()]))
                .collect(),
            by_call_relation: CallRelation::ALL
                .into_iter()
                .map(|relation| {
                    row(
                        relation_label(relation).to_string(),
                        self.by_relation[relation.index()],
                    )
                })
                .collect(),
            by_variant: self
                .by_variant
                .into_iter()
                .map(|(variant, tally)| row(format!("variant {variant:02}"), tally))
                .collect(),
        }
    }
}

fn position_label(position: usize) -> String {
    let round = if position < 4 { 1 } else { 2 };
    format!("{position} (round {round})")
}

fn relation_label(relation: CallRelation) -> &'static str {
    match relation {
        CallRelation::Turn => "turn",
        CallRelation::Next => "next",
        CallRelation::Other => "cross",
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Wilson score interval for `successes` out of `trials` at quantile `z`.
pub fn wilson_interval(successes: u64, trials: u64, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub tally: Tally,
    pub make_rate: f64,
    pub make_ci: (f64, f64),
    pub avg_points: f64,
}

impl BreakdownRow {
    fn new(label: String, tally: Tally, z: f64) -> Self {
        Self {
            label,
            make_rate: tally.make_rate(),
            make_ci: wilson_interval(tally.makes, tally.bids, z),
            avg_points: tally.avg_points(),
            tally,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub mode: RunMode,
    pub z: f64,
    pub overall: BreakdownRow,
    pub by_turncard_level: Vec<BreakdownRow>,
    pub by_call_position: Vec<BreakdownRow>,
    pub by_call_seat: Vec<BreakdownRow>,
    pub by_call_relation: Vec<BreakdownRow>,
    pub by_variant: Vec<BreakdownRow>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>, run_id: &str) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown(run_id)).map_err(|source| {
            AnalyticsError::Io {
                context: "writing summary markdown",
                source,
            }
        })
    }

    pub fn render_markdown(&self, run_id: &str) -> String {
        let overall = &self.overall.tally;
        let mut out = String::new();
        out.push_str("# Euchre Simulation Summary\n\n");
        let _ = writeln!(out, "Run: `{run_id}` ({mode:?})\n", mode = self.mode);
        let _ = writeln!(
            out,
            "Deals: {deals} | Bids: {bids} | Passed out: {passes} | Makes: {makes} | Marches: {marches} | Euchres: {euchres}\n",
            deals = overall.deals,
            bids = overall.bids,
            passes = overall.passes(),
            makes = overall.makes,
            marches = overall.marches,
            euchres = overall.euchres,
        );
        let _ = writeln!(
            out,
            "Make-rate intervals are Wilson score intervals at z = {:.3}.\n",
            self.z
        );

        push_table(&mut out, "Overall", std::slice::from_ref(&self.overall));
        push_table(&mut out, "By turncard level", &self.by_turncard_level);
        push_table(&mut out, "By call position", &self.by_call_position);
        push_table(&mut out, "By call seat", &self.by_call_seat);
        push_table(&mut out, "By call suit", &self.by_call_relation);
        if !self.by_variant.is_empty() {
            push_table(&mut out, "By forced-bid variant", &self.by_variant);
        }
        out
    }
}

fn push_table(out: &mut String, title: &str, rows: &[BreakdownRow]) {
    let _ = writeln!(out, "## {title}\n");
    out.push_str("| Slice | Deals | Bids | Makes | Marches | Euchres | Points | Avg pts/bid | Make % | 95% CI |\n");
    out.push_str("|-------|-------|------|-------|---------|---------|--------|-------------|--------|--------|\n");
    for row in rows {
        let t = &row.tally;
        let _ = writeln!(
            out,
            "| {label} | {deals} | {bids} | {makes} | {marches} | {euchres} | {points:+} | {avg:+.3} | {rate:.1}% | [{lo:.3}, {hi:.3}] |",
            label = row.label,
            deals = t.deals,
            bids = t.bids,
            makes = t.makes,
            marches = t.marches,
            euchres = t.euchres,
            points = t.points,
            avg = row.avg_points,
            rate = row.make_rate * 100.0,
            lo = row.make_ci.0,
            hi = row.make_ci.1,
        );
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsCollector, wilson_interval};
    use crate::config::RunMode;
    use euchre_core::game::record::DealRecord;
    use euchre_core::model::player::Seat;
    use euchre_core::model::suit::{CallRelation, Suit};

    fn record(call_position: Option<u8>, caller_tricks: u8, points: i8) -> DealRecord {
        let called = call_position.is_some();
        DealRecord {
            dealer_seat: Seat::West,
            turncard_suit: Suit::Hearts,
            turncard_level: 6,
            call_position,
            call_seat: call_position.map(|p| Seat::at_position(Seat::West, usize::from(p))),
            call_suit: called.then_some(Suit::Hearts),
            call_suit_relation: called.then_some(CallRelation::Turn),
            caller_tricks: called.then_some(caller_tricks),
            team_tricks: [caller_tricks, 5 - caller_tricks],
            points,
            team_points: [points.max(0) as u8, 0],
        }
    }

    #[test]
    fn wilson_interval_matches_reference_values() {
        let (lo, hi) = wilson_interval(8, 10, 1.959_963_984_540_054);
        assert!((lo - 0.490).abs() < 1e-3, "low {lo}");
        assert!((hi - 0.943).abs() < 1e-3, "high {hi}");
        assert_eq!(wilson_interval(0, 0, 1.96), (0.0, 0.0));
        let (lo, hi) = wilson_interval(0, 20, 1.96);
        assert_eq!(lo, 0.0);
        assert!(hi > 0.0 && hi < 0.2);
    }

    #[test]
    fn collector_tallies_outcomes() {
        let mut collector = AnalyticsCollector::new(RunMode::Matches).expect("collector");
        assert!((collector.z - 1.96).abs() < 1e-3);
        collector.record_deal(&record(Some(0), 5, 2), None);
        collector.record_deal(&record(Some(0), 3, 1), None);
        collector.record_deal(&record(Some(4), 2, -2), None);
        collector.record_deal(&record(None, 0, 0), None);

        let summary = collector.finalize();
        let overall = summary.overall.tally;
        assert_eq!(overall.deals, 4);
        assert_eq!(overall.bids, 3);
        assert_eq!(overall.passes(), 1);
        assert_eq!(overall.makes, 2);
        assert_eq!(overall.marches, 1);
        assert_eq!(overall.euchres, 1);
        assert_eq!(overall.points, 1);

        assert_eq!(summary.by_call_position.len(), 8);
        assert_eq!(summary.by_call_position[0].tally.bids, 2);
        assert_eq!(summary.by_call_position[4].tally.euchres, 1);
        // West deals, so positions 0 and 4 both belong to North.
        assert_eq!(summary.by_call_seat[Seat::North.index()].tally.bids, 3);
        assert_eq!(summary.by_call_relation[0].tally.bids, 3);
        assert_eq!(summary.by_turncard_level.len(), 1);
        assert!(summary.by_variant.is_empty());
    }

    #[test]
    fn markdown_lists_variants_only_when_swept() {
        let mut collector = AnalyticsCollector::new(RunMode::BidSweep).expect("collector");
        collector.record_deal(&record(Some(1), 4, 1), Some(1));
        let text = collector.finalize().render_markdown("sweep");
        assert!(text.starts_with("# Euchre Simulation Summary"));
        assert!(text.contains("## By forced-bid variant"));
        assert!(text.contains("| variant 01 | 1 | 1 | 1 |"));

        let text = AnalyticsCollector::new(RunMode::Matches)
            .expect("collector")
            .finalize()
            .render_markdown("empty");
        assert!(!text.contains("forced-bid variant"));
    }
}
