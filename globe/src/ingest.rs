//! Raw TLE text in, propagatable orbital records out

use crate::{orbital::OrbitalModel, units::Timestamp};
use globe_tle::{parse_tle_set, TleSet};
use regex::Regex;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// One tracked object. Immutable once ingested; renderable objects share it.
#[derive(Debug)]
pub struct OrbitalRecord<S> {
    id: String,
    state: S,
}

impl<S> OrbitalRecord<S> {
    pub fn new(id: impl Into<String>, state: S) -> Self {
        OrbitalRecord {
            id: id.into(),
            state,
        }
    }

    /// Display name
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

pub type SharedRecord<S> = Rc<OrbitalRecord<S>>;

#[derive(Clone, Debug)]
pub struct IngestOptions {
    /// Working set cap, survivors past it are dropped
    pub max_objects: usize,
    /// Keep only objects whose cleaned name matches
    pub name_filter: Option<Regex>,
}

impl IngestOptions {
    pub const DEFAULT_MAX_OBJECTS: usize = 1500;
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            max_objects: Self::DEFAULT_MAX_OBJECTS,
            name_filter: None,
        }
    }
}

/// What happened to every group in the input
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct IngestReport {
    /// Well-formed name + two element line groups
    pub groups: usize,
    pub malformed: usize,
    pub filtered: usize,
    pub parse_failures: usize,
    pub probe_failures: usize,
    /// Groups left unexamined once the cap was reached
    pub truncated: usize,
    pub accepted: usize,
}

/// Trim the name line and strip a leading `0 ` line number
pub fn clean_name(raw: &str) -> &str {
    let name = raw.trim();
    match name.strip_prefix("0 ") {
        Some(rest) => rest.trim_start(),
        None => name,
    }
}

/// Parse `raw` into records, keeping input order. Each survivor has
/// propagated successfully once at `now`.
pub fn ingest<M: OrbitalModel>(
    model: &M,
    raw: &str,
    opts: &IngestOptions,
    now: Timestamp,
) -> (Vec<SharedRecord<M::State>>, IngestReport) {
    let tle_set = match parse_tle_set(raw) {
        Ok((_rest, set)) => set,
        Err(e) => {
            warn!(err = %e, "Failed to split the dataset into TLE groups");
            TleSet::default()
        }
    };

    let mut report = IngestReport {
        groups: tle_set.entries.len(),
        malformed: tle_set.malformed.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(tle_set.len().min(opts.max_objects));

    for (idx, tle) in tle_set.entries.iter().enumerate() {
        if records.len() >= opts.max_objects {
            report.truncated = tle_set.len() - idx;
            break;
        }

        let name = clean_name(&tle.name);
        if let Some(filter) = &opts.name_filter {
            if !filter.is_match(name) {
                report.filtered += 1;
                continue;
            }
        }

        let state = match model.parse(&tle.line1, &tle.line2) {
            Ok(s) => s,
            Err(e) => {
                debug!(name, err = %e, "Dropping TLE that failed to parse");
                report.parse_failures += 1;
                continue;
            }
        };

        if let Err(e) = model.propagate(&state, now) {
            debug!(name, err = %e, "Dropping TLE that failed its probe propagation");
            report.probe_failures += 1;
            continue;
        }

        records.push(Rc::new(OrbitalRecord::new(name, state)));
    }

    report.accepted = records.len();
    info!(
        accepted = report.accepted,
        groups = report.groups,
        malformed = report.malformed,
        filtered = report.filtered,
        parse_failures = report.parse_failures,
        probe_failures = report.probe_failures,
        truncated = report.truncated,
        "Ingested dataset"
    );
    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        orbital::Sgp4Model,
        test_support::{tle_group, ts, FakeModel},
    };
    use indoc::indoc;

    fn ids<S>(records: &[SharedRecord<S>]) -> Vec<&str> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn name_cleaning() {
        assert_eq!(clean_name("0 ISS (ZARYA)"), "ISS (ZARYA)");
        assert_eq!(clean_name("  0 ISS (ZARYA)  "), "ISS (ZARYA)");
        assert_eq!(clean_name("STARLINK-1007"), "STARLINK-1007");
        assert_eq!(clean_name("0"), "0");
        assert_eq!(clean_name("10 LETTERS"), "10 LETTERS");
    }

    #[test]
    fn probe_failure_is_dropped_and_ordinal_stripped() {
        let raw = format!(
            "{}{}",
            tle_group("0 ISS (ZARYA)", "25544"),
            tle_group("0 DECAYED", "99999")
        );
        let model = FakeModel::rejecting_propagate(&["99999"]);
        let (records, report) = ingest(&model, &raw, &IngestOptions::default(), ts("2020-07-13T00:00:00Z"));
        assert_eq!(ids(&records), vec!["ISS (ZARYA)"]);
        assert_eq!(report.probe_failures, 1);
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn parse_failures_and_malformed_groups_are_skipped() {
        let raw = format!(
            "{}ORPHAN NAME\n{}{}",
            tle_group("A", "00001"),
            tle_group("B", "00002"),
            tle_group("C", "00003")
        );
        let model = FakeModel::rejecting_parse(&["00002"]);
        let (records, report) = ingest(&model, &raw, &IngestOptions::default(), ts("2020-07-13T00:00:00Z"));
        assert_eq!(ids(&records), vec!["A", "C"]);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(report.groups, 3);
    }

    #[test]
    fn cap_preserves_input_order() {
        let raw: String = (0..10)
            .map(|n| tle_group(&format!("SAT {n}"), &format!("{:05}", n + 1)))
            .collect();
        // Every other one fails its probe
        let model = FakeModel::rejecting_propagate(&["00002", "00004", "00006", "00008", "00010"]);
        let opts = IngestOptions {
            max_objects: 3,
            ..Default::default()
        };
        let (records, report) = ingest(&model, &raw, &opts, ts("2020-07-13T00:00:00Z"));
        assert_eq!(ids(&records), vec!["SAT 0", "SAT 2", "SAT 4"]);
        assert_eq!(report.probe_failures, 2);
        assert_eq!(report.truncated, 5);
    }

    #[test]
    fn never_more_records_than_groups() {
        let raw: String = (0..4)
            .map(|n| tle_group(&format!("SAT {n}"), &format!("{:05}", n + 1)))
            .collect();
        let model = FakeModel::default();
        let (records, report) = ingest(&model, &raw, &IngestOptions::default(), ts("2020-07-13T00:00:00Z"));
        assert_eq!(records.len(), 4);
        assert_eq!(report.truncated, 0);
    }

    #[test]
    fn name_filter() {
        let raw = format!(
            "{}{}{}",
            tle_group("0 STARLINK-1007", "44713"),
            tle_group("0 ISS (ZARYA)", "25544"),
            tle_group("0 STARLINK-1008", "44714")
        );
        let opts = IngestOptions {
            name_filter: Some(Regex::new("^STARLINK").unwrap()),
            ..Default::default()
        };
        let (records, report) = ingest(&FakeModel::default(), &raw, &opts, ts("2020-07-13T00:00:00Z"));
        assert_eq!(ids(&records), vec!["STARLINK-1007", "STARLINK-1008"]);
        assert_eq!(report.filtered, 1);
    }

    #[test]
    fn sgp4_dataset() {
        let raw = indoc! {"
            0 ISS (ZARYA)
            1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
            2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
            0 NOT AN ORBIT
            1 99999U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
            2 99999  51.6461 221.2784 0001413  89.1723 280.4612 GARBAGE GARBAGE
        "};
        let (records, report) = ingest(&Sgp4Model, raw, &IngestOptions::default(), ts("2020-07-13T00:00:00Z"));
        assert_eq!(ids(&records), vec!["ISS (ZARYA)"]);
        assert_eq!(report.parse_failures, 1);
    }

    #[test]
    fn empty_dataset() {
        let (records, report) = ingest(&Sgp4Model, "", &IngestOptions::default(), ts("2020-07-13T00:00:00Z"));
        assert!(records.is_empty());
        assert_eq!(report, IngestReport::default());
    }
}
