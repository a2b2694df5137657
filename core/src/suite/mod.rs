//! Aggregated result set keyed by benchmark group and parameter.

mod record;


pub use record::{OutlierCounts, ResultRecord, SamplingMode, parse_size};

use crate::error::{BenchError, Warning};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::warn;

/// Records from one scan; a scan-level problem arrives as a [`Warning`].
pub type ScanItem = Result<ResultRecord, Warning>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedSuite {
    groups: BTreeMap<String, BTreeMap<String, ResultRecord>>,
}

impl AggregatedSuite {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn record_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn group(&self, name: &str) -> Option<&BTreeMap<String, ResultRecord>> {
        self.groups.get(name)
    }

    pub fn get(&self, group: &str, parameter: &str) -> Option<&ResultRecord> {
        self.groups.get(group)?.get(parameter)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, ResultRecord>)> {
        self.groups.iter().map(|(name, params)| (name.as_str(), params))
    }

    pub fn records(&self) -> impl Iterator<Item = &ResultRecord> {
        self.groups.values().flat_map(BTreeMap::values)
    }
}

/// Output of the aggregation stage.
#[derive(Debug, Clone, Default)]
pub struct Aggregated {
    pub suite: AggregatedSuite,
    pub warnings: Vec<Warning>,
}

/// Builds an [`AggregatedSuite`] with last-write-wins semantics.
#[derive(Debug, Default)]
pub struct Aggregator {
    suite: AggregatedSuite,
    warnings: Vec<Warning>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ResultRecord) {
        let params = self.suite.groups.entry(record.group().to_string()).or_default();
        match params.entry(record.parameter().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let err = BenchError::DuplicateKey {
                    group: record.group().to_string(),
                    parameter: record.parameter().to_string(),
                };
                let warning = Warning::from_error(&err).with_path(record.source());
                warn!(
                    previous = %slot.get().source().display(),
                    replacement = %record.source().display(),
                    "{}",
                    err
                );
                self.warnings.push(warning);
                slot.insert(record);
            }
        }
    }

    pub fn record_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn push(&mut self, item: ScanItem) {
        match item {
            Ok(record) => self.insert(record),
            Err(warning) => self.record_warning(warning),
        }
    }

    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ScanItem>,
    {
        for item in items {
            self.push(item);
        }
    }

    /// Fold a batch built elsewhere into this one; `other` wins collisions.
    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        self.warnings.extend(other.warnings);
        for (_, params) in other.suite.groups {
            for (_, record) in params {
                self.insert(record);
            }
        }
        self
    }

    pub fn finish(self) -> Aggregated {
        Aggregated {
            suite: self.suite,
            warnings: self.warnings,
        }
    }
}

pub fn aggregate<I>(items: I) -> Aggregated
where
    I: IntoIterator<Item = ScanItem>,
{
    let mut aggregator = Aggregator::new();
    aggregator.extend(items);
    aggregator.finish()
}
