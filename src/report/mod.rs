//! Per-sender frequency reporting.
//!
//! Messages are consumed lazily, bucketed by a grouping key and summed with
//! a measure. A message that fails to read, key or measure is logged,
//! recorded to an [`ErrorSink`] and left out; the rest of the run goes on.

pub mod format;
pub mod key;
pub mod measure;

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errlog::{ErrorRecord, ErrorSink};
use crate::error::{MboxError, Result};
use crate::model::message::Message;

/// Accumulated value per grouping key.
///
/// Keys remember the order in which they were first seen so that ties keep
/// their original relative order when sorted.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    totals: HashMap<String, u64>,
    order: Vec<String>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the total of `key`.
    pub fn add(&mut self, key: String, value: u64) {
        match self.totals.get_mut(&key) {
            Some(total) => *total = total.saturating_add(value),
            None => {
                self.order.push(key.clone());
                self.totals.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.totals.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Key → total mapping, without ordering.
    pub fn totals(&self) -> &HashMap<String, u64> {
        &self.totals
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.totals[key]))
    }

    /// Keep only keys whose total is strictly greater than `threshold`.
    pub fn above(self, threshold: u64) -> Self {
        let Self { totals, order } = self;
        let order: Vec<String> = order
            .into_iter()
            .filter(|key| totals[key] > threshold)
            .collect();
        let totals = order
            .iter()
            .map(|key| (key.clone(), totals[key]))
            .collect();
        Self { totals, order }
    }

    /// `(key, total)` pairs, largest first; ties stay in first-seen order.
    pub fn into_sorted(self) -> Vec<(String, u64)> {
        let Self { mut totals, order } = self;
        let mut rows: Vec<(String, u64)> = order
            .into_iter()
            .map(|key| {
                let total = totals.remove(&key).unwrap_or_default();
                (key, total)
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// Runs the aggregation and records per-message failures.
pub struct Reporter<'a> {
    sink: &'a mut dyn ErrorSink,
    verbose: bool,
    progress: Option<&'a dyn Fn(u64)>,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut dyn ErrorSink) -> Self {
        Self {
            sink,
            verbose: false,
            progress: None,
        }
    }

    /// Also emit captured stack traces as debug events.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Called with the number of messages consumed so far.
    pub fn with_progress(mut self, progress: &'a dyn Fn(u64)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sum `measure` per `group_by` key over `messages`.
    pub fn accumulate<I, G, M>(&mut self, messages: I, group_by: G, measure: M) -> FrequencyTable
    where
        I: IntoIterator<Item = Result<Message>>,
        G: Fn(&Message) -> Result<String>,
        M: Fn(&Message) -> Result<u64>,
    {
        let mut table = FrequencyTable::new();
        let mut processed: u64 = 0;

        for item in messages {
            match item {
                Ok(message) => {
                    let outcome = group_by(&message)
                        .and_then(|key| measure(&message).map(|value| (key, value)));
                    match outcome {
                        Ok((key, value)) => table.add(key, value),
                        Err(e) => self.record_failure(&e, message.header_data()),
                    }
                }
                Err(e) => {
                    let context = match &e {
                        MboxError::MessageRead { entry, .. } => {
                            serde_json::to_value(entry).unwrap_or(Value::Null)
                        }
                        _ => Value::Null,
                    };
                    self.record_failure(&e, context);
                }
            }

            processed += 1;
            if let Some(cb) = self.progress {
                cb(processed);
            }
        }

        debug!(messages = processed, senders = table.len(), "Finished processing messages");
        table
    }

    /// Accumulate, filter by `threshold` and sort descending.
    ///
    /// Fails with [`MboxError::NoQualifyingSenders`] when nothing is left.
    pub fn report<I, G, M>(
        &mut self,
        messages: I,
        group_by: G,
        measure: M,
        threshold: u64,
    ) -> Result<Vec<(String, u64)>>
    where
        I: IntoIterator<Item = Result<Message>>,
        G: Fn(&Message) -> Result<String>,
        M: Fn(&Message) -> Result<u64>,
    {
        let table = self.accumulate(messages, group_by, measure);

        info!(threshold, "Filtering frequencies");
        let filtered = table.above(threshold);
        debug!(senders = filtered.len(), "Filtered senders");

        if filtered.is_empty() {
            return Err(MboxError::NoQualifyingSenders { threshold });
        }
        Ok(filtered.into_sorted())
    }

    fn record_failure(&mut self, e: &MboxError, message: Value) {
        error!(error = %e, "Error processing message");
        let record = ErrorRecord::capture(e, message);
        if self.verbose {
            debug!("{}", record.backtrace);
        }
        if let Err(log_err) = self.sink.append(&record) {
            warn!(error = %log_err, "Could not record message failure");
        }
    }
}
