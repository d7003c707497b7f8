use crate::{
    record::{LogRecord, Timestamp},
    view::LogView,
};
use std::{cmp::Ordering, collections::BinaryHeap};

/// head of one parent's remaining records
#[derive(Debug)]
struct HeapEntry {
    timestamp: Timestamp,
    parent: usize,
    position: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the max-heap pops the earliest record, lower parent first on ties
        (other.timestamp, other.parent).cmp(&(self.timestamp, self.parent))
    }
}

/// k-way merge of several time-ordered views into one
///
/// every parent record appears exactly once. Equal timestamps from different
/// parents come out in parent order, records of one parent keep their order.
#[derive(Clone, Debug)]
pub struct MergedView<'a> {
    records: Vec<LogRecord<'a>>,
    parent_count: usize,
}

impl<'a> MergedView<'a> {
    pub fn new(parents: &[&dyn LogView<'a>]) -> Self {
        let total: usize = parents.iter().map(|parent| parent.len()).sum();
        let mut records = Vec::with_capacity(total);

        let mut heap: BinaryHeap<HeapEntry> = parents
            .iter()
            .enumerate()
            .filter_map(|(parent, view)| {
                view.records().first().map(|record| HeapEntry {
                    timestamp: record.timestamp,
                    parent,
                    position: 0,
                })
            })
            .collect();

        while let Some(entry) = heap.pop() {
            let parent_records = parents[entry.parent].records();
            records.push(parent_records[entry.position]);

            let next = entry.position + 1;
            if let Some(record) = parent_records.get(next) {
                heap.push(HeapEntry {
                    timestamp: record.timestamp,
                    parent: entry.parent,
                    position: next,
                });
            }
        }

        log::debug!(
            "MergedView: merged {} records from {} views",
            records.len(),
            parents.len()
        );

        Self {
            records,
            parent_count: parents.len(),
        }
    }

    pub fn parent_count(&self) -> usize {
        self.parent_count
    }
}

impl<'a> LogView<'a> for MergedView<'a> {
    fn records(&self) -> &[LogRecord<'a>] {
        &self.records
    }
}
