use super::{LogModel, ModelEvent};
use crate::{
    record::{LogRecord, Timestamp},
    view::index_at_or_before,
};
use std::ops::Range;

impl<'a> LogModel<'a> {
    pub fn selected_record(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&LogRecord<'a>> {
        self.records().get(self.selected)
    }

    /// half-open index range into the active view
    pub fn marked_region(&self) -> Range<usize> {
        self.marked.clone()
    }

    pub fn is_marking(&self) -> bool {
        self.marking_anchor.is_some()
    }

    /// selects `index` in the filtered records, ignored when out of range
    ///
    /// while marking is active the marked region is stretched from the
    /// marking anchor to the new selection
    pub fn set_selected_record(&mut self, index: usize) {
        if index >= self.filtered_count() {
            log::debug!(
                "LogModel: ignoring selection {} beyond {} records",
                index,
                self.filtered_count()
            );
            return;
        }
        self.select(index);
    }

    pub fn try_select_next_record(&mut self) {
        if self.selected + 1 < self.filtered_count() {
            self.select(self.selected + 1);
        }
    }

    pub fn try_select_prev_record(&mut self) {
        if self.selected > 0 {
            self.select(self.selected - 1);
        }
    }

    /// selects the first record stamped `timestamp`, or the closest one before it
    pub fn select_record_by_timestamp(&mut self, timestamp: Timestamp) {
        if self.records().is_empty() {
            return;
        }
        let index = index_at_or_before(self.records(), timestamp);
        self.select(index);
    }

    pub fn set_marked_region(&mut self, begin: usize, end: usize) {
        if begin > end || end > self.filtered_count() {
            log::debug!(
                "LogModel: ignoring marked region {}..{} over {} records",
                begin,
                end,
                self.filtered_count()
            );
            return;
        }
        self.marked = begin..end;
        self.notify_marked_region();
    }

    /// starts marking at the selected record, or stops extending the mark
    ///
    /// while marking, every selection change stretches the marked region
    /// between the starting record and the new selection
    pub fn toggle_marking(&mut self) {
        if self.marking_anchor.take().is_some() {
            return;
        }
        if self.records().is_empty() {
            return;
        }
        self.marking_anchor = Some(self.selected);
        self.marked = self.selected..self.selected + 1;
        self.notify_marked_region();
    }

    pub(super) fn select(&mut self, index: usize) {
        self.selected = index;
        self.notify(ModelEvent::SelectionChanged(index));

        if let Some(anchor) = self.marking_anchor {
            self.marked = anchor.min(index)..anchor.max(index) + 1;
            self.notify_marked_region();
        }
    }
}
