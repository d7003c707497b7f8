use super::LogModel;
use crate::filter::SubstringMatcher;
use std::ops::Range;

impl<'a> LogModel<'a> {
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// sets the search text and jumps to the first match at or after the
    /// selection. An empty text clears the search.
    pub fn search_for_message(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.search_matcher = SubstringMatcher::new(self.search_text.as_str());
        if self.search_text.is_empty() {
            return;
        }
        let start = self.selected;
        if let Some(index) = self.find_forward(start) {
            self.select(index);
        }
    }

    pub fn search_next_entry(&mut self) {
        if self.search_text.is_empty() {
            return;
        }
        if let Some(index) = self.find_forward(self.selected + 1) {
            self.select(index);
        }
    }

    pub fn search_prev_entry(&mut self) {
        if self.search_text.is_empty() || self.selected == 0 {
            return;
        }
        if let Some(index) = self.find_backward(self.selected) {
            self.select(index);
        }
    }

    /// byte ranges of the search text inside `message`, for highlighting
    pub fn search_matches(&self, message: &[u8]) -> Vec<Range<usize>> {
        self.search_matcher.find_ranges(message)
    }

    fn find_forward(&self, start: usize) -> Option<usize> {
        let records = self.records();
        records
            .get(start..)?
            .iter()
            .position(|record| self.search_matcher.is_match(record.message))
            .map(|offset| start + offset)
    }

    // searches the records before `end`, nearest first
    fn find_backward(&self, end: usize) -> Option<usize> {
        let records = self.records();
        records
            .get(..end)?
            .iter()
            .rposition(|record| self.search_matcher.is_match(record.message))
    }
}
