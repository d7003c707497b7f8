use crate::{
    filter::{DEFAULT_PARALLEL_FILTER_THRESHOLD, FilterParams, LogFilter, SubstringMatcher},
    merge::MergedView,
    record::{LogLevel, LogRecord, Timestamp},
    view::{LogSource, LogView, index_at_or_before},
};
use chrono::TimeDelta;
use std::{collections::HashSet, ops::Range};

mod navigation;
mod search;

/// configuration for a [`LogModel`]
#[derive(Clone, Debug)]
pub struct ModelDesc {
    /// filters over views larger than this scan their parent in parallel
    pub parallel_filter_threshold: usize,
    /// applied in order right after the sources are loaded
    pub initial_filters: Vec<FilterParams>,
}

impl ModelDesc {
    pub fn new() -> Self {
        Self {
            parallel_filter_threshold: DEFAULT_PARALLEL_FILTER_THRESHOLD,
            initial_filters: Vec::new(),
        }
    }
}

impl Default for ModelDesc {
    fn default() -> Self {
        Self::new()
    }
}

/// state change delivered to subscribed listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    FilterSetChanged,
    SelectionChanged(usize),
    MarkedRegionChanged { begin: usize, end: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ModelEvent)>;

/// timestamps taken before the filter stack changes, used to find the
/// same records again in the new active view
struct Snapshot {
    selected: Timestamp,
    marked: Option<(Timestamp, Timestamp)>,
}

/// loaded sources, the filter stack on top of them, and navigation state
/// over the active (top-most) view
///
/// with a single source the filters stack directly on it, otherwise on a
/// [`MergedView`] of all sources. Navigation state always satisfies
/// `selected < len` (0 when empty) and `marked_begin <= marked_end <= len`.
pub struct LogModel<'a> {
    sources: Vec<LogSource<'a>>,
    merged: Option<MergedView<'a>>,
    filters: Vec<LogFilter<'a>>,
    parallel_filter_threshold: usize,

    selected: usize,
    marked: Range<usize>,
    // record the marked region is extended from, while marking
    marking_anchor: Option<usize>,

    search_text: String,
    search_matcher: SubstringMatcher,

    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl<'a> LogModel<'a> {
    pub fn new(sources: Vec<LogSource<'a>>) -> Self {
        Self::with_desc(sources, ModelDesc::new())
    }

    pub fn with_desc(sources: Vec<LogSource<'a>>, desc: ModelDesc) -> Self {
        let merged = if sources.len() == 1 {
            None
        } else {
            let parents: Vec<&dyn LogView<'a>> =
                sources.iter().map(|s| s as &dyn LogView<'a>).collect();
            Some(MergedView::new(&parents))
        };

        let mut model = Self {
            sources,
            merged,
            filters: Vec::new(),
            parallel_filter_threshold: desc.parallel_filter_threshold,
            selected: 0,
            marked: 0..0,
            marking_anchor: None,
            search_text: String::new(),
            search_matcher: SubstringMatcher::new(""),
            listeners: Vec::new(),
            next_listener_id: 0,
        };
        log::debug!(
            "LogModel: loaded {} records from {} sources",
            model.unfiltered_count(),
            model.sources.len()
        );

        for params in desc.initial_filters {
            model.add_filter(params);
        }
        model
    }

    // ------------------------------------------------------------------
    // views
    // ------------------------------------------------------------------

    pub fn sources(&self) -> &[LogSource<'a>] {
        &self.sources
    }

    pub fn source_labels(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.label()).collect()
    }

    /// the unfiltered view: the merge of all sources, or the only source
    pub fn base_view(&self) -> &dyn LogView<'a> {
        match &self.merged {
            Some(merged) => merged,
            None => &self.sources[0],
        }
    }

    /// the view navigation operates on: the last filter, or the base view
    pub fn active_view(&self) -> &dyn LogView<'a> {
        match self.filters.last() {
            Some(filter) => filter,
            None => self.base_view(),
        }
    }

    pub fn records(&self) -> &[LogRecord<'a>] {
        self.active_view().records()
    }

    pub fn filters(&self) -> &[LogFilter<'a>] {
        &self.filters
    }

    pub fn unfiltered_count(&self) -> usize {
        self.base_view().len()
    }

    pub fn filtered_count(&self) -> usize {
        self.active_view().len()
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    // ------------------------------------------------------------------
    // filter stack
    // ------------------------------------------------------------------

    /// pushes a filter that was built on top of the current active view
    pub fn append_filter(&mut self, filter: LogFilter<'a>) {
        let snapshot = self.snapshot();
        log::debug!("LogModel: appending filter '{}'", filter);
        self.filters.push(filter);
        self.after_filter_set_changed(snapshot);
    }

    pub fn remove_last_filter(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        if let Some(filter) = self.filters.pop() {
            log::debug!("LogModel: removed filter '{}'", filter.params());
        }
        self.after_filter_set_changed(snapshot);
    }

    pub fn remove_all_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        log::debug!("LogModel: removing all {} filters", self.filters.len());
        self.filters.clear();
        self.after_filter_set_changed(snapshot);
    }

    /// builds a filter against the active view and appends it
    pub fn add_filter(&mut self, params: FilterParams) {
        let filter = LogFilter::build(self.active_view(), params, self.parallel_filter_threshold);
        self.append_filter(filter);
    }

    pub fn add_pattern_filter(&mut self, pattern: impl Into<String>, include: bool) {
        self.add_filter(FilterParams::Pattern {
            pattern: pattern.into(),
            include,
        });
    }

    pub fn add_level_filter(&mut self, levels: HashSet<LogLevel>) {
        self.add_filter(FilterParams::Levels(levels));
    }

    fn snapshot(&self) -> Option<Snapshot> {
        let records = self.records();
        let selected = records.get(self.selected)?.timestamp;
        let marked = if self.marked.is_empty() {
            None
        } else {
            records
                .get(self.marked.start)
                .zip(records.get(self.marked.end - 1))
                .map(|(first, last)| (first.timestamp, last.timestamp))
        };
        Some(Snapshot { selected, marked })
    }

    fn after_filter_set_changed(&mut self, snapshot: Option<Snapshot>) {
        self.marking_anchor = None;

        let records = self.records();
        let (selected, marked) = match snapshot {
            Some(snapshot) if !records.is_empty() => {
                let selected = index_at_or_before(records, snapshot.selected);
                let marked = match snapshot.marked {
                    Some((first, last)) => remap_marked(records, first, last),
                    None => 0..0,
                };
                (selected, marked)
            }
            _ => (0, 0..0),
        };
        self.selected = selected;
        self.marked = marked;

        self.notify(ModelEvent::FilterSetChanged);
        self.notify(ModelEvent::SelectionChanged(self.selected));
        self.notify_marked_region();
    }

    // ------------------------------------------------------------------
    // listeners
    // ------------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl FnMut(&ModelEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: ModelEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn notify_marked_region(&mut self) {
        self.notify(ModelEvent::MarkedRegionChanged {
            begin: self.marked.start,
            end: self.marked.end,
        });
    }

    /// time between the first and last marked record, zero when nothing is marked
    pub fn marked_duration(&self) -> TimeDelta {
        if self.marked.is_empty() {
            return TimeDelta::zero();
        }
        let records = self.records();
        match (
            records.get(self.marked.start),
            records.get(self.marked.end - 1),
        ) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => TimeDelta::zero(),
        }
    }
}

/// finds the records stamped within `first..=last` in `records`
fn remap_marked(records: &[LogRecord<'_>], first: Timestamp, last: Timestamp) -> Range<usize> {
    let mut begin = index_at_or_before(records, first);
    if records[begin].timestamp < first {
        begin += 1;
    }
    // past every record sharing the last timestamp
    let end = records.partition_point(|record| record.timestamp <= last);
    if begin > end { begin..begin } else { begin..end }
}
