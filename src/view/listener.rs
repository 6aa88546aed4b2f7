//! Change notifications emitted by [`RatModel`](super::RatModel).

/// Receiver of model change notifications.
///
/// Hosts forward these to their table widget. Every method defaults to a
/// no-op so implementors only override what they need. Column and row
/// indexes are model indexes, the virtual color column included.
pub trait ModelListener {
    /// The cell at `row`, `column` changed.
    fn data_changed(&mut self, row: usize, column: usize) {
        let _ = (row, column);
    }

    /// Columns `first..=last` are about to be inserted.
    fn begin_insert_columns(&mut self, first: usize, last: usize) {
        let _ = (first, last);
    }

    /// Column insertion finished.
    fn end_insert_columns(&mut self) {}

    /// Columns `first..=last` are about to be removed.
    fn begin_remove_columns(&mut self, first: usize, last: usize) {
        let _ = (first, last);
    }

    /// Column removal finished.
    fn end_remove_columns(&mut self) {}

    /// Rows `first..=last` are about to be inserted.
    fn begin_insert_rows(&mut self, first: usize, last: usize) {
        let _ = (first, last);
    }

    /// Row insertion finished.
    fn end_insert_rows(&mut self) {}

    /// Rows `first..=last` are about to be removed.
    fn begin_remove_rows(&mut self, first: usize, last: usize) {
        let _ = (first, last);
    }

    /// Row removal finished.
    fn end_remove_rows(&mut self) {}

    /// The whole model is about to change.
    fn begin_reset(&mut self) {}

    /// The model changed; every cached index is stale.
    fn end_reset(&mut self) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ModelListener for NoopListener {}

/// A recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    DataChanged { row: usize, column: usize },
    BeginInsertColumns { first: usize, last: usize },
    EndInsertColumns,
    BeginRemoveColumns { first: usize, last: usize },
    EndRemoveColumns,
    BeginInsertRows { first: usize, last: usize },
    EndInsertRows,
    BeginRemoveRows { first: usize, last: usize },
    EndRemoveRows,
    BeginReset,
    EndReset,
}

/// Listener that keeps every notification, for hosts that batch updates.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Vec<ModelEvent>,
}

impl RecordingListener {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn events(&self) -> &[ModelEvent] {
        &self.events
    }

    /// Take the recorded notifications, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ModelListener for RecordingListener {
    fn data_changed(&mut self, row: usize, column: usize) {
        self.events.push(ModelEvent::DataChanged { row, column });
    }

    fn begin_insert_columns(&mut self, first: usize, last: usize) {
        self.events.push(ModelEvent::BeginInsertColumns { first, last });
    }

    fn end_insert_columns(&mut self) {
        self.events.push(ModelEvent::EndInsertColumns);
    }

    fn begin_remove_columns(&mut self, first: usize, last: usize) {
        self.events.push(ModelEvent::BeginRemoveColumns { first, last });
    }

    fn end_remove_columns(&mut self) {
        self.events.push(ModelEvent::EndRemoveColumns);
    }

    fn begin_insert_rows(&mut self, first: usize, last: usize) {
        self.events.push(ModelEvent::BeginInsertRows { first, last });
    }

    fn end_insert_rows(&mut self) {
        self.events.push(ModelEvent::EndInsertRows);
    }

    fn begin_remove_rows(&mut self, first: usize, last: usize) {
        self.events.push(ModelEvent::BeginRemoveRows { first, last });
    }

    fn end_remove_rows(&mut self) {
        self.events.push(ModelEvent::EndRemoveRows);
    }

    fn begin_reset(&mut self) {
        self.events.push(ModelEvent::BeginReset);
    }

    fn end_reset(&mut self) {
        self.events.push(ModelEvent::EndReset);
    }
}
