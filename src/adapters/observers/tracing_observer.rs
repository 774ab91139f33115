use crate::core::models::model_change::ModelChange;
use crate::core::traits::key_list_observer::KeyListObserver;
use crate::core::traits::key_list_view::KeyListView;

/// Logs every structural change at `trace` level.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: &'static str,
}

impl TracingObserver {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl KeyListObserver for TracingObserver {
    fn notify(&mut self, change: &ModelChange, view: &dyn KeyListView) {
        tracing::trace!(
            model = self.label,
            ?change,
            keys = view.len(),
            top_level_rows = view.row_count(None),
            "key list changed"
        );
    }
}
