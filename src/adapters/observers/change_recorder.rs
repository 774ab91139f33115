use std::cell::RefCell;
use std::rc::Rc;

use crate::core::models::model_change::ModelChange;
use crate::core::traits::key_list_observer::KeyListObserver;
use crate::core::traits::key_list_view::KeyListView;

/// Observer that keeps every change it sees.
///
/// Clones share the same log, so one clone can be subscribed to a model
/// while another is kept to inspect what happened.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    log: Rc<RefCell<Vec<ModelChange>>>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<ModelChange> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&ModelChange) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl KeyListObserver for ChangeRecorder {
    fn notify(&mut self, change: &ModelChange, _view: &dyn KeyListView) {
        self.log.borrow_mut().push(change.clone());
    }
}
