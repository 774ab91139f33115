use crate::core::models::model_change::ModelChange;
use crate::core::traits::key_list_view::KeyListView;

/// Port for consumers that track structural changes of a key list.
///
/// Observers are called synchronously, in registration order, with the
/// list as it is at that boundary: before the mutation for `*AboutTo*`
/// events, after it otherwise.
pub trait KeyListObserver {
    fn notify(&mut self, change: &ModelChange, view: &dyn KeyListView);
}

/// Registered observers of one key list.
#[derive(Default)]
pub struct Observers {
    list: Vec<Box<dyn KeyListObserver>>,
}

impl Observers {
    pub fn push(&mut self, observer: Box<dyn KeyListObserver>) {
        self.list.push(observer);
    }

    pub fn emit(&mut self, change: ModelChange, view: &dyn KeyListView) {
        for observer in &mut self.list {
            observer.notify(&change, view);
        }
    }
}
