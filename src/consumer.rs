use crate::filter_object::FilterObject;
use std::cell::RefCell;
use std::rc::Rc;

/// A list or grid that fetches data with a pane's filters
pub trait DataConsumer {
    /// Replace the filters used for the next fetch
    fn update_filters(&mut self, filters: &FilterObject);

    fn get_new_data(&mut self);
}

/// Lets the caller keep a handle on a consumer owned by a manager
impl<C: DataConsumer> DataConsumer for Rc<RefCell<C>> {
    fn update_filters(&mut self, filters: &FilterObject) {
        self.borrow_mut().update_filters(filters);
    }

    fn get_new_data(&mut self) {
        self.borrow_mut().get_new_data();
    }
}
