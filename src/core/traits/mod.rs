pub mod key_filter;
pub mod key_list_model;
pub mod key_list_observer;
pub mod key_list_view;
pub mod key_source;
