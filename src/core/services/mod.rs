pub mod builtin_filters;
pub mod flat_key_list;
pub mod hierarchical_key_list;
pub mod key_filter_manager;
pub mod key_index;
pub mod key_list_filter;
