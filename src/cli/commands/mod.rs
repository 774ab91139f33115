pub mod classify;
pub mod filters;
pub mod list;
pub mod tree;
