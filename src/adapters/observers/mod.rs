pub mod change_recorder;
pub mod consistency_checker;
pub mod tracing_observer;
