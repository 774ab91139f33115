pub mod appearance;
pub mod compliance;
pub mod default_key_filter;
pub mod fingerprint;
pub mod key;
pub mod match_context;
pub mod model_change;
