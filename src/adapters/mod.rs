pub mod keyring;
pub mod observers;
