pub mod json_keyring;
