mod api_key;

pub use api_key::{ApiKey, encode_key_pair};
