//! Utility helpers shared across the Verdict crates.

pub mod http;
pub mod http_exec;
pub mod ipfs;
pub mod path_processing;
pub mod text_processing;

pub use http_exec::{execute_json_request, get_json, post_json};
pub use ipfs::{IpfsUriError, resolve_ipfs_uri};
pub use path_processing::{format_json_value, select_path};
pub use text_processing::redact_sensitive;
