//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The User-Agent string the HTTP client identifies itself with.
/// Feel free to override it when initing this library.
pub static USER_AGENT: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("Noticeboard".to_string())));
