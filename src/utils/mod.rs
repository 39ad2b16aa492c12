pub mod string_ext;

pub use string_ext::{StringExt, truncate_chars};
