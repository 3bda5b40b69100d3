//! Media module for item representation and parsing.

pub mod item;
pub mod parser;

pub use item::{MediaItem, MediaKind};
pub use parser::{extract_file_id, is_direct_media_url, parse_mosaic_item};
