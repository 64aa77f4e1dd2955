pub mod locator;
pub mod page;

pub use locator::{AttrMatch, NodeSelector, SchemaMismatch, find, find_all, required_attr};
pub use page::{ParsedPage, element_text, newlines_to_spaces};
