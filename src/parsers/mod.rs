pub mod html;

pub use html::{Anchor, ParsedPage};
