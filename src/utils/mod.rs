//! Small shared helpers.

pub mod hash;
pub mod html;
pub mod mime;
pub mod plural;
pub mod slug;

pub use plural::plural_count;
