//! Site content: blog posts and contact messages.

mod blog;
mod contact;

pub use blog::Blog;
pub use contact::{Contact, ContactStatus};
