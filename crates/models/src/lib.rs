pub mod errors;
pub mod post;

pub use post::{Post, PostDraft, PostPatch};
