pub mod media;

pub use media::{Media, MediaType, NewMedia};
