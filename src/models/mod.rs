mod artifact;
mod bookmark;
mod page;
mod progress;

pub use artifact::{Archetype, ArtifactCard, Rarity};
pub use bookmark::Bookmark;
pub use page::{Book, Page};
pub use progress::ReadingProgress;
