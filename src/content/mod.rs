mod book;
mod segmenter;

pub use book::{reading_time_minutes, PageIndex};
pub use segmenter::{segment, Block, BlockKind};
