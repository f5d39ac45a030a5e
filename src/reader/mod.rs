pub mod bookmarks;
pub mod gamification;
pub mod navigation;
pub mod progress;
pub mod sound;
pub mod speech;

pub use bookmarks::BookmarkManager;
pub use gamification::{Catalog, Gamification};
pub use navigation::{BlockCursor, ControlsTimer, Navigator, PageTransition};
pub use progress::ChapterStatus;
pub use sound::{Muted, SoundEffect, SoundPlayer, TerminalBell};
pub use speech::{CommandSpeech, Narrator, NullSpeech, SpeechBackend};
