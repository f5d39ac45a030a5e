use std::time::Instant;

use crate::config::Config;
use crate::content::{reading_time_minutes, segment, Block, PageIndex};
use crate::db::{KeyValueStore, Repository, Storage};
use crate::models::{ArtifactCard, Book, Page, ReadingProgress};
use crate::reader::progress::{self, clamp_progress};
use crate::reader::{
    bookmarks, BlockCursor, BookmarkManager, Catalog, ChapterStatus, ControlsTimer, Gamification,
    Narrator, Navigator, PageTransition, SoundEffect, SoundPlayer,
};
use crate::tui::{AppAction, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Reader,
    Journey,
}

pub struct App<S: KeyValueStore = Repository> {
    // Data
    pub book: Book,
    pub pages: PageIndex,
    pub progress: Option<ReadingProgress>,
    pub bookmarks: BookmarkManager,
    pub gamification: Gamification,

    // UI State
    pub view: View,
    pub navigator: Navigator,
    pub blocks: Vec<Block>,
    pub cursor: BlockCursor,
    pub scroll: u16,
    pub chapter_selected: usize,
    pub bookmark_selected: usize,
    pub show_bookmarks: bool,
    pub show_help: bool,
    pub celebration: Option<ArtifactCard>,
    pub transition: PageTransition,
    pub controls: ControlsTimer,

    // Services
    pub narrator: Narrator,
    sound: Box<dyn SoundPlayer>,
    storage: Storage<S>,
}

impl<S: KeyValueStore> App<S> {
    pub async fn new(
        config: &Config,
        book: Book,
        catalog: Catalog,
        store: S,
        narrator: Narrator,
        sound: Box<dyn SoundPlayer>,
    ) -> Self {
        let storage = Storage::new(store);
        let pages = PageIndex::new(&book.pages);

        for issue in catalog.validate(&pages) {
            tracing::warn!("Artifact catalog: {}", issue);
        }

        let total = book.pages.len();
        let progress = storage
            .load_progress()
            .await
            .map(|p| clamp_progress(p, total));
        let bookmarks = BookmarkManager::load(&storage).await;
        let gamification = Gamification::load(catalog, &storage).await;
        let now = Instant::now();

        Self {
            navigator: Navigator::new(total, 0),
            book,
            pages,
            progress,
            bookmarks,
            gamification,
            view: View::Home,
            blocks: Vec::new(),
            cursor: BlockCursor::default(),
            scroll: 0,
            chapter_selected: 0,
            bookmark_selected: 0,
            show_bookmarks: false,
            show_help: false,
            celebration: None,
            transition: PageTransition::new(config.page_turn_delay(), config.settle_delay()),
            controls: ControlsTimer::new(config.controls_hide_delay(), now),
            narrator,
            sound,
            storage,
        }
    }

    pub fn current_page(&self) -> &Page {
        &self.book.pages[self.navigator.index()]
    }

    pub fn chapters(&self) -> Vec<&Page> {
        self.book.chapters()
    }

    /// Page positions where each chapter starts.
    pub fn chapter_starts(&self) -> Vec<usize> {
        self.chapters()
            .iter()
            .filter_map(|page| self.pages.index_of(page.id))
            .collect()
    }

    pub fn chapter_status(&self, position: usize) -> ChapterStatus {
        progress::chapter_status(
            self.progress.as_ref(),
            &self.chapter_starts(),
            position,
            self.book.pages.len(),
        )
    }

    /// Progress through the book at the page being read.
    pub fn reading_percent(&self) -> u8 {
        progress::percent(self.navigator.index(), self.book.pages.len())
    }

    /// Progress through the book according to the saved record.
    pub fn saved_percent(&self) -> u8 {
        self.progress
            .as_ref()
            .map_or(0, |p| progress::percent(p.last_read_page, self.book.pages.len()))
    }

    pub fn current_chapter_label(&self) -> String {
        progress::current_chapter_label(self.progress.as_ref(), &self.chapters())
    }

    pub fn can_continue(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| p.last_read_page > 0)
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarks.contains(self.current_page().id)
    }

    pub fn reading_time(&self) -> usize {
        reading_time_minutes(self.current_page())
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            return InputMode::Help;
        }
        if self.celebration.is_some() {
            return InputMode::Celebration;
        }
        match self.view {
            View::Home => InputMode::Home,
            View::Journey => InputMode::Journey,
            View::Reader if self.show_bookmarks => InputMode::Bookmarks,
            View::Reader => InputMode::Reader,
        }
    }

    /// Any pointer or key activity brings the reader controls back.
    pub fn register_activity(&mut self, now: Instant) {
        self.controls.touch(now);
    }

    pub async fn handle_action(&mut self, action: AppAction) -> bool {
        self.handle_action_at(action, Instant::now()).await
    }

    pub async fn handle_action_at(&mut self, action: AppAction, now: Instant) -> bool {
        match action {
            AppAction::Quit => {
                self.narrator.stop();
                return true;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::CollectReward => {
                self.celebration = None;
                self.sound.play(SoundEffect::Click);
            }

            AppAction::MoveUp => match self.view {
                View::Home => {
                    self.sound.play(SoundEffect::Hover);
                    self.chapter_selected = self.chapter_selected.saturating_sub(1);
                }
                View::Reader if self.show_bookmarks => {
                    self.bookmark_selected = self.bookmark_selected.saturating_sub(1)
                }
                View::Reader => self.cursor.up(),
                View::Journey => {}
            },

            AppAction::MoveDown => match self.view {
                View::Home => {
                    self.sound.play(SoundEffect::Hover);
                    let len = self.chapters().len();
                    if self.chapter_selected + 1 < len {
                        self.chapter_selected += 1;
                    }
                }
                View::Reader if self.show_bookmarks => {
                    if self.bookmark_selected + 1 < self.bookmarks.len() {
                        self.bookmark_selected += 1;
                    }
                }
                View::Reader => self.cursor.down(self.blocks.len()),
                View::Journey => {}
            },

            AppAction::Select => match self.view {
                View::Home => self.open_chapter(self.chapter_selected, now).await,
                View::Reader if self.show_bookmarks => self.jump_to_bookmark().await,
                _ => {}
            },

            AppAction::StartReading => {
                if self.view == View::Home {
                    let index = self.progress.as_ref().map_or(0, |p| p.last_read_page);
                    self.open_reader(index, now).await;
                }
            }

            AppAction::OpenJourney => {
                if self.view == View::Home {
                    self.sound.play(SoundEffect::Click);
                    self.view = View::Journey;
                }
            }

            AppAction::Back => match self.view {
                View::Journey => {
                    self.sound.play(SoundEffect::Click);
                    self.view = View::Home;
                }
                View::Reader if self.show_bookmarks => self.show_bookmarks = false,
                View::Reader => self.close_reader().await,
                View::Home => {}
            },

            AppAction::NextPage => {
                if self.view == View::Reader {
                    self.turn_page(self.navigator.next_index(), now);
                }
            }

            AppAction::PrevPage => {
                if self.view == View::Reader {
                    self.turn_page(self.navigator.prev_index(), now);
                }
            }

            AppAction::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(5);
            }

            AppAction::ScrollDown => {
                self.scroll = self.scroll.saturating_add(5);
            }

            AppAction::ToggleBookmark => {
                if self.view == View::Reader {
                    let page = &self.book.pages[self.navigator.index()];
                    self.bookmarks.toggle(page, &self.storage).await;
                    self.sound.play(SoundEffect::Click);
                }
            }

            AppAction::ShowBookmarks => {
                if self.view == View::Reader {
                    self.show_bookmarks = true;
                    self.bookmark_selected = 0;
                }
            }

            AppAction::ToggleReading => {
                if self.view == View::Reader {
                    let page = &self.book.pages[self.navigator.index()];
                    self.narrator.toggle(&page.content);
                }
            }

            AppAction::CyclePlaybackRate => {
                if self.view == View::Reader {
                    self.narrator.cycle_rate(now);
                }
            }
        }

        false
    }

    /// Advances timers: page-turn animation, pending speech restarts and
    /// the controls auto-hide.
    pub async fn tick(&mut self, now: Instant) {
        if let Some(target) = self.transition.tick(now) {
            self.enter_page(target).await;
        }
        self.narrator.tick(now);
        let hold = self.show_bookmarks || self.view != View::Reader;
        self.controls.tick(now, hold);
    }

    pub fn poll_speech_events(&mut self) {
        self.narrator.poll_events();
    }

    fn turn_page(&mut self, target: Option<usize>, now: Instant) {
        let Some(target) = target else {
            return;
        };
        self.transition.begin(target, now);
    }

    async fn open_chapter(&mut self, position: usize, now: Instant) {
        let page_id = self.chapters().get(position).map(|page| page.id);
        let index = page_id
            .and_then(|id| self.pages.index_of(id))
            .unwrap_or(0);
        self.open_reader(index, now).await;
    }

    async fn open_reader(&mut self, index: usize, now: Instant) {
        self.sound.play(SoundEffect::Click);
        self.view = View::Reader;
        self.show_bookmarks = false;
        self.transition.cancel();
        self.controls.touch(now);
        self.enter_page(index).await;
    }

    async fn close_reader(&mut self) {
        self.narrator.stop();
        self.transition.cancel();
        self.show_bookmarks = false;
        self.view = View::Home;

        let total = self.book.pages.len();
        self.progress = self
            .storage
            .load_progress()
            .await
            .map(|p| clamp_progress(p, total));
    }

    async fn jump_to_bookmark(&mut self) {
        let Some(bookmark) = self.bookmarks.get(self.bookmark_selected) else {
            return;
        };
        match bookmarks::resolve(bookmark, &self.pages) {
            Some(index) => {
                self.show_bookmarks = false;
                self.transition.cancel();
                self.enter_page(index).await;
            }
            None => {
                tracing::debug!("Bookmark for missing page {} ignored", bookmark.page_id);
            }
        }
    }

    /// Shows page `index` and runs everything tied to a page change.
    async fn enter_page(&mut self, index: usize) {
        if !self.navigator.jump_to(index) {
            tracing::debug!("Ignoring navigation to page {}", index);
            return;
        }

        let page = &self.book.pages[index];
        let page_id = page.id;
        self.blocks = if page.is_image_placeholder {
            Vec::new()
        } else {
            segment(&page.content)
        };
        self.cursor.reset();
        self.scroll = 0;
        self.narrator.stop();
        self.sound.play(SoundEffect::PageTurn);

        match self.storage.save_progress(index).await {
            Ok(progress) => self.progress = Some(progress),
            Err(e) => tracing::warn!("Failed to save progress: {}", e),
        }

        if let Some(artifact) = self.gamification.check_and_unlock(page_id, &self.storage).await {
            self.sound.play(SoundEffect::Success);
            self.celebration = Some(artifact);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::db::{MemoryStore, BOOKMARKS_KEY, PROGRESS_KEY};
    use crate::reader::sound::tests::RecordingPlayer;
    use crate::reader::speech::tests::{Call, FakeSpeech};

    const MS: Duration = Duration::from_millis(1);

    struct Harness {
        app: App<MemoryStore>,
        speech: FakeSpeech,
        sound: RecordingPlayer,
    }

    async fn harness_with(store: MemoryStore) -> Harness {
        let config: Config = toml::from_str("db_path = \":memory:\"").unwrap();
        let speech = FakeSpeech::default();
        let sound = RecordingPlayer::default();
        let (_tx, rx) = mpsc::channel(4);
        let narrator = Narrator::new(
            Box::new(speech.clone()),
            rx,
            config.speech_lang.clone(),
            config.playback_rate,
            config.settle_delay(),
        );
        let app = App::new(
            &config,
            Book::builtin().unwrap(),
            Catalog::builtin(),
            store,
            narrator,
            Box::new(sound.clone()),
        )
        .await;
        Harness { app, speech, sound }
    }

    async fn harness() -> Harness {
        harness_with(MemoryStore::new()).await
    }

    async fn turn(app: &mut App<MemoryStore>, action: AppAction, t: Instant) -> Instant {
        app.handle_action_at(action, t).await;
        app.tick(t + 300 * MS).await;
        app.tick(t + 350 * MS).await;
        t + 400 * MS
    }

    #[tokio::test]
    async fn starts_on_home_without_progress() {
        let h = harness().await;

        assert_eq!(h.app.view, View::Home);
        assert!(h.app.progress.is_none());
        assert!(!h.app.can_continue());
        assert_eq!(h.app.saved_percent(), 0);
        assert_eq!(h.app.current_chapter_label(), "PREFÁCIO");
    }

    #[tokio::test]
    async fn opening_the_reader_records_progress() {
        let mut h = harness().await;

        h.app.handle_action_at(AppAction::StartReading, Instant::now()).await;

        assert_eq!(h.app.view, View::Reader);
        assert_eq!(h.app.navigator.index(), 0);
        assert_eq!(h.app.progress.as_ref().unwrap().last_read_page, 0);
        assert_eq!(h.app.blocks[0].content, "PREFÁCIO");
    }

    #[tokio::test]
    async fn page_turn_waits_for_fade_and_ignores_input_meanwhile() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::NextPage, t0).await;
        h.app.handle_action_at(AppAction::NextPage, t0 + 100 * MS).await;
        h.app.tick(t0 + 200 * MS).await;
        assert_eq!(h.app.navigator.index(), 0);

        h.app.tick(t0 + 300 * MS).await;
        assert_eq!(h.app.navigator.index(), 1);
        assert!(h.app.transition.is_transitioning());

        h.app.handle_action_at(AppAction::NextPage, t0 + 320 * MS).await;
        h.app.tick(t0 + 350 * MS).await;
        assert!(!h.app.transition.is_transitioning());
        assert_eq!(h.app.navigator.index(), 1);
        assert_eq!(h.app.progress.as_ref().unwrap().last_read_page, 1);
        assert!(h.sound.played().contains(&SoundEffect::PageTurn));
    }

    #[tokio::test]
    async fn cannot_turn_before_first_page() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::PrevPage, t0).await;

        assert!(!h.app.transition.is_transitioning());
        assert_eq!(h.app.navigator.index(), 0);
    }

    #[tokio::test]
    async fn trigger_page_unlocks_once() {
        let mut h = harness().await;
        let mut t = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t).await;

        // Page id 6 sits at index 5 in the bundled edition.
        h.app.enter_page(4).await;
        t = turn(&mut h.app, AppAction::NextPage, t).await;

        let artifact = h.app.celebration.clone().expect("celebration");
        assert_eq!(artifact.id, "choice");
        assert_eq!(h.app.input_mode(), InputMode::Celebration);
        assert!(h.sound.played().contains(&SoundEffect::Success));

        h.app.handle_action_at(AppAction::CollectReward, t).await;
        t = turn(&mut h.app, AppAction::PrevPage, t).await;
        turn(&mut h.app, AppAction::NextPage, t).await;

        assert_eq!(h.app.navigator.index(), 5);
        assert!(h.app.celebration.is_none());
        assert_eq!(h.app.gamification.unlocked_ids(), ["choice".to_string()]);
    }

    #[tokio::test]
    async fn leaving_the_reader_stops_speech() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::ToggleReading, t0).await;
        assert!(h.app.narrator.is_reading());

        h.app.handle_action_at(AppAction::Back, t0).await;

        assert_eq!(h.app.view, View::Home);
        assert!(!h.app.narrator.is_reading());
        assert_eq!(h.speech.calls().last(), Some(&Call::Cancel(1)));
    }

    #[tokio::test]
    async fn changing_page_stops_speech() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;
        h.app.handle_action_at(AppAction::ToggleReading, t0).await;

        turn(&mut h.app, AppAction::NextPage, t0).await;

        assert!(!h.app.narrator.is_reading());
    }

    #[tokio::test]
    async fn bookmark_sidebar_jumps_to_page() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;
        h.app.enter_page(3).await;
        h.app.handle_action_at(AppAction::ToggleBookmark, t0).await;
        assert!(h.app.is_bookmarked());
        h.app.enter_page(0).await;

        h.app.handle_action_at(AppAction::ShowBookmarks, t0).await;
        assert_eq!(h.app.input_mode(), InputMode::Bookmarks);
        h.app.handle_action_at(AppAction::Select, t0).await;

        assert_eq!(h.app.navigator.index(), 3);
        assert!(!h.app.show_bookmarks);
    }

    #[tokio::test]
    async fn bookmark_jump_overrides_pending_page_turn() {
        let store = MemoryStore::new().with_value(
            BOOKMARKS_KEY,
            r#"[{"pageId": 11, "chapterTitle": "CAPÍTULO 5: Escapar", "preview": "...", "createdAt": 0}]"#,
        );
        let mut h = harness_with(store).await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::NextPage, t0).await;
        h.app.handle_action_at(AppAction::ShowBookmarks, t0 + 50 * MS).await;
        h.app.handle_action_at(AppAction::Select, t0 + 100 * MS).await;
        assert_eq!(h.app.navigator.index(), 10);

        h.app.tick(t0 + 300 * MS).await;
        h.app.tick(t0 + 400 * MS).await;

        assert_eq!(h.app.navigator.index(), 10);
        assert!(!h.app.transition.is_transitioning());
        assert_eq!(h.app.progress.as_ref().unwrap().last_read_page, 10);
    }

    #[tokio::test]
    async fn stale_bookmark_is_ignored() {
        let stale = r#"[{"pageId": 999, "chapterTitle": "Página 999", "preview": "...", "createdAt": 0}]"#;
        let mut h = harness_with(MemoryStore::new().with_value(BOOKMARKS_KEY, stale)).await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::ShowBookmarks, t0).await;
        h.app.handle_action_at(AppAction::Select, t0).await;

        assert_eq!(h.app.navigator.index(), 0);
        assert!(h.app.show_bookmarks);
    }

    #[tokio::test]
    async fn escape_closes_sidebar_before_reader() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;
        h.app.handle_action_at(AppAction::ShowBookmarks, t0).await;

        h.app.handle_action_at(AppAction::Back, t0).await;
        assert_eq!(h.app.view, View::Reader);

        h.app.handle_action_at(AppAction::Back, t0).await;
        assert_eq!(h.app.view, View::Home);
    }

    #[tokio::test]
    async fn continue_reading_resumes_saved_page() {
        let store = MemoryStore::new().with_value(
            PROGRESS_KEY,
            r#"{"lastReadPage": 8, "lastReadDate": "2026-01-11T12:34:56Z"}"#,
        );
        let mut h = harness_with(store).await;
        assert!(h.app.can_continue());

        h.app.handle_action_at(AppAction::StartReading, Instant::now()).await;

        assert_eq!(h.app.navigator.index(), 8);
    }

    #[tokio::test]
    async fn out_of_range_progress_is_clamped() {
        let store = MemoryStore::new().with_value(
            PROGRESS_KEY,
            r#"{"lastReadPage": 5000, "lastReadDate": "2026-01-11T12:34:56Z"}"#,
        );
        let h = harness_with(store).await;

        let last = h.app.book.pages.len() - 1;
        assert_eq!(h.app.progress.as_ref().unwrap().last_read_page, last);
        assert_eq!(h.app.saved_percent(), 100);
    }

    #[tokio::test]
    async fn chapter_selection_resolves_page_id() {
        let mut h = harness().await;

        h.app.handle_action_at(AppAction::MoveDown, Instant::now()).await;
        h.app.handle_action_at(AppAction::Select, Instant::now()).await;

        let expected = h.app.pages.index_of(h.app.chapters()[1].id).unwrap();
        assert_eq!(h.app.navigator.index(), expected);
    }

    #[tokio::test]
    async fn block_cursor_resets_on_page_change() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::MoveDown, t0).await;
        h.app.handle_action_at(AppAction::MoveDown, t0).await;
        assert_eq!(h.app.cursor.active(), Some(1));

        turn(&mut h.app, AppAction::NextPage, t0).await;
        assert_eq!(h.app.cursor.active(), None);
        assert_eq!(h.app.scroll, 0);
    }

    #[tokio::test]
    async fn controls_hide_only_in_reader_without_sidebar() {
        let mut h = harness().await;
        let t0 = Instant::now();
        h.app.handle_action_at(AppAction::StartReading, t0).await;

        h.app.handle_action_at(AppAction::ShowBookmarks, t0).await;
        h.app.tick(t0 + 5000 * MS).await;
        assert!(h.app.controls.is_visible());

        h.app.handle_action_at(AppAction::Back, t0 + 5000 * MS).await;
        h.app.tick(t0 + 9000 * MS).await;
        assert!(!h.app.controls.is_visible());

        h.app.register_activity(t0 + 9100 * MS);
        assert!(h.app.controls.is_visible());
    }
}
