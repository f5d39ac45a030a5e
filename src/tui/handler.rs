use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    Select,
    StartReading,
    OpenJourney,
    Back,
    NextPage,
    PrevPage,
    ScrollUp,
    ScrollDown,
    ToggleBookmark,
    ShowBookmarks,
    ToggleReading,
    CyclePlaybackRate,
    CollectReward,
    ShowHelp,
    HideHelp,
}

/// Which key map applies, from the topmost layer down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Help,
    Celebration,
    Home,
    Journey,
    Reader,
    Bookmarks,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // Any key closes help
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::Celebration => Some(AppAction::CollectReward),

        InputMode::Home => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Enter => Some(AppAction::Select),
            KeyCode::Char('c') | KeyCode::Char(' ') => Some(AppAction::StartReading),
            KeyCode::Char('a') => Some(AppAction::OpenJourney),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::Journey => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('a') => Some(AppAction::Back),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::Bookmarks => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Enter => Some(AppAction::Select),
            KeyCode::Esc | KeyCode::Char('B') => Some(AppAction::Back),
            _ => None,
        },

        InputMode::Reader => match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(AppAction::Quit),
            (KeyCode::Esc, _) | (KeyCode::Char('i'), _) => Some(AppAction::Back),

            (KeyCode::Right, _) | (KeyCode::Char('l'), _) | (KeyCode::Char('n'), _) => {
                Some(AppAction::NextPage)
            }
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) | (KeyCode::Char('p'), _) => {
                Some(AppAction::PrevPage)
            }

            (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
                Some(AppAction::ScrollDown)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
                Some(AppAction::ScrollUp)
            }
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),

            (KeyCode::Char('b'), KeyModifiers::NONE) => Some(AppAction::ToggleBookmark),
            (KeyCode::Char('B'), _) => Some(AppAction::ShowBookmarks),
            (KeyCode::Char(' '), _) | (KeyCode::Char('r'), _) => Some(AppAction::ToggleReading),
            (KeyCode::Char('s'), _) => Some(AppAction::CyclePlaybackRate),

            (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),
            _ => None,
        },
    }
}

pub fn handle_mouse_event(mouse: MouseEvent, mode: InputMode) -> Option<AppAction> {
    if mode != InputMode::Reader {
        return None;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(AppAction::ScrollDown),
        MouseEventKind::ScrollUp => Some(AppAction::ScrollUp),
        _ => None,
    }
}
