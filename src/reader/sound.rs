use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Click,
    Hover,
    PageTurn,
    Success,
}

/// Fire-and-forget interface sounds. Implementations must not fail.
pub trait SoundPlayer {
    fn play(&mut self, effect: SoundEffect);
}

/// Rings the terminal bell for clicks and unlocks.
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&mut self, effect: SoundEffect) {
        if matches!(effect, SoundEffect::Click | SoundEffect::Success) {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
        }
    }
}

pub struct Muted;

impl SoundPlayer for Muted {
    fn play(&mut self, _effect: SoundEffect) {}
}
