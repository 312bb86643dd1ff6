//! Character-by-character text reveal state.
//!
//! The typewriter itself holds no timer: the engine loop owns the tick
//! deadline and calls [`Typewriter::advance`] once per tick. Dropping or
//! replacing the engine's deadline is what cancels a reveal, so a stale tick
//! against a superseded scene cannot happen.

/// Every third character starting from the first triggers a typing cue.
const TYPING_CUE_STRIDE: usize = 3;

#[derive(Debug)]
pub struct Typewriter {
    text: &'static str,
    char_len: usize,
    revealed: usize,
}

/// Result of revealing one more character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub revealed: usize,
    /// Request a "typing" cue for this tick.
    pub cue: bool,
    /// The reveal just reached the end of the text.
    pub completed: bool,
}

impl Typewriter {
    /// A typewriter with nothing to reveal, for text-less scenes.
    pub fn idle() -> Self {
        Self::start("")
    }

    pub fn start(text: &'static str) -> Self {
        Self {
            text,
            char_len: text.chars().count(),
            revealed: 0,
        }
    }

    /// Reveal exactly one character. No-op once the text is fully revealed.
    pub fn advance(&mut self) -> TickOutcome {
        if !self.is_revealing() {
            return TickOutcome {
                revealed: self.revealed,
                cue: false,
                completed: false,
            };
        }
        let cue = self.revealed % TYPING_CUE_STRIDE == 0;
        self.revealed += 1;
        TickOutcome {
            revealed: self.revealed,
            cue,
            completed: !self.is_revealing(),
        }
    }

    /// Jump to the fully revealed state. Returns whether anything changed,
    /// so a second call never produces a duplicate completion signal.
    pub fn complete_immediately(&mut self) -> bool {
        if self.revealed == self.char_len {
            return false;
        }
        self.revealed = self.char_len;
        true
    }

    pub fn is_revealing(&self) -> bool {
        self.revealed < self.char_len
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.char_len
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Revealed prefix of the text, always on a character boundary.
    pub fn revealed_text(&self) -> &'static str {
        match self.text.char_indices().nth(self.revealed) {
            Some((byte, _)) => &self.text[..byte],
            None => self.text,
        }
    }
}
