//! Input handling for the application.
//!
//! Key events are mapped to intents by a pure function; the app applies the
//! intent to its state. This keeps the handler logic testable without a
//! terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Quit the application.
    Quit,
    /// Insert a character into the query.
    InsertChar(char),
    /// Delete the character before the cursor.
    Backspace,
    /// Move the query cursor left.
    CursorLeft,
    /// Move the query cursor right.
    CursorRight,
    /// Submit the current query.
    SubmitSearch,
    /// Cancel the search in progress.
    CancelSearch,
    /// Clear the query text.
    ClearQuery,
    /// Move the result selection down.
    SelectNext,
    /// Move the result selection up.
    SelectPrev,
    /// Positive resolution of the update prompt.
    PromptConfirm,
    /// Negative resolution of the update prompt.
    PromptDismiss,
    /// Toggle the "ignore this update" checkbox.
    PromptToggleIgnore,
}

/// Context the mapping depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    /// An update prompt is open and grabs all keys.
    pub prompt_open: bool,
    /// A search is in flight.
    pub searching: bool,
}

/// Maps a key event to an intent.
#[must_use]
pub fn intent_for_key(key: KeyEvent, ctx: InputContext) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if ctx.prompt_open {
        return match key.code {
            KeyCode::Enter => Some(Intent::PromptConfirm),
            KeyCode::Esc => Some(Intent::PromptDismiss),
            KeyCode::Char('i') => Some(Intent::PromptToggleIgnore),
            _ => None,
        };
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('q' | 'c')) => Some(Intent::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(Intent::ClearQuery),
        (_, KeyCode::Enter) => Some(Intent::SubmitSearch),
        (_, KeyCode::Esc) => {
            if ctx.searching {
                Some(Intent::CancelSearch)
            } else {
                Some(Intent::ClearQuery)
            }
        }
        (_, KeyCode::Backspace) => Some(Intent::Backspace),
        (_, KeyCode::Left) => Some(Intent::CursorLeft),
        (_, KeyCode::Right) => Some(Intent::CursorRight),
        (_, KeyCode::Down) => Some(Intent::SelectNext),
        (_, KeyCode::Up) => Some(Intent::SelectPrev),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            Some(Intent::InsertChar(c))
        }
        _ => None,
    }
}
