//! Input focus state.
//!
//! Key bindings consult the current [`Focus`] so that a key the search input
//! legitimately consumes (Enter while typing) is not also treated as a
//! global shortcut.

/// Where keyboard input currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The search text input has focus; typed keys edit the query.
    SearchInput,

    /// Focus is anywhere else (result list, detail view, nothing).
    #[default]
    Elsewhere,
}

impl Focus {
    #[must_use]
    pub const fn is_typing(self) -> bool {
        matches!(self, Self::SearchInput)
    }
}
