//! Document title presentation context.
//!
//! The detail view advertises the open movie through an injected
//! [`TitleContext`] instead of mutating global state.

use std::cell::RefCell;
use std::rc::Rc;

/// Title shown when no movie detail is open.
pub const DEFAULT_TITLE: &str = "usePopcorn";

/// Title shown while the detail for `movie_title` is open.
#[must_use]
pub fn movie_title(movie_title: &str) -> String {
    format!("Movie: {movie_title}")
}

/// Receives the active document title.
pub trait TitleContext {
    fn set_title(&mut self, title: &str);
}

impl<F> TitleContext for F
where
    F: FnMut(&str),
{
    fn set_title(&mut self, title: &str) {
        self(title);
    }
}

/// Title holder whose clones share one value.
///
/// # Examples
///
/// ```
/// use popcorn::app::title::{DocumentTitle, TitleContext, DEFAULT_TITLE};
///
/// let title = DocumentTitle::default();
/// let mut writer = title.clone();
/// writer.set_title("Movie: Batman");
/// assert_eq!(title.current(), "Movie: Batman");
/// writer.set_title(DEFAULT_TITLE);
/// assert_eq!(title.current(), "usePopcorn");
/// ```
#[derive(Debug, Clone)]
pub struct DocumentTitle {
    current: Rc<RefCell<String>>,
}

impl Default for DocumentTitle {
    fn default() -> Self {
        Self {
            current: Rc::new(RefCell::new(DEFAULT_TITLE.to_string())),
        }
    }
}

impl DocumentTitle {
    #[must_use]
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }
}

impl TitleContext for DocumentTitle {
    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.current.borrow_mut());
    }
}
