//! Navigation intents
//!
//! Actions never move the user around themselves. They hand back where
//! the front end should go next and leave routing to it.

use std::fmt;

/// Screens an action can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }

    /// True when `current_path` is this route or nested under it
    pub fn is_active(&self, current_path: &str) -> bool {
        match self {
            Route::Home => current_path == "/",
            Route::Login => current_path.starts_with(Route::Login.path()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// How the front end should move to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Add the route to history
    Push(Route),
    /// Replace the current history entry
    Replace(Route),
}

impl Navigation {
    pub fn route(&self) -> Route {
        match self {
            Navigation::Push(route) | Navigation::Replace(route) => *route,
        }
    }
}
