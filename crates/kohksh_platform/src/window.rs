//! Window presentation settings applied before the loading label is shown

/// Window chrome requested by the shell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Hide the status bar and cover the whole display
    pub fullscreen: bool,
    /// Show the title/action bar
    pub show_title: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fullscreen: true,
            show_title: false,
        }
    }
}
