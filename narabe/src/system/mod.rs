//! Access to the platform's windows and display.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod win32;
#[cfg(all(unix, not(target_os = "macos")))]
mod wmctrl;
#[cfg(any(target_os = "macos", test))]
mod zorder;

use anyhow::Result;

use crate::core::{Rect, Screen, Window};

pub trait WindowSystem {
    /// Every top-level window, in the order the platform reports them.
    fn list_windows(&self) -> Result<Vec<Window>>;

    fn screen(&self) -> Result<Screen>;

    fn move_resize(&self, window: &Window, frame: Rect) -> Result<()>;

    fn focus(&self, window: &Window) -> Result<()>;
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn connect() -> Result<Box<dyn WindowSystem>> {
    Ok(Box::new(wmctrl::Wmctrl::connect()?))
}

#[cfg(windows)]
pub fn connect() -> Result<Box<dyn WindowSystem>> {
    Ok(Box::new(win32::Win32))
}

#[cfg(target_os = "macos")]
pub fn connect() -> Result<Box<dyn WindowSystem>> {
    Ok(Box::new(macos::SystemEvents::default()))
}

/// Windows as presented to the user: filtered, then sorted by title.
pub fn listed_windows(system: &dyn WindowSystem, show_system: bool) -> Result<Vec<Window>> {
    let mut windows: Vec<Window> = system
        .list_windows()?
        .into_iter()
        .filter(|w| w.is_listable(show_system))
        .collect();
    windows.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(windows)
}
