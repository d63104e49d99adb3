mod display;
mod window;

pub use display::Screen;
pub use window::{Rect, Window, WindowId};
