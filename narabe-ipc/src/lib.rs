pub mod layout;
pub mod window;

pub use layout::{LayoutMessage, LayoutResult, WindowGeometry};
pub use window::{PlacementInfo, ScreenInfo, WindowInfo, WorkArea};
