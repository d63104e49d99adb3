use anyhow::{Context, Result};
use narabe_ipc::WindowInfo;

pub type WindowId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub id: WindowId,
    pub title: String,
    pub app_name: Option<String>,
    /// Desktop chrome such as panels, docks and the shell's own windows.
    pub system: bool,
}

impl Window {
    pub fn new(id: WindowId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            app_name: None,
            system: false,
        }
    }

    pub fn is_listable(&self, show_system: bool) -> bool {
        show_system || (!self.system && !self.title.trim().is_empty())
    }

    pub fn to_info(&self) -> WindowInfo {
        WindowInfo {
            id: format!("{:#x}", self.id),
            title: self.title.clone(),
            app_name: self.app_name.clone(),
            system: self.system,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// The overlap of two rects, empty (zero-sized) when they are disjoint.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let width = (self.right().min(other.right()) - i64::from(x)).max(0);
        let height = (self.bottom().min(other.bottom()) - i64::from(y)).max(0);
        Rect::new(x, y, width as u32, height as u32)
    }

    /// Width and height as the signed sizes most platform APIs take.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn signed_size(&self) -> Result<(i32, i32)> {
        let width = i32::try_from(self.width)
            .with_context(|| format!("Width {} is out of range", self.width))?;
        let height = i32::try_from(self.height)
            .with_context(|| format!("Height {} is out of range", self.height))?;
        Ok((width, height))
    }

    /// Moves a rect given relative to `self` into absolute coordinates.
    pub fn offset(&self, inner: Rect) -> Rect {
        Rect {
            x: self.x.saturating_add(inner.x),
            y: self.y.saturating_add(inner.y),
            ..inner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect() {
        let left = Rect::new(0, 0, 1920, 1080);
        let work_area = Rect::new(0, 27, 3840, 1053);
        assert_eq!(left.intersect(work_area), Rect::new(0, 27, 1920, 1053));

        let right = Rect::new(1920, 0, 1920, 1080);
        assert_eq!(right.intersect(work_area), Rect::new(1920, 27, 1920, 1053));
    }

    #[test]
    fn test_signed_size() {
        assert_eq!(Rect::new(10, 20, 640, 480).signed_size().unwrap(), (640, 480));
        assert_eq!(
            Rect::new(0, 0, i32::MAX as u32, 1).signed_size().unwrap(),
            (i32::MAX, 1)
        );
    }

    #[test]
    fn test_signed_size_out_of_range() {
        let err = Rect::new(0, 0, u32::MAX, 100).signed_size().unwrap_err();
        assert_eq!(err.to_string(), format!("Width {} is out of range", u32::MAX));
        assert!(Rect::new(0, 0, 100, 1 << 31).signed_size().is_err());
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(200, 0, 100, 100);
        assert!(a.intersect(b).is_empty());
    }
}
