use super::Rect;
use narabe_ipc::{ScreenInfo, WorkArea};

/// Geometry of the primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    /// Top-left corner of the display in desktop coordinates.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// The part of the display not reserved by taskbars, panels or docks.
    pub work_area: Rect,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self::at(Rect::new(0, 0, width, height))
    }

    /// A display occupying `frame`, with nothing reserved.
    pub fn at(frame: Rect) -> Self {
        Self {
            x: frame.x,
            y: frame.y,
            width: frame.width,
            height: frame.height,
            work_area: frame,
        }
    }

    /// A display with a taskbar of `taskbar_height` along its bottom edge.
    pub fn with_taskbar(width: u32, height: u32, taskbar_height: u32) -> Self {
        let mut screen = Self::new(width, height);
        screen.work_area = screen.bottom_taskbar(taskbar_height);
        screen
    }

    pub fn full(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn taskbar_height(&self) -> u32 {
        self.height.saturating_sub(self.work_area.height)
    }

    /// The rectangle windows are distributed over.
    ///
    /// `taskbar_override` replaces whatever work area the window system
    /// reported with a bottom-anchored taskbar of that height.
    pub fn usable(&self, ignore_taskbar: bool, taskbar_override: Option<u32>) -> Rect {
        if ignore_taskbar {
            return self.full();
        }
        match taskbar_override {
            Some(taskbar) => self.bottom_taskbar(taskbar),
            None => self.work_area,
        }
    }

    fn bottom_taskbar(&self, taskbar_height: u32) -> Rect {
        Rect {
            height: self.height.saturating_sub(taskbar_height),
            ..self.full()
        }
    }

    pub fn to_info(&self) -> ScreenInfo {
        ScreenInfo {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            work_area: WorkArea {
                x: self.work_area.x,
                y: self.work_area.y,
                width: self.work_area.width,
                height: self.work_area.height,
            },
            taskbar_height: self.taskbar_height(),
        }
    }
}
