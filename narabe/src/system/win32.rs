use std::ptr;

use anyhow::{Context, Result};
use winapi::shared::minwindef::{BOOL, LPARAM, TRUE};
use winapi::shared::windef::{HWND, RECT};
use winapi::um::winuser::{
    EnumWindows, FindWindowW, GetSystemMetrics, GetWindowLongW, GetWindowRect, GetWindowTextW,
    IsWindow, IsWindowVisible, SetForegroundWindow, SetWindowPos, ShowWindow, GWL_EXSTYLE,
    SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE, SWP_NOZORDER, SW_RESTORE, WS_EX_APPWINDOW,
    WS_EX_TOOLWINDOW,
};

use super::WindowSystem;
use crate::core::{Rect, Screen, Window, WindowId};

const SYSTEM_TITLES: &[&str] = &["Program Manager", "Task Switching"];

pub struct Win32;

impl WindowSystem for Win32 {
    fn list_windows(&self) -> Result<Vec<Window>> {
        let mut windows: Vec<Window> = Vec::new();
        let ok = unsafe { EnumWindows(Some(enum_windows_proc), &mut windows as *mut _ as LPARAM) };
        if ok == 0 {
            anyhow::bail!("EnumWindows failed: {}", std::io::Error::last_os_error());
        }
        Ok(windows)
    }

    fn screen(&self) -> Result<Screen> {
        let (width, height) =
            unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width <= 0 || height <= 0 {
            anyhow::bail!("Failed to query screen size");
        }
        Ok(Screen::with_taskbar(width as u32, height as u32, taskbar_height()))
    }

    fn move_resize(&self, window: &Window, frame: Rect) -> Result<()> {
        let hwnd = live_hwnd(window)?;
        let (width, height) = frame
            .signed_size()
            .with_context(|| format!("Cannot size window '{}'", window.title))?;
        let ok = unsafe {
            ShowWindow(hwnd, SW_RESTORE);
            SetWindowPos(
                hwnd,
                ptr::null_mut(),
                frame.x,
                frame.y,
                width,
                height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if ok == 0 {
            anyhow::bail!(
                "SetWindowPos failed for '{}': {}",
                window.title,
                std::io::Error::last_os_error()
            );
        }
        Ok(())
    }

    fn focus(&self, window: &Window) -> Result<()> {
        let hwnd = live_hwnd(window)?;
        if unsafe { SetForegroundWindow(hwnd) } == 0 {
            tracing::debug!("SetForegroundWindow refused for '{}'", window.title);
        }
        Ok(())
    }
}

fn live_hwnd(window: &Window) -> Result<HWND> {
    let hwnd = window.id as usize as HWND;
    if unsafe { IsWindow(hwnd) } == 0 {
        anyhow::bail!("Window '{}' no longer exists", window.title);
    }
    Ok(hwnd)
}

fn window_title(hwnd: HWND) -> String {
    let mut buffer = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
    if len > 0 {
        String::from_utf16_lossy(&buffer[..len as usize])
    } else {
        String::new()
    }
}

fn is_app_window(hwnd: HWND) -> bool {
    unsafe {
        if IsWindowVisible(hwnd) == 0 {
            return false;
        }
        let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
        (ex_style & WS_EX_TOOLWINDOW) == 0 || (ex_style & WS_EX_APPWINDOW) != 0
    }
}

unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam as *mut Vec<Window>);
    if is_app_window(hwnd) {
        let mut window = Window::new(hwnd as usize as WindowId, window_title(hwnd));
        window.system = SYSTEM_TITLES.contains(&window.title.as_str());
        windows.push(window);
    }
    TRUE
}

/// Height of the `Shell_TrayWnd` window, or 0 when there is no taskbar.
fn taskbar_height() -> u32 {
    let class: Vec<u16> = "Shell_TrayWnd\0".encode_utf16().collect();
    unsafe {
        let taskbar = FindWindowW(class.as_ptr(), ptr::null());
        if taskbar.is_null() {
            return 0;
        }
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if GetWindowRect(taskbar, &mut rect) == 0 {
            return 0;
        }
        (rect.bottom - rect.top).max(0) as u32
    }
}
