//! Client State
//!
//! The managed-window entity the workspace core references: identity, frame
//! geometry, status flags and transient links. Focus, iconify and shade
//! transitions are driven by the window's own state machine; the core only
//! reads the flags and issues the narrow requests below.

use anyhow::Result;
use bitflags::bitflags;

use crate::wm::display::DisplayServer;

bitflags! {
    /// Window status flags, owned by the window's state machine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        const SHADED  = 1 << 0;
        const ICONIC  = 1 << 1;
        const STUCK   = 1 << 2;
        const FOCUSED = 1 << 3;
    }
}

/// A window managed by the screen.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client window handle.
    pub window: u32,

    /// Frame (decoration) window handle.
    pub frame: u32,

    /// Window title, as shown in the client menu.
    pub title: String,

    /// Frame position.
    pub x: i32,
    pub y: i32,

    /// Client size, excluding decorations.
    pub width: u32,
    pub height: u32,

    /// Title bar height; stands in for the full height while shaded.
    pub title_height: u32,

    /// Status flags.
    pub flags: WindowFlags,

    /// Workspace this window belongs to.
    pub workspace: u32,

    /// Dense index into the owning workspace's window list.
    pub window_number: usize,

    /// Transient owner, when this window is a dialog for another.
    pub transient_for: Option<u32>,

    /// Windows that are transient for this one.
    pub transients: Vec<u32>,
}

impl Client {
    pub fn new(window: u32, frame: u32, width: u32, height: u32, title_height: u32) -> Self {
        Self {
            window,
            frame,
            title: String::new(),
            x: 0,
            y: 0,
            width,
            height,
            title_height,
            flags: WindowFlags::default(),
            workspace: 0,
            window_number: 0,
            transient_for: None,
            transients: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn is_shaded(&self) -> bool {
        self.flags.contains(WindowFlags::SHADED)
    }

    pub fn is_iconic(&self) -> bool {
        self.flags.contains(WindowFlags::ICONIC)
    }

    pub fn is_stuck(&self) -> bool {
        self.flags.contains(WindowFlags::STUCK)
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(WindowFlags::FOCUSED)
    }

    pub fn is_transient(&self) -> bool {
        self.transient_for.is_some()
    }

    /// Map the frame.
    pub fn show(&self, display: &mut dyn DisplayServer) -> Result<()> {
        display.map_window(self.frame)
    }

    /// Unmap the frame.
    pub fn withdraw(&self, display: &mut dyn DisplayServer) -> Result<()> {
        display.unmap_window(self.frame)
    }

    /// Move/resize the window and remember the new geometry.
    pub fn configure(
        &mut self,
        display: &mut dyn DisplayServer,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        display.configure_window(self.frame, x, y, width, height)
    }

    /// Ask the server to move input focus here.
    pub fn set_input_focus(&self, display: &mut dyn DisplayServer) -> Result<bool> {
        display.set_input_focus(self.window)
    }
}
