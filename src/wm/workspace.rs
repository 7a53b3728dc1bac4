//! Workspace Module
//!
//! One virtual desktop: the ordered member list (insertion order, dense
//! window numbers), the front-to-back stacking list, the cascade cursor and
//! the client menu model. Operations that need sibling workspaces or the
//! display server (add/remove, raise/lower, placement) are orchestrated by
//! [`Screen`](crate::wm::screen::Screen); this type owns the bookkeeping that
//! is local to a single workspace.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::wm::client::Client;
use crate::wm::menu::ClientMenu;
use crate::wm::placement::CascadeCursor;

/// Longest rendered default name; anything longer is a defect in the format,
/// not a runtime condition.
const MAX_DEFAULT_NAME: usize = 31;

pub struct Workspace {
    id: u32,
    name: String,

    /// Members in insertion order; the index of a window here is its window
    /// number.
    pub(crate) window_list: Vec<u32>,

    /// Members front-to-back; ordered by raise/lower history, not insertion.
    pub(crate) stacking_list: VecDeque<u32>,

    /// Next cascade placement offset.
    pub(crate) cascade: CascadeCursor,

    /// Window that held focus when this workspace was last current.
    pub(crate) last_focus: Option<u32>,

    /// Menu model listing the members by title.
    pub menu: ClientMenu,
}

impl Workspace {
    pub fn new(id: u32, name: Option<&str>) -> Self {
        let mut workspace = Self {
            id,
            name: String::new(),
            window_list: Vec::new(),
            stacking_list: VecDeque::new(),
            cascade: CascadeCursor::new(),
            last_focus: None,
            menu: ClientMenu::new(),
        };
        workspace.set_name(name.unwrap_or(""));
        workspace
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adopt `name` verbatim when non-empty, otherwise fall back to the
    /// "Workspace N" default (1-based in the label). The result is always
    /// pushed to the menu.
    pub fn set_name(&mut self, name: &str) {
        if name.is_empty() {
            self.name = format!("Workspace {}", self.id + 1);
            debug_assert!(
                self.name.len() <= MAX_DEFAULT_NAME,
                "default workspace name overflows the menu label"
            );
        } else {
            self.name = name.to_owned();
        }
        debug!("Workspace {} named '{}'", self.id, self.name);

        self.menu.set_label(&self.name);
        self.menu.update();
    }

    pub fn count(&self) -> usize {
        self.window_list.len()
    }

    pub fn contains(&self, window: u32) -> bool {
        self.window_list.contains(&window)
    }

    /// Member at `index`, when in range.
    pub fn get_window(&self, index: usize) -> Option<u32> {
        self.window_list.get(index).copied()
    }

    /// Next member after `window` in list order, wrapping at the end.
    /// `window` must be a member.
    pub fn next_window(&self, window: u32) -> u32 {
        let index = self
            .window_list
            .iter()
            .position(|&w| w == window)
            .expect("window is not on this workspace");
        self.window_list[(index + 1) % self.window_list.len()]
    }

    /// Previous member before `window` in list order, wrapping at the front.
    /// `window` must be a member.
    pub fn prev_window(&self, window: u32) -> u32 {
        let index = self
            .window_list
            .iter()
            .position(|&w| w == window)
            .expect("window is not on this workspace");
        let len = self.window_list.len();
        self.window_list[(index + len - 1) % len]
    }

    /// Frontmost window on this workspace, when it has any.
    pub fn top_window_on_stack(&self) -> Option<u32> {
        self.stacking_list.front().copied()
    }

    pub fn is_last_window(&self, window: u32) -> bool {
        self.window_list.last() == Some(&window)
    }

    pub fn is_current(&self, active_workspace: u32) -> bool {
        self.id == active_workspace
    }

    /// Members in insertion order.
    pub fn windows(&self) -> &[u32] {
        &self.window_list
    }

    /// Members front-to-back.
    pub fn stacking_order(&self) -> impl Iterator<Item = u32> + '_ {
        self.stacking_list.iter().copied()
    }

    pub fn last_focus(&self) -> Option<u32> {
        self.last_focus
    }

    pub fn set_last_focus(&mut self, window: Option<u32>) {
        self.last_focus = window;
    }

    /// Reassign dense window numbers 0..n-1 after a removal.
    pub(crate) fn renumber(&self, clients: &mut HashMap<u32, Client>) {
        for (number, &window) in self.window_list.iter().enumerate() {
            clients
                .get_mut(&window)
                .expect("workspace member is not managed")
                .window_number = number;
        }
    }
}
