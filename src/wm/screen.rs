//! Screen Module
//!
//! The per-screen coordinator: owns the workspaces, the managed-client store,
//! the placement configuration and the netizen registry, and orchestrates
//! membership, placement and stacking. The process-wide "currently focused
//! window" reference lives here as explicit state rather than a global.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::wm::client::{Client, WindowFlags};
use crate::wm::display::DisplayServer;
use crate::wm::geometry::Rect;
use crate::wm::netizen::Netizen;
use crate::wm::placement;
use crate::wm::settings::{ColDirection, PlacementPolicy, RowDirection, ScreenSettings};
use crate::wm::stacking;
use crate::wm::workspace::Workspace;

pub struct Screen {
    /// Usable screen region, excluding reserved chrome.
    available_area: Rect,

    /// Decoration border width.
    border_width: u32,

    placement_policy: PlacementPolicy,
    row_direction: RowDirection,
    col_direction: ColDirection,

    /// Workspaces, indexed by id.
    workspaces: Vec<Workspace>,

    /// Managed windows, keyed by client handle.
    clients: HashMap<u32, Client>,

    active_workspace: u32,

    /// The window holding input focus, if any.
    focused_window: Option<u32>,

    netizens: Vec<Box<dyn Netizen>>,
}

impl Screen {
    pub fn new(settings: &ScreenSettings, available_area: Rect) -> Self {
        let count = settings.workspace_count.max(1);
        let workspaces = (0..count)
            .map(|id| Workspace::new(id, settings.workspace_name(id)))
            .collect();
        info!("Screen initialized with {} workspaces", count);

        Self {
            available_area,
            border_width: settings.border_width,
            placement_policy: settings.placement_policy,
            row_direction: settings.row_direction,
            col_direction: settings.col_direction,
            workspaces,
            clients: HashMap::new(),
            active_workspace: 0,
            focused_window: None,
            netizens: Vec::new(),
        }
    }

    pub fn available_area(&self) -> Rect {
        self.available_area
    }

    /// New usable region after struts or outputs changed. Existing windows
    /// are not re-placed.
    pub fn set_available_area(&mut self, area: Rect) {
        self.available_area = area;
    }

    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    pub fn active_workspace(&self) -> u32 {
        self.active_workspace
    }

    pub fn focused_window(&self) -> Option<u32> {
        self.focused_window
    }

    /// Fed by the window state machine when focus moves (FocusIn handling).
    pub fn set_focused_window(&mut self, window: Option<u32>) {
        self.focused_window = window;
    }

    pub fn workspace(&self, id: u32) -> &Workspace {
        self.workspaces
            .get(id as usize)
            .expect("workspace id out of range")
    }

    pub fn workspace_mut(&mut self, id: u32) -> &mut Workspace {
        self.workspaces
            .get_mut(id as usize)
            .expect("workspace id out of range")
    }

    pub fn workspace_count(&self) -> usize {
        self.workspaces.len()
    }

    pub fn client(&self, window: u32) -> &Client {
        self.clients.get(&window).expect("window is not managed")
    }

    pub fn client_mut(&mut self, window: u32) -> &mut Client {
        self.clients.get_mut(&window).expect("window is not managed")
    }

    pub fn is_managed(&self, window: u32) -> bool {
        self.clients.contains_key(&window)
    }

    pub fn add_netizen(&mut self, netizen: Box<dyn Netizen>) {
        self.netizens.push(netizen);
    }

    /// Register a window with the screen. Workspace membership is a separate
    /// step ([`Screen::add_window`]).
    pub fn manage_client(&mut self, client: Client) {
        debug!("Managing window 0x{:x}", client.window);
        // keep the owner's forward link in sync with transient_for
        if let Some(owner) = client.transient_for
            && let Some(owner_client) = self.clients.get_mut(&owner)
            && !owner_client.transients.contains(&client.window)
        {
            owner_client.transients.push(client.window);
        }
        self.clients.insert(client.window, client);
    }

    /// Forget a window entirely. The caller removes it from its workspace
    /// first.
    pub fn unmanage_client(&mut self, window: u32) -> Option<Client> {
        let client = self.clients.remove(&window)?;
        if let Some(owner) = client.transient_for
            && let Some(owner_client) = self.clients.get_mut(&owner)
        {
            owner_client.transients.retain(|&t| t != window);
        }
        for transient in &client.transients {
            if let Some(t) = self.clients.get_mut(transient) {
                t.transient_for = None;
            }
        }
        debug!("Unmanaged window 0x{:x}", window);
        Some(client)
    }

    /// Add a managed window to `workspace`, optionally placing it first.
    ///
    /// The window gets the next window number, starts on top of the stack and
    /// its whole transient chain is raised. Adding a window that is already a
    /// member somewhere is a programming error.
    pub fn add_window(
        &mut self,
        display: &mut dyn DisplayServer,
        workspace: u32,
        window: u32,
        place: bool,
    ) -> Result<()> {
        assert!(
            self.clients.contains_key(&window),
            "cannot add unmanaged window 0x{window:x}"
        );
        assert!(
            !self.workspaces.iter().any(|ws| ws.contains(window)),
            "window 0x{window:x} is already on a workspace"
        );

        if place {
            self.place_window(display, workspace, window)?;
        }

        let ws = self
            .workspaces
            .get_mut(workspace as usize)
            .expect("workspace id out of range");
        let client = self.clients.get_mut(&window).expect("window is not managed");
        client.workspace = workspace;
        client.window_number = ws.window_list.len();

        ws.stacking_list.push_front(window);
        ws.window_list.push(window);

        ws.menu.insert(&client.title);
        ws.menu.update();

        for netizen in self.netizens.iter_mut() {
            netizen.window_add(window, workspace);
        }
        debug!("Added window 0x{:x} to workspace {}", window, workspace);

        self.raise_window(display, window)
    }

    /// Remove `window` from its workspace and return the remaining member
    /// count.
    ///
    /// If the window held focus, focus moves to its transient owner when it
    /// has one, else to the new top of the stack; when neither works the
    /// focused-window reference is cleared. Remaining members are renumbered
    /// 0..n-1 and the cascade cursor resets once the workspace empties.
    pub fn remove_window(&mut self, display: &mut dyn DisplayServer, window: u32) -> Result<usize> {
        let (workspace, was_focused, transient_for, window_number) = {
            let client = self.clients.get(&window).expect("window is not managed");
            (
                client.workspace,
                client.is_focused(),
                client.transient_for,
                client.window_number,
            )
        };
        let ws = self
            .workspaces
            .get_mut(workspace as usize)
            .expect("workspace id out of range");
        assert!(
            ws.contains(window),
            "window 0x{window:x} is not on workspace {workspace}"
        );

        ws.stacking_list.retain(|&w| w != window);

        if was_focused {
            let mut successor = transient_for.filter(|owner| self.clients.contains_key(owner));
            if successor.is_none() {
                successor = ws.stacking_list.front().copied();
            }

            self.focused_window = None;
            if let Some(next) = successor
                && self.clients[&next].set_input_focus(display)?
            {
                self.focused_window = Some(next);
                if let Some(client) = self.clients.get_mut(&next) {
                    client.flags.insert(WindowFlags::FOCUSED);
                }
            }
            if let Some(client) = self.clients.get_mut(&window) {
                client.flags.remove(WindowFlags::FOCUSED);
            }
        }

        if ws.last_focus == Some(window) {
            ws.last_focus = None;
        }

        ws.window_list.retain(|&w| w != window);
        ws.menu.remove(window_number);
        ws.menu.update();

        for netizen in self.netizens.iter_mut() {
            netizen.window_del(window);
        }

        ws.renumber(&mut self.clients);

        let count = ws.window_list.len();
        if count == 0 {
            ws.cascade.reset();
        }
        debug!(
            "Removed window 0x{:x} from workspace {}, {} member(s) left",
            window, workspace, count
        );
        Ok(count)
    }

    /// Raise `window` and its transient chain. See [`stacking::raise_window`].
    pub fn raise_window(&mut self, display: &mut dyn DisplayServer, window: u32) -> Result<()> {
        stacking::raise_window(
            &mut self.workspaces,
            &mut self.clients,
            &mut self.netizens,
            display,
            window,
        )
    }

    /// Lower `window` and its transient chain. See [`stacking::lower_window`].
    pub fn lower_window(&mut self, display: &mut dyn DisplayServer, window: u32) -> Result<()> {
        stacking::lower_window(
            &mut self.workspaces,
            &mut self.clients,
            &mut self.netizens,
            display,
            window,
        )
    }

    /// Pick an initial position for `window` on `workspace` and configure it
    /// there.
    ///
    /// Smart policies search the free space and fall back to cascade when
    /// nothing fits; the cascade cursor is advanced here, afterwards, so the
    /// placement routines stay position-only. The candidate is padded by the
    /// border for the search but the window keeps its requested size.
    pub fn place_window(
        &mut self,
        display: &mut dyn DisplayServer,
        workspace: u32,
        window: u32,
    ) -> Result<()> {
        let available = self.available_area;
        let border = self.border_width;
        let (width, height, title_height) = {
            let client = self.clients.get(&window).expect("window is not managed");
            (client.width, client.height, client.title_height)
        };

        let mut new_win = Rect::new(
            available.x,
            available.y,
            width + border * 2,
            height + border * 2,
        );

        let ws = self
            .workspaces
            .get_mut(workspace as usize)
            .expect("workspace id out of range");

        let placed = match self.placement_policy {
            PlacementPolicy::RowSmart | PlacementPolicy::ColSmart => {
                let occupied: Vec<Rect> = ws
                    .window_list
                    .iter()
                    .map(|w| {
                        let client = &self.clients[w];
                        let height = if client.is_shaded() {
                            client.title_height
                        } else {
                            client.height
                        };
                        Rect::new(
                            client.x,
                            client.y,
                            client.width + border * 4,
                            height + border * 4,
                        )
                    })
                    .collect();
                placement::smart_placement(
                    &mut new_win,
                    &available,
                    &occupied,
                    self.placement_policy,
                    self.row_direction,
                    self.col_direction,
                )
            }
            PlacementPolicy::Cascade => false,
        };

        if !placed {
            placement::cascade_placement(&mut new_win, &mut ws.cascade, &available);
            ws.cascade.advance((title_height + border * 2) as i32);
        }

        // recenter on overflow rather than clipping at the edge
        if new_win.right() > available.right() {
            new_win.x = available.x + (available.width as i32 - new_win.width as i32) / 2;
        }
        if new_win.bottom() > available.bottom() {
            new_win.y = available.y + (available.height as i32 - new_win.height as i32) / 2;
        }

        // the border padding was placement-space only; keep the requested size
        let client = self.clients.get_mut(&window).expect("window is not managed");
        client.configure(display, new_win.x, new_win.y, width, height)?;
        debug!(
            "Placed window 0x{:x} at ({}, {})",
            window, new_win.x, new_win.y
        );
        Ok(())
    }

    /// Map every member of `workspace`, front to back.
    pub fn show_all(&mut self, display: &mut dyn DisplayServer, workspace: u32) -> Result<()> {
        let ws = self
            .workspaces
            .get(workspace as usize)
            .expect("workspace id out of range");
        for &window in ws.stacking_list.iter() {
            self.clients[&window].show(display)?;
        }
        Ok(())
    }

    /// Withdraw every non-stuck member of `workspace`.
    ///
    /// Withdraws in reverse stacking order to minimize the number of Expose
    /// events the unmaps generate.
    pub fn hide_all(&mut self, display: &mut dyn DisplayServer, workspace: u32) -> Result<()> {
        let ws = self
            .workspaces
            .get(workspace as usize)
            .expect("workspace id out of range");
        for &window in ws.stacking_list.iter().rev() {
            let client = &self.clients[&window];
            if !client.is_stuck() {
                client.withdraw(display)?;
            }
        }
        Ok(())
    }

    /// Iconify members of `workspace` until none are left; iconifying
    /// removes a window from its workspace, so this drains the list.
    pub fn remove_all(&mut self, display: &mut dyn DisplayServer, workspace: u32) -> Result<()> {
        while let Some(&window) = self
            .workspaces
            .get(workspace as usize)
            .expect("workspace id out of range")
            .window_list
            .first()
        {
            self.iconify_window(display, window)?;
        }
        Ok(())
    }

    /// Mark `window` iconic, withdraw its frame and drop it from its
    /// workspace.
    pub fn iconify_window(&mut self, display: &mut dyn DisplayServer, window: u32) -> Result<()> {
        let client = self.clients.get_mut(&window).expect("window is not managed");
        client.flags.insert(WindowFlags::ICONIC);
        client.withdraw(display)?;
        self.remove_window(display, window)?;
        Ok(())
    }

    /// Switch the active workspace: hide the old one, show the new one,
    /// notify netizens and try to restore the workspace's cached focus.
    pub fn change_workspace(&mut self, display: &mut dyn DisplayServer, workspace: u32) -> Result<()> {
        assert!(
            (workspace as usize) < self.workspaces.len(),
            "workspace id {workspace} out of range"
        );
        if workspace == self.active_workspace {
            debug!("Already on workspace {}", workspace);
            return Ok(());
        }
        info!(
            "Switching from workspace {} to {}",
            self.active_workspace, workspace
        );

        let old = self.active_workspace;
        self.hide_all(display, old)?;
        self.active_workspace = workspace;
        self.show_all(display, workspace)?;

        for netizen in self.netizens.iter_mut() {
            netizen.workspace_change(workspace);
        }

        let last = self.workspaces[workspace as usize].last_focus;
        if let Some(window) = last.filter(|w| self.clients.contains_key(w))
            && self.clients[&window].set_input_focus(display)?
        {
            self.focused_window = Some(window);
            if let Some(client) = self.clients.get_mut(&window) {
                client.flags.insert(WindowFlags::FOCUSED);
            }
        }
        Ok(())
    }

    /// Replay `workspace`'s membership, in list order, to one listener.
    pub fn send_window_list(&self, workspace: u32, listener: &mut dyn Netizen) {
        let ws = self
            .workspaces
            .get(workspace as usize)
            .expect("workspace id out of range");
        for &window in &ws.window_list {
            listener.window_add(window, ws.id());
        }
    }

    /// Rename `workspace` (empty restores the default) and refresh its menu.
    pub fn set_workspace_name(&mut self, workspace: u32, name: &str) {
        self.workspace_mut(workspace).set_name(name);
    }

    /// Reapply every member's geometry and refresh the menu, after a border
    /// or theme change.
    pub fn reconfigure_workspace(
        &mut self,
        display: &mut dyn DisplayServer,
        workspace: u32,
    ) -> Result<()> {
        let members: Vec<u32> = self
            .workspaces
            .get(workspace as usize)
            .expect("workspace id out of range")
            .window_list
            .clone();
        for window in members {
            let client = self.clients.get_mut(&window).expect("window is not managed");
            let (x, y, width, height) = (client.x, client.y, client.width, client.height);
            client.configure(display, x, y, width, height)?;
        }
        self.workspaces[workspace as usize].menu.update();
        Ok(())
    }
}
