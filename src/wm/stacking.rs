//! Stacking Module
//!
//! Raising and lowering operate on whole transient chains: a dialog never
//! detaches visually from its owner, so the chain is discovered from the
//! window's ownership links, every member's workspace stacking list is
//! updated (a transient may live on a different workspace than its owner),
//! and a single batched restack request goes to the display server.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, warn};

use crate::wm::client::Client;
use crate::wm::display::DisplayServer;
use crate::wm::netizen::Netizen;
use crate::wm::workspace::Workspace;

/// Root owner of `window`'s transient chain: the window reached by following
/// `transient_for` links until none is left. It anchors the chain's stacking
/// position.
fn chain_bottom(clients: &HashMap<u32, Client>, window: u32) -> u32 {
    let mut bottom = window;
    let mut hops = 0;
    while let Some(owner) = clients.get(&bottom).and_then(|c| c.transient_for) {
        if !clients.contains_key(&owner) {
            break;
        }
        // broken clients can make WM_TRANSIENT_FOR loop; bail out
        hops += 1;
        if hops > clients.len() {
            warn!("Transient-for cycle involving window 0x{:x}", window);
            break;
        }
        bottom = owner;
    }
    bottom
}

/// The chain in bottom-to-top order: the root owner first, then its
/// transients in preorder.
fn transient_chain(clients: &HashMap<u32, Client>, bottom: u32) -> Vec<u32> {
    let mut chain = Vec::new();
    let mut pending = vec![bottom];
    while let Some(window) = pending.pop() {
        if chain.len() > clients.len() {
            warn!("Transient links of window 0x{:x} do not form a tree", bottom);
            break;
        }
        chain.push(window);
        for &transient in clients[&window].transients.iter().rev() {
            if clients.contains_key(&transient) {
                pending.push(transient);
            }
        }
    }
    chain
}

/// Raise `window` together with its transient chain.
///
/// Every chain member gets a netizen raise event and, unless iconic, moves to
/// the front of its *own* workspace's stacking list; one batched raise is
/// then issued with the frame handles ordered bottom-to-top.
pub fn raise_window(
    workspaces: &mut [Workspace],
    clients: &mut HashMap<u32, Client>,
    netizens: &mut [Box<dyn Netizen>],
    display: &mut dyn DisplayServer,
    window: u32,
) -> Result<()> {
    assert!(
        clients.contains_key(&window),
        "cannot raise unmanaged window 0x{window:x}"
    );

    let bottom = chain_bottom(clients, window);
    let chain = transient_chain(clients, bottom);
    debug!(
        "Raising window 0x{:x} (chain of {} from 0x{:x})",
        window,
        chain.len(),
        bottom
    );

    let mut frames = Vec::with_capacity(chain.len());
    for &member in &chain {
        let client = &clients[&member];
        let (frame, handle, iconic, workspace) =
            (client.frame, client.window, client.is_iconic(), client.workspace);

        frames.push(frame);
        for netizen in netizens.iter_mut() {
            netizen.window_raise(handle);
        }

        if !iconic {
            let ws = workspaces
                .get_mut(workspace as usize)
                .expect("window assigned to an unknown workspace");
            ws.stacking_list.retain(|&w| w != member);
            ws.stacking_list.push_front(member);
        }
    }

    display.raise_windows(&frames)
}

/// Lower `window` together with its transient chain.
///
/// The chain is walked top-to-bottom; every member gets a netizen lower
/// event and, unless iconic, moves to the *back* of its own workspace's
/// stacking list, the root owner ending up last. One lower-and-restack
/// request is issued with the frames in the same top-to-bottom order.
pub fn lower_window(
    workspaces: &mut [Workspace],
    clients: &mut HashMap<u32, Client>,
    netizens: &mut [Box<dyn Netizen>],
    display: &mut dyn DisplayServer,
    window: u32,
) -> Result<()> {
    assert!(
        clients.contains_key(&window),
        "cannot lower unmanaged window 0x{window:x}"
    );

    let bottom = chain_bottom(clients, window);
    let chain = transient_chain(clients, bottom);
    debug!(
        "Lowering window 0x{:x} (chain of {} from 0x{:x})",
        window,
        chain.len(),
        bottom
    );

    let mut frames = Vec::with_capacity(chain.len());
    for &member in chain.iter().rev() {
        let client = &clients[&member];
        let (frame, handle, iconic, workspace) =
            (client.frame, client.window, client.is_iconic(), client.workspace);

        frames.push(frame);
        for netizen in netizens.iter_mut() {
            netizen.window_lower(handle);
        }

        if !iconic {
            let ws = workspaces
                .get_mut(workspace as usize)
                .expect("window assigned to an unknown workspace");
            ws.stacking_list.retain(|&w| w != member);
            ws.stacking_list.push_back(member);
        }
    }

    display.lower_and_restack(&frames)
}
