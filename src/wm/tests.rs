//! Scenario tests driving the screen end to end against recording doubles
//! for the display server and the netizen listeners.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::wm::client::{Client, WindowFlags};
use crate::wm::display::DisplayServer;
use crate::wm::geometry::Rect;
use crate::wm::netizen::Netizen;
use crate::wm::screen::Screen;
use crate::wm::settings::{PlacementPolicy, ScreenSettings};

#[derive(Debug, PartialEq)]
enum DisplayEvent {
    Raise(Vec<u32>),
    LowerRestack(Vec<u32>),
    Configure(u32, i32, i32, u32, u32),
    Map(u32),
    Unmap(u32),
    Focus(u32),
}

#[derive(Default)]
struct RecordingDisplay {
    events: Vec<DisplayEvent>,
    refuse_focus: bool,
}

impl RecordingDisplay {
    fn take(&mut self) -> Vec<DisplayEvent> {
        std::mem::take(&mut self.events)
    }

    fn unmaps(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Unmap(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }

    fn maps(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Map(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }
}

impl DisplayServer for RecordingDisplay {
    fn raise_windows(&mut self, frames: &[u32]) -> Result<()> {
        self.events.push(DisplayEvent::Raise(frames.to_vec()));
        Ok(())
    }

    fn lower_and_restack(&mut self, frames: &[u32]) -> Result<()> {
        self.events.push(DisplayEvent::LowerRestack(frames.to_vec()));
        Ok(())
    }

    fn configure_window(
        &mut self,
        frame: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.events
            .push(DisplayEvent::Configure(frame, x, y, width, height));
        Ok(())
    }

    fn map_window(&mut self, frame: u32) -> Result<()> {
        self.events.push(DisplayEvent::Map(frame));
        Ok(())
    }

    fn unmap_window(&mut self, frame: u32) -> Result<()> {
        self.events.push(DisplayEvent::Unmap(frame));
        Ok(())
    }

    fn set_input_focus(&mut self, window: u32) -> Result<bool> {
        self.events.push(DisplayEvent::Focus(window));
        Ok(!self.refuse_focus)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Add(u32, u32),
    Del(u32),
    Raise(u32),
    Lower(u32),
    Workspace(u32),
}

#[derive(Clone, Default)]
struct NoticeLog(Rc<RefCell<Vec<Notice>>>);

impl NoticeLog {
    fn take(&self) -> Vec<Notice> {
        self.0.borrow_mut().drain(..).collect()
    }
}

impl Netizen for NoticeLog {
    fn window_add(&mut self, window: u32, workspace: u32) {
        self.0.borrow_mut().push(Notice::Add(window, workspace));
    }
    fn window_del(&mut self, window: u32) {
        self.0.borrow_mut().push(Notice::Del(window));
    }
    fn window_raise(&mut self, window: u32) {
        self.0.borrow_mut().push(Notice::Raise(window));
    }
    fn window_lower(&mut self, window: u32) {
        self.0.borrow_mut().push(Notice::Lower(window));
    }
    fn workspace_change(&mut self, workspace: u32) {
        self.0.borrow_mut().push(Notice::Workspace(workspace));
    }
}

const FRAME: u32 = 0x1000;

fn settings(policy: PlacementPolicy) -> ScreenSettings {
    ScreenSettings {
        workspace_count: 2,
        placement_policy: policy,
        border_width: 0,
        ..ScreenSettings::default()
    }
}

fn test_screen(policy: PlacementPolicy) -> (Screen, RecordingDisplay, NoticeLog) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut screen = Screen::new(&settings(policy), Rect::new(0, 0, 1000, 800));
    let log = NoticeLog::default();
    screen.add_netizen(Box::new(log.clone()));
    (screen, RecordingDisplay::default(), log)
}

fn window(id: u32, width: u32, height: u32) -> Client {
    Client::new(id, id + FRAME, width, height, 20).with_title(&format!("window {id}"))
}

fn transient(id: u32, owner: u32, width: u32, height: u32) -> Client {
    let mut client = window(id, width, height);
    client.transient_for = Some(owner);
    client
}

#[test]
fn add_window_assigns_number_stack_menu_and_raise() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 200, 100));

    screen.add_window(&mut display, 0, 1, false).unwrap();

    assert_eq!(screen.workspace(0).windows(), [1]);
    assert_eq!(screen.client(1).workspace, 0);
    assert_eq!(screen.client(1).window_number, 0);
    assert_eq!(screen.workspace(0).top_window_on_stack(), Some(1));
    assert_eq!(screen.workspace(0).menu.items(), ["window 1"]);
    assert_eq!(log.take(), vec![Notice::Add(1, 0), Notice::Raise(1)]);
    assert_eq!(display.take(), vec![DisplayEvent::Raise(vec![FRAME + 1])]);
}

#[test]
#[should_panic(expected = "unmanaged")]
fn adding_an_unmanaged_window_is_a_programming_error() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    let _ = screen.add_window(&mut display, 0, 99, false);
}

#[test]
#[should_panic(expected = "already on a workspace")]
fn adding_a_member_twice_is_a_programming_error() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    let _ = screen.add_window(&mut display, 1, 1, false);
}

#[test]
fn removal_renumbers_and_preserves_relative_order() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=4 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    log.take();

    let count = screen.remove_window(&mut display, 2).unwrap();

    assert_eq!(count, 3);
    assert_eq!(screen.workspace(0).windows(), [1, 3, 4]);
    for (number, id) in [1u32, 3, 4].iter().enumerate() {
        assert_eq!(screen.client(*id).window_number, number, "window {id}");
    }
    assert_eq!(screen.workspace(0).menu.items(), ["window 1", "window 3", "window 4"]);
    assert_eq!(log.take(), vec![Notice::Del(2)]);

    let count = screen.remove_window(&mut display, 1).unwrap();
    assert_eq!(count, 2);
    assert_eq!(screen.workspace(0).windows(), [3, 4]);
    assert_eq!(screen.client(3).window_number, 0);
    assert_eq!(screen.client(4).window_number, 1);
}

#[test]
fn two_smart_placed_windows_share_the_first_row() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);

    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, true).unwrap();
    assert_eq!(
        display.take(),
        vec![
            DisplayEvent::Configure(FRAME + 1, 0, 0, 200, 100),
            DisplayEvent::Raise(vec![FRAME + 1]),
        ]
    );

    screen.manage_client(window(2, 200, 100));
    screen.add_window(&mut display, 0, 2, true).unwrap();
    assert_eq!(
        display.take(),
        vec![
            DisplayEvent::Configure(FRAME + 2, 200, 0, 200, 100),
            DisplayEvent::Raise(vec![FRAME + 2]),
        ]
    );

    assert_eq!(screen.client(1).window_number, 0);
    assert_eq!(screen.client(2).window_number, 1);
    assert_eq!(
        screen.workspace(0).stacking_order().collect::<Vec<_>>(),
        [2, 1]
    );
}

#[test]
fn placement_falls_back_to_cascade_and_recenters_oversized_windows() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 1200, 900));

    screen.place_window(&mut display, 0, 1).unwrap();

    // no free rectangle fits, so the window cascades to (32,32) and the
    // overflow clamp recenters it on both axes
    assert_eq!(
        display.take(),
        vec![DisplayEvent::Configure(FRAME + 1, -100, -50, 1200, 900)]
    );
}

#[test]
fn cascade_policy_advances_the_cursor_per_placement() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::Cascade);
    for id in 1..=2 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, true).unwrap();
    }

    let configures: Vec<_> = display
        .take()
        .into_iter()
        .filter(|e| matches!(e, DisplayEvent::Configure(..)))
        .collect();
    // title height 20, border 0: the cursor steps by 20 between placements
    assert_eq!(
        configures,
        vec![
            DisplayEvent::Configure(FRAME + 1, 32, 32, 200, 100),
            DisplayEvent::Configure(FRAME + 2, 52, 52, 200, 100),
        ]
    );
}

#[test]
fn emptying_a_workspace_resets_the_cascade_cursor() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::Cascade);
    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, true).unwrap();
    screen.remove_window(&mut display, 1).unwrap();
    display.take();

    screen.manage_client(window(2, 200, 100));
    screen.add_window(&mut display, 0, 2, true).unwrap();

    // back at the cascade origin, not at the advanced cursor
    assert_eq!(
        display.take()[0],
        DisplayEvent::Configure(FRAME + 2, 32, 32, 200, 100)
    );
}

#[test]
fn removing_the_focused_window_moves_focus_to_the_stack_front() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=2 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    screen.client_mut(1).flags.insert(WindowFlags::FOCUSED);
    screen.set_focused_window(Some(1));
    display.take();

    screen.remove_window(&mut display, 1).unwrap();

    assert_eq!(screen.focused_window(), Some(2));
    assert!(screen.client(2).is_focused());
    assert_eq!(display.take(), vec![DisplayEvent::Focus(2)]);
}

#[test]
fn removing_a_focused_transient_prefers_its_owner() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 400, 300));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.manage_client(window(2, 400, 300));
    screen.add_window(&mut display, 0, 2, false).unwrap();
    screen.manage_client(transient(3, 1, 200, 100));
    screen.add_window(&mut display, 0, 3, false).unwrap();
    // put the unrelated window on top so the stack front is not the owner
    screen.raise_window(&mut display, 2).unwrap();

    screen.client_mut(3).flags.insert(WindowFlags::FOCUSED);
    screen.set_focused_window(Some(3));
    display.take();

    screen.remove_window(&mut display, 3).unwrap();

    // the owner wins over window 2, which sits higher in the stack
    assert_eq!(screen.workspace(0).top_window_on_stack(), Some(2));
    assert_eq!(screen.focused_window(), Some(1));
    assert_eq!(display.take(), vec![DisplayEvent::Focus(1)]);
}

#[test]
fn removing_the_last_focused_window_clears_focus() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.client_mut(1).flags.insert(WindowFlags::FOCUSED);
    screen.set_focused_window(Some(1));
    display.take();

    let count = screen.remove_window(&mut display, 1).unwrap();

    assert_eq!(count, 0);
    assert_eq!(screen.focused_window(), None);
    assert_eq!(display.take(), vec![]);
}

#[test]
fn focus_refusal_degrades_to_nothing_focused() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=2 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    screen.client_mut(1).flags.insert(WindowFlags::FOCUSED);
    screen.set_focused_window(Some(1));
    display.refuse_focus = true;

    screen.remove_window(&mut display, 1).unwrap();

    assert_eq!(screen.focused_window(), None);
}

#[test]
fn removal_clears_the_workspace_focus_cache() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.workspace_mut(0).set_last_focus(Some(1));

    screen.remove_window(&mut display, 1).unwrap();

    assert_eq!(screen.workspace(0).last_focus(), None);
}

#[test]
fn raising_a_transient_raises_its_chain_across_workspaces() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    // unrelated windows on both workspaces to sit above later
    screen.manage_client(window(3, 200, 100));
    screen.add_window(&mut display, 0, 3, false).unwrap();
    screen.manage_client(window(4, 200, 100));
    screen.add_window(&mut display, 1, 4, false).unwrap();
    // owner on workspace 0, its dialog on workspace 1
    screen.manage_client(window(1, 400, 300));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.manage_client(transient(2, 1, 200, 100));
    screen.add_window(&mut display, 1, 2, false).unwrap();

    screen.raise_window(&mut display, 3).unwrap();
    screen.raise_window(&mut display, 4).unwrap();
    display.take();
    log.take();

    // raising the dialog drags the whole chain up, each member on its own
    // workspace
    screen.raise_window(&mut display, 2).unwrap();

    assert_eq!(screen.workspace(0).top_window_on_stack(), Some(1));
    assert_eq!(screen.workspace(1).top_window_on_stack(), Some(2));
    assert_eq!(
        display.take(),
        vec![DisplayEvent::Raise(vec![FRAME + 1, FRAME + 2])]
    );
    assert_eq!(log.take(), vec![Notice::Raise(1), Notice::Raise(2)]);
}

#[test]
fn lowering_an_owner_with_two_transients_moves_all_three_to_the_back() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 400, 300));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.manage_client(transient(2, 1, 200, 100));
    screen.add_window(&mut display, 0, 2, false).unwrap();
    screen.manage_client(transient(3, 1, 200, 100));
    screen.add_window(&mut display, 0, 3, false).unwrap();
    screen.manage_client(window(4, 200, 100));
    screen.add_window(&mut display, 0, 4, false).unwrap();
    display.take();
    log.take();

    screen.lower_window(&mut display, 1).unwrap();

    // the chain walks top to bottom, so the owner ends up at the very back
    assert_eq!(
        screen.workspace(0).stacking_order().collect::<Vec<_>>(),
        [4, 3, 2, 1]
    );
    assert_eq!(screen.workspace(0).top_window_on_stack(), Some(4));
    assert_eq!(
        display.take(),
        vec![DisplayEvent::LowerRestack(vec![
            FRAME + 3,
            FRAME + 2,
            FRAME + 1
        ])]
    );
    assert_eq!(
        log.take(),
        vec![Notice::Lower(3), Notice::Lower(2), Notice::Lower(1)]
    );
}

#[test]
fn iconic_chain_members_restack_but_keep_their_list_position() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 400, 300));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    screen.manage_client(transient(2, 1, 200, 100));
    screen.add_window(&mut display, 0, 2, false).unwrap();
    screen.manage_client(window(3, 200, 100));
    screen.add_window(&mut display, 0, 3, false).unwrap();
    screen.client_mut(2).flags.insert(WindowFlags::ICONIC);
    display.take();

    screen.raise_window(&mut display, 1).unwrap();

    // the iconic dialog still joins the batched restack, but only the owner
    // moves in the stacking list
    assert_eq!(
        screen.workspace(0).stacking_order().collect::<Vec<_>>(),
        [1, 3, 2]
    );
    assert_eq!(
        display.take(),
        vec![DisplayEvent::Raise(vec![FRAME + 1, FRAME + 2])]
    );
}

#[test]
fn show_all_maps_front_to_back_and_hide_all_withdraws_in_reverse() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=3 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    screen.client_mut(3).flags.insert(WindowFlags::STUCK);
    display.take();

    screen.show_all(&mut display, 0).unwrap();
    // stacking is [3, 2, 1] front to back
    assert_eq!(display.maps(), vec![FRAME + 3, FRAME + 2, FRAME + 1]);
    display.take();

    screen.hide_all(&mut display, 0).unwrap();
    // back to front, and the stuck window 3 stays put
    assert_eq!(display.unmaps(), vec![FRAME + 1, FRAME + 2]);
}

#[test]
fn remove_all_iconifies_until_the_workspace_is_empty() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=3 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    display.take();

    screen.remove_all(&mut display, 0).unwrap();

    assert_eq!(screen.workspace(0).count(), 0);
    for id in 1..=3 {
        assert!(screen.client(id).is_iconic(), "window {id}");
    }
    assert_eq!(display.unmaps(), vec![FRAME + 1, FRAME + 2, FRAME + 3]);
}

#[test]
fn change_workspace_swaps_visibility_and_restores_cached_focus() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    for id in 1..=2 {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }
    screen.manage_client(window(3, 200, 100));
    screen.add_window(&mut display, 1, 3, false).unwrap();
    screen.workspace_mut(1).set_last_focus(Some(3));
    display.take();
    log.take();

    assert!(screen.workspace(0).is_current(screen.active_workspace()));
    screen.change_workspace(&mut display, 1).unwrap();

    assert_eq!(screen.active_workspace(), 1);
    assert!(screen.workspace(1).is_current(screen.active_workspace()));
    assert_eq!(screen.focused_window(), Some(3));
    assert_eq!(
        display.take(),
        vec![
            DisplayEvent::Unmap(FRAME + 1),
            DisplayEvent::Unmap(FRAME + 2),
            DisplayEvent::Map(FRAME + 3),
            DisplayEvent::Focus(3),
        ]
    );
    assert_eq!(log.take(), vec![Notice::Workspace(1)]);
}

#[test]
fn change_workspace_to_the_current_one_is_a_no_op() {
    let (mut screen, mut display, log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 200, 100));
    screen.add_window(&mut display, 0, 1, false).unwrap();
    display.take();
    log.take();

    screen.change_workspace(&mut display, 0).unwrap();

    assert_eq!(display.take(), vec![]);
    assert_eq!(log.take(), vec![]);
}

#[test]
fn send_window_list_replays_membership_in_list_order() {
    let (mut screen, mut display, _log) = test_screen(PlacementPolicy::RowSmart);
    for id in [5, 9, 7] {
        screen.manage_client(window(id, 200, 100));
        screen.add_window(&mut display, 0, id, false).unwrap();
    }

    let mut listener = NoticeLog::default();
    screen.send_window_list(0, &mut listener);

    assert_eq!(
        listener.take(),
        vec![Notice::Add(5, 0), Notice::Add(9, 0), Notice::Add(7, 0)]
    );
}

#[test]
fn workspace_names_come_from_settings_with_defaults_past_the_end() {
    let mut config = settings(PlacementPolicy::RowSmart);
    config.workspace_names = vec!["mail".into()];
    let screen = Screen::new(&config, Rect::new(0, 0, 1000, 800));

    assert_eq!(screen.workspace(0).name(), "mail");
    assert_eq!(screen.workspace(1).name(), "Workspace 2");
}

#[test]
fn unmanaging_a_window_severs_its_transient_links() {
    let (mut screen, _display, _log) = test_screen(PlacementPolicy::RowSmart);
    screen.manage_client(window(1, 400, 300));
    screen.manage_client(transient(2, 1, 200, 100));
    assert_eq!(screen.client(1).transients, [2]);

    screen.unmanage_client(2).unwrap();
    assert!(screen.client(1).transients.is_empty());

    screen.manage_client(transient(3, 1, 200, 100));
    screen.unmanage_client(1).unwrap();
    assert_eq!(screen.client(3).transient_for, None);
    assert!(!screen.is_managed(1));
}
