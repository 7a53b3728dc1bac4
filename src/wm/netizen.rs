//! Netizens
//!
//! External listeners (pagers, taskbars, other workspace observers) that are
//! told about membership and stacking changes. The screen keeps a registry of
//! them and fans every event out; a newly attached listener can be brought up
//! to date with a one-shot membership replay (`Screen::send_window_list`).

/// Callbacks a listener receives. `window` is always the client handle, not
/// the frame.
pub trait Netizen {
    /// `window` joined `workspace`.
    fn window_add(&mut self, window: u32, workspace: u32);

    /// `window` left its workspace.
    fn window_del(&mut self, window: u32);

    /// `window`'s chain was raised.
    fn window_raise(&mut self, window: u32);

    /// `window`'s chain was lowered.
    fn window_lower(&mut self, window: u32);

    /// The screen switched to `workspace`.
    fn workspace_change(&mut self, workspace: u32);
}
