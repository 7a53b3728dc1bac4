//! graphite: workspace and window-placement core for an X11 window manager.
//!
//! One [`Screen`] owns a fixed set of workspaces and the windows managed on
//! them. The crate covers membership (ordered window lists with dense window
//! numbers), z-order (per-workspace stacking lists kept in lockstep with the
//! server through batched restacks of whole transient chains) and initial
//! placement (row/column smart placement over the free screen space, with a
//! cascade fallback). Everything display-facing goes through the
//! [`wm::display::DisplayServer`] seam, so the core runs against a live
//! `x11rb` connection in production and against doubles in tests.

pub mod wm;

pub use wm::client::{Client, WindowFlags};
pub use wm::display::{DisplayServer, X11DisplayServer};
pub use wm::geometry::Rect;
pub use wm::netizen::Netizen;
pub use wm::screen::Screen;
pub use wm::settings::{ColDirection, PlacementPolicy, RowDirection, ScreenSettings};
pub use wm::workspace::Workspace;
