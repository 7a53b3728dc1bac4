//! Display Server Seam
//!
//! The narrow set of requests the workspace core issues against the display
//! server: batched chain restacks, configure, map/unmap and input focus.
//! Production traffic goes through [`X11DisplayServer`]; tests substitute a
//! recording double.

use anyhow::Result;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConfigureWindowAux, ConnectionExt, InputFocus, StackMode};
use x11rb::rust_connection::RustConnection;

/// Requests the core issues against the display server.
///
/// The two restack entry points take *frame* handles and are batched: one
/// call per raise/lower of a whole transient chain, so the server repaints
/// once instead of once per window.
pub trait DisplayServer {
    /// Raise a transient chain. `frames` is ordered bottom-to-top: the chain
    /// owner first, the topmost transient last. The whole chain ends up above
    /// unrelated windows with its internal order preserved.
    fn raise_windows(&mut self, frames: &[u32]) -> Result<()>;

    /// Lower a transient chain. `frames` is ordered top-to-bottom: the
    /// topmost transient first, the chain owner last. The whole chain ends up
    /// below unrelated windows with its internal order preserved.
    fn lower_and_restack(&mut self, frames: &[u32]) -> Result<()>;

    /// Move and resize a frame window.
    fn configure_window(&mut self, frame: u32, x: i32, y: i32, width: u32, height: u32)
    -> Result<()>;

    fn map_window(&mut self, frame: u32) -> Result<()>;

    fn unmap_window(&mut self, frame: u32) -> Result<()>;

    /// Transfer input focus to a client window. Returns `false` when the
    /// request cannot be delivered (typically a client that is going away).
    fn set_input_focus(&mut self, window: u32) -> Result<bool>;
}

/// [`DisplayServer`] over a live X11 connection.
pub struct X11DisplayServer<'a> {
    conn: &'a RustConnection,
}

impl<'a> X11DisplayServer<'a> {
    pub fn new(conn: &'a RustConnection) -> Self {
        Self { conn }
    }
}

impl DisplayServer for X11DisplayServer<'_> {
    fn raise_windows(&mut self, frames: &[u32]) -> Result<()> {
        let Some((&top, rest)) = frames.split_last() else {
            return Ok(());
        };
        debug!("Raising {} frame(s), top 0x{:x}", frames.len(), top);

        // Put the chain top on top of the stack, then hang the rest of the
        // chain directly below it, one sibling at a time.
        self.conn
            .configure_window(top, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        let mut above = top;
        for &frame in rest.iter().rev() {
            self.conn.configure_window(
                frame,
                &ConfigureWindowAux::new()
                    .sibling(above)
                    .stack_mode(StackMode::BELOW),
            )?;
            above = frame;
        }
        self.conn.flush()?;
        Ok(())
    }

    fn lower_and_restack(&mut self, frames: &[u32]) -> Result<()> {
        let Some((&top, rest)) = frames.split_first() else {
            return Ok(());
        };
        debug!("Lowering {} frame(s), top 0x{:x}", frames.len(), top);

        // Drop the chain top to the bottom of the stack, then rebuild the
        // chain below it so the owner ends up lowest.
        self.conn
            .configure_window(top, &ConfigureWindowAux::new().stack_mode(StackMode::BELOW))?;
        let mut above = top;
        for &frame in rest {
            self.conn.configure_window(
                frame,
                &ConfigureWindowAux::new()
                    .sibling(above)
                    .stack_mode(StackMode::BELOW),
            )?;
            above = frame;
        }
        self.conn.flush()?;
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
        self.conn.configure_window(
            frame,
            &ConfigureWindowAux::new()
                .x(x)
                .y(y)
                .width(width)
                .height(height),
        )?;
        self.conn.flush()?;
        Ok(())
    }

    fn map_window(&mut self, frame: u32) -> Result<()> {
        self.conn.map_window(frame)?;
        self.conn.flush()?;
        Ok(())
    }

    fn unmap_window(&mut self, frame: u32) -> Result<()> {
        self.conn.unmap_window(frame)?;
        self.conn.flush()?;
        Ok(())
    }

    fn set_input_focus(&mut self, window: u32) -> Result<bool> {
        // A client that has already gone away fails the request; callers
        // treat that the same as a refusal.
        let sent = self
            .conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)
            .is_ok();
        if sent {
            self.conn.flush()?;
        }
        Ok(sent)
    }
}
