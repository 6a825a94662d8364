use std::sync::Arc;

use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::host::{Host, Pane};
use crate::iface::Catalog;

/// Everything a bridge call needs: the host, the catalog, and whether a
/// document is currently active.
///
/// Passed explicitly to every operation instead of living in globals.
pub struct Session {
    host: Box<dyn Host>,
    catalog: Arc<Catalog>,
    active_buffer: Option<usize>,
}

impl Session {
    /// A session with no active document; the editor pane is unusable
    /// until [`Session::activate_buffer`] is called
    pub fn new(host: Box<dyn Host>, catalog: Arc<Catalog>) -> Self {
        Self {
            host,
            catalog,
            active_buffer: None,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        self.host.as_mut()
    }

    pub fn active_buffer(&self) -> Option<usize> {
        self.active_buffer
    }

    pub fn activate_buffer(&mut self, index: usize) {
        debug!(index, "buffer activated");
        self.active_buffer = Some(index);
    }

    pub fn deactivate_buffer(&mut self) {
        debug!("buffer deactivated");
        self.active_buffer = None;
    }

    /// Fails for the editor pane while no document is active
    pub fn check_pane(&self, pane: Pane) -> BridgeResult<()> {
        if pane == Pane::Editor && self.active_buffer.is_none() {
            return Err(BridgeError::SurfaceNotAccessible);
        }
        Ok(())
    }

    /// Whole contents of a pane
    pub fn pane_text(&mut self, pane: Pane) -> BridgeResult<String> {
        let len = self.host.length(pane)?;
        self.host.range(pane, 0, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn editor_requires_active_buffer() {
        let mut session = Session::new(Box::new(MemoryHost::new()), Arc::new(Catalog::builtin()));
        assert_eq!(
            session.check_pane(Pane::Editor),
            Err(BridgeError::SurfaceNotAccessible)
        );
        assert!(session.check_pane(Pane::Output).is_ok());

        session.activate_buffer(0);
        assert!(session.check_pane(Pane::Editor).is_ok());

        session.deactivate_buffer();
        assert!(session.check_pane(Pane::Editor).is_err());
    }
}
