//! Operator interrupts during a request/response exchange.
//!
//! While an exchange is in flight, SIGINT sets a flag instead of killing the
//! process. The receive loop polls the flag between reads and ends the
//! exchange cleanly. Outside an exchange SIGINT keeps its default action:
//! the first installation registers a conditional default handler that
//! terminates the process whenever no guard is alive. Exchanges are expected
//! to run one at a time.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use signal_hook::SigId;
use signal_hook::consts::signal::SIGINT;
use tracing::debug;

const INTERRUPT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::interrupt");

/// True while no exchange owns SIGINT.
static IDLE: OnceCell<Arc<AtomicBool>> = OnceCell::new();

fn idle_switch() -> io::Result<&'static Arc<AtomicBool>> {
    IDLE.get_or_try_init(|| {
        let idle = Arc::new(AtomicBool::new(true));
        signal_hook::flag::register_conditional_default(SIGINT, Arc::clone(&idle))?;
        debug!(target: INTERRUPT_TARGET, "default interrupt action armed");
        Ok(idle)
    })
}

/// Shared flag raised when the operator interrupts an exchange.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Creates a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt arrived since the flag was last cleared.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the flag by hand.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Lowers the flag.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Routes SIGINT to this flag until the returned guard drops.
    ///
    /// The flag is cleared first so a stale interrupt from an earlier
    /// exchange cannot end this one.
    pub fn install(&self) -> io::Result<InterruptGuard> {
        self.clear();
        let idle = idle_switch()?;
        let id = signal_hook::flag::register(SIGINT, Arc::clone(&self.0))?;
        idle.store(false, Ordering::SeqCst);
        debug!(target: INTERRUPT_TARGET, "interrupt handler installed");
        Ok(InterruptGuard {
            id: Some(id),
            idle: Some(idle),
        })
    }
}

/// Keeps SIGINT routed to an [`InterruptFlag`] for the lifetime of an
/// exchange. Dropping it restores the default action.
#[derive(Debug)]
pub struct InterruptGuard {
    id: Option<SigId>,
    idle: Option<&'static Arc<AtomicBool>>,
}

impl InterruptGuard {
    /// A guard that owns no handler, used when installation failed.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            id: None,
            idle: None,
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(idle) = self.idle.take() {
            idle.store(true, Ordering::SeqCst);
        }
        if let Some(id) = self.id.take() {
            let _ = signal_hook::low_level::unregister(id);
            debug!(target: INTERRUPT_TARGET, "interrupt handler removed");
        }
    }
}
