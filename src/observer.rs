//! Transaction observers (§5 "Shared-resource policy", §4.2 "Observer
//! notification resilience").

use crate::transaction::ComponentTransaction;

/// A transaction observer. Implementations must not attempt to mutate the
/// engine from inside `on_transaction_completed`; re-entrant calls are
/// rejected by `GameState` (§5). An `Err` return is caught by the engine,
/// logged at warning level, and never interrupts other observers or the
/// transaction (§4.2 "Observer notification resilience").
pub trait TransactionObserver {
    fn on_transaction_completed(&self, tx: &ComponentTransaction) -> Result<(), String>;
}

/// An observer built from a plain closure, for lightweight test/host use.
pub struct ClosureObserver<F: Fn(&ComponentTransaction) -> Result<(), String>> {
    f: F,
}

impl<F: Fn(&ComponentTransaction) -> Result<(), String>> ClosureObserver<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: Fn(&ComponentTransaction) -> Result<(), String>> TransactionObserver for ClosureObserver<F> {
    fn on_transaction_completed(&self, tx: &ComponentTransaction) -> Result<(), String> {
        (self.f)(tx)
    }
}
