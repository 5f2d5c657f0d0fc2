//! Oracle collaborator interface.
//!
//! An oracle is an external expectation holder, typically a test assertion
//! sink such as a mock endpoint. Matchers forward the messages they observe
//! to it and then ask whether its expectations are currently satisfied.

use std::sync::Arc;

use crate::foundation::error::BoxError;
use crate::foundation::message::Message;

/// An external satisfied/unsatisfied expectation state.
///
/// Implementations are shared across threads and must use interior
/// mutability for [`record`](Oracle::record). The query methods must not
/// change the oracle's expectations.
pub trait Oracle: Send + Sync {
    /// Name used in canonical expression strings.
    fn name(&self) -> &str;

    /// Hands a copy of an observed message to the oracle.
    fn record(&self, message: &Message) -> Result<(), BoxError>;

    /// Returns whether the expectations are satisfied right now.
    fn is_satisfied(&self) -> Result<bool, BoxError>;

    /// Returns whether the expectations are satisfied once the exchange that
    /// triggered the query has completed.
    ///
    /// Queried for the `done` family of oracle conditions. Defaults to
    /// [`is_satisfied`](Oracle::is_satisfied).
    fn is_satisfied_after_completion(&self) -> Result<bool, BoxError> {
        self.is_satisfied()
    }
}

/// Shared, type-erased oracle.
pub type BoxedOracle = Arc<dyn Oracle>;
