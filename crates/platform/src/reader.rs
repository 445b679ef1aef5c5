//! Hardware reader trait.

use crate::bag::RawPropertyBag;

/// A source of raw battery properties.
///
/// Implementations must never panic or block indefinitely: a missing
/// battery, an unreadable file or a stalled helper process all yield
/// `None`, and a field the source does not report is left unset.
pub trait HardwareReader: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Query the OS for the current battery properties.
    fn read(&mut self) -> Option<RawPropertyBag>;

    /// Check if this source can work on the current system.
    fn is_supported() -> bool
    where
        Self: Sized,
    {
        true
    }
}
