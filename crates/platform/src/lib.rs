//! Raw battery property readers for batlog.
//!
//! Each reader returns a [`RawPropertyBag`]: an untyped-unit, possibly
//! partial view of what the OS reports. Turning bags into a canonical
//! reading is the caller's job.
//!
//! Two kinds of source exist:
//!
//! - a *summary* source ([`SummaryReader`]), backed by `starship-battery`,
//!   that reports charge percentage and charging state
//! - a *detailed* source ([`RegistryReader`] on macOS, [`SysfsReader`] on
//!   Linux) that reports capacities, cycle count, temperature and voltage
//!
//! # Example
//!
//! ```ignore
//! use batlog_platform::{detailed_reader, HardwareReader, SummaryReader};
//!
//! let mut summary = SummaryReader::new();
//! if let Some(bag) = summary.read() {
//!     println!("Charge: {:?}%", bag.percentage);
//! }
//! let detailed = detailed_reader();
//! ```

mod bag;
mod command;
mod reader;

pub mod linux;
pub mod macos;
pub mod summary;

pub use bag::RawPropertyBag;
pub use linux::SysfsReader;
pub use macos::RegistryReader;
pub use reader::HardwareReader;
pub use summary::SummaryReader;

/// The detailed reader for the current platform, if there is one.
pub fn detailed_reader() -> Option<Box<dyn HardwareReader>> {
    if cfg!(target_os = "macos") {
        Some(Box::new(RegistryReader::new()))
    } else if cfg!(target_os = "linux") && SysfsReader::is_supported() {
        Some(Box::new(SysfsReader::new()))
    } else {
        None
    }
}
