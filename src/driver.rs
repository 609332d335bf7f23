//! The database-agnostic driver contract.
//!
//! A driver executes one migration file at a time and owns the durable
//! record of applied versions. The engine that sequences files holds
//! drivers behind this trait. Connection targets are backend-specific, so
//! each backend exposes its own constructor and only the already-connected
//! surface is part of the contract.

use crate::error::Error;
use crate::file::{MigrationFile, Version};
use crate::pipe::EventSender;

/// One database backend: executes migration files and owns the durable
/// record of applied versions.
pub trait Driver {
    /// File extension migration files for this backend carry, without the
    /// leading dot.
    fn filename_extension(&self) -> &'static str;

    /// Execute `file` in the background, reporting the outcome over
    /// `pipe`.
    ///
    /// The pipe closes once the migration has run to completion. At most
    /// one migrate call may be outstanding per driver; start the next one
    /// only after the previous pipe has closed.
    fn migrate(&mut self, file: MigrationFile, pipe: EventSender);

    /// The highest applied version, or 0 when none has been applied.
    fn version(&mut self) -> Result<Version, Error>;

    /// Every applied version, in ascending order.
    fn versions(&mut self) -> Result<Vec<Version>, Error>;

    /// Release the underlying connection. Consuming: a closed driver
    /// cannot be reused.
    fn close(self: Box<Self>) -> Result<(), Error>;
}
