/// Error type for the upshift crate.
///
/// Variants map onto the ways a driver can fail: reaching the database,
/// establishing or upgrading the tracking table, executing a payload,
/// keeping the applied-version set consistent, and reading it back.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// The database could not be reached, or the connection handle is no
    /// longer usable.
    #[error("connection error: {0}")]
    Connection(String),

    /// The tracking table could not be inspected, created, or altered in
    /// place from its legacy shape. The table is left in whatever state
    /// the failed step produced; manual intervention is required.
    #[error("schema upgrade error: {0}")]
    SchemaUpgrade(String),

    /// A migration payload (or its commit) failed, or its content was not
    /// the valid UTF-8 text the server expects.
    ///
    /// When `non_transactional` is true the statements ran outside a
    /// transaction: the database may be left in an intermediate state, and
    /// no version was recorded.
    #[error("execution error: {detail}")]
    Execution {
        detail: String,
        non_transactional: bool,
    },

    /// A write to the applied-version set violated an invariant, such as
    /// recording a version that is already present.
    #[error("constraint error: {0}")]
    Constraint(String),

    /// Reading the applied-version set failed.
    #[error("query error: {0}")]
    Query(String),
}
