//! Compile-time constants

/// Add command line flag `-v`.
pub const ENABLE_LOGGING: bool = true;
/// Whether to do bounds checking when accessing array elements.
pub const ENABLE_BOUNDS_CHECKING: bool = cfg!(debug_assertions);
/// Check the `requires!()` assertions at runtime (cheap).
pub const CHECK_PRECONDITIONS: bool = true;
/// Check the `invariant!()` assertions at runtime (cheap).
pub const CHECK_INVARIANTS: bool = true;
/// Check that every gate only references earlier gates (linear in the circuit size).
pub const CHECK_CIRCUIT_INVARIANTS: bool = cfg!(debug_assertions);
