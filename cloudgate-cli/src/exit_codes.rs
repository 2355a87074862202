//! Exit codes for the cloudgate binary

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error
pub const EXIT_ERROR: i32 = 1;

/// Completed with warnings
#[allow(dead_code)]
pub const EXIT_WARNING: i32 = 2;
