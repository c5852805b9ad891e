//! Process exit codes shared by all subcommands.

pub const SUCCESS: i32 = 0;
pub const INPUT_ERROR: i32 = 1;
pub const EXECUTION_ERROR: i32 = 2;
pub const PARTIAL_FAILURE: i32 = 3;
