//! The canonical, in-memory form of a function's call frame unwind information.
//!
//! Whatever the unwind data was derived from (`.eh_frame`, `.debug_frame`,
//! another table format or instruction analysis), it ends up as an
//! [`UnwindPlan`]: a table of [`Row`]s sorted by offset into the function,
//! each saying how to compute the Canonical Frame Address and where the
//! caller's registers were saved.
//!
//! ```text
//! LOC  CFA     rbp       rip
//! 0    rsp+8   <unspec>  [CFA-8]
//! 1    rsp+16  [CFA-16]  [CFA-8]
//! 4    rbp+16  [CFA-16]  [CFA-8]
//! ```
//!
//! The stack walker asks for the row that applies at a given offset with
//! [`UnwindPlan::row_for_function_offset`] and never needs to know where the
//! plan came from.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

use alloc::string::String;
use core::fmt;

pub mod arch;
mod display;
mod plan;
mod range;

pub use display::{
    FaValueDisplay, NoRegisterNames, RegisterLocationDisplay, RegisterNames, RowDisplay,
    UnwindPlanDisplay,
};
pub use plan::fa_value::FaValue;
pub use plan::location::RegisterLocation;
pub use plan::row::Row;
pub use plan::{LazyBool, RegisterKind, UnwindPlan};
pub use range::AddressRange;

/// A register number, in whatever [`RegisterKind`] the plan is expressed in.
pub type RegNum = u32;

/// Returned by accessors that are asked for a register that isn't there.
pub const INVALID_REGNUM: RegNum = u32::MAX;

/// A plan was built out of order. Only the checked construction functions
/// return this, everything else degrades to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
