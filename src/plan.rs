//! The unwind plan of a single function.
//!
//! A plan is built once by whoever decodes the unwind info (a CFI parser, an
//! instruction analyzer, an ABI default) and is read-only after that. There is
//! no locking: once it's built it's handed out by shared reference, and all
//! the queries take `&self`.
//!
//! Rows are kept sorted by offset. [`UnwindPlan::append_row`] trusts the
//! caller for that, [`UnwindPlan::insert_row`] finds the right spot and
//! [`UnwindPlan::try_append_row`] checks.

pub(crate) mod fa_value;
pub(crate) mod location;
pub(crate) mod row;


use alloc::{format, string::String, vec::Vec};

use crate::{AddressRange, Error, RegNum, Result, Row, INVALID_REGNUM};

/// The numbering scheme register numbers in a plan are expressed in. They have
/// to be translated to the target's numbering before they can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegisterKind {
    /// `.eh_frame` numbering. Differs from DWARF on a few targets (i386 on
    /// Darwin).
    EhFrame,
    /// DWARF numbering as defined by the target's psABI.
    #[default]
    Dwarf,
    /// Target independent roles: pc, sp, fp, ra, flags.
    Generic,
    /// Whatever the debug server uses.
    ProcessPlugin,
    /// The debugger's own numbering.
    Native,
}

/// A boolean that may not have been determined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LazyBool {
    Yes,
    No,
    /// The producer didn't say. Consumers have to assume the worst.
    #[default]
    Calculate,
}

impl From<bool> for LazyBool {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl LazyBool {
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Calculate => None,
        }
    }
}

/// The rows of a function's unwind table plus what is known about where
/// they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindPlan<'a> {
    rows: Vec<Row<'a>>,
    /// Empty means valid across the whole function.
    valid_ranges: Vec<AddressRange>,
    register_kind: RegisterKind,
    /// The register holding the caller's return address, e.g. lr on arm.
    return_addr_register: RegNum,
    /// Where the plan came from, for diagnostics only.
    source_name: String,
    sourced_from_compiler: LazyBool,
    valid_at_all_instructions: LazyBool,
    for_signal_trap: LazyBool,
}

impl Default for UnwindPlan<'_> {
    fn default() -> Self {
        Self::new(RegisterKind::default())
    }
}

impl<'a> UnwindPlan<'a> {
    pub fn new(register_kind: RegisterKind) -> Self {
        Self {
            rows: Vec::new(),
            valid_ranges: Vec::new(),
            register_kind,
            return_addr_register: INVALID_REGNUM,
            source_name: String::new(),
            sourced_from_compiler: LazyBool::Calculate,
            valid_at_all_instructions: LazyBool::Calculate,
            for_signal_trap: LazyBool::Calculate,
        }
    }

    /// Builds a plan from rows that must already be sorted by offset.
    pub fn from_rows(
        register_kind: RegisterKind,
        rows: impl IntoIterator<Item = Row<'a>>,
    ) -> Result<Self> {
        let mut plan = Self::new(register_kind);
        for row in rows {
            plan.try_append_row(row)?;
        }
        Ok(plan)
    }

    /// Adds `row` at the end. The caller guarantees that its offset is not
    /// smaller than the last row's. A row at the same offset as the last one
    /// replaces it.
    pub fn append_row(&mut self, row: Row<'a>) {
        match self.rows.last_mut() {
            Some(last) if last.offset() == row.offset() => {
                trace!(offset = row.offset(), "replacing last row");
                *last = row;
            }
            _ => self.rows.push(row),
        }
    }

    /// [`UnwindPlan::append_row`], but an out of order row is an error instead
    /// of a broken plan.
    pub fn try_append_row(&mut self, row: Row<'a>) -> Result<()> {
        if let Some(last) = self.rows.last() {
            if row.offset() < last.offset() {
                return Err(Error(format!(
                    "row at offset {} appended after row at offset {}",
                    row.offset(),
                    last.offset()
                )));
            }
        }
        self.append_row(row);
        Ok(())
    }

    /// Inserts `row` at its sorted position. If there already is a row at that
    /// offset, it is only overwritten with `replace_existing`, otherwise `row`
    /// is dropped.
    pub fn insert_row(&mut self, row: Row<'a>, replace_existing: bool) {
        let idx = self.rows.partition_point(|r| r.offset() < row.offset());
        match self.rows.get_mut(idx) {
            Some(existing) if existing.offset() == row.offset() => {
                if replace_existing {
                    trace!(offset = row.offset(), "replacing existing row");
                    *existing = row;
                } else {
                    trace!(offset = row.offset(), "row already present, dropping new row");
                }
            }
            _ => self.rows.insert(idx, row),
        }
    }

    /// The row in effect at `offset` into the function: the last one starting
    /// at or before it. `None` for the offset means the function start isn't
    /// known, in which case the last row is the best we have.
    pub fn row_for_function_offset(&self, offset: Option<i64>) -> Option<&Row<'a>> {
        let end = match offset {
            Some(offset) => self.rows.partition_point(|row| row.offset() <= offset),
            None => self.rows.len(),
        };
        self.rows.get(end.checked_sub(1)?)
    }

    pub fn is_valid_row_index(&self, idx: usize) -> bool {
        idx < self.rows.len()
    }

    pub fn row_at_index(&self, idx: usize) -> Option<&Row<'a>> {
        self.rows.get(idx)
    }

    pub fn last_row(&self) -> Option<&Row<'a>> {
        self.rows.last()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &Row<'a>> + '_ {
        self.rows.iter()
    }

    /// Slides the CFA of every row by `delta`. Only `reg + offset` CFAs move.
    pub fn inc_cfa_offsets(&mut self, delta: i32) {
        for row in &mut self.rows {
            row.cfa_value_mut().inc_offset(delta);
        }
    }

    pub fn register_kind(&self) -> RegisterKind {
        self.register_kind
    }

    pub fn set_register_kind(&mut self, kind: RegisterKind) {
        self.register_kind = kind;
    }

    pub fn return_address_register(&self) -> RegNum {
        self.return_addr_register
    }

    pub fn set_return_address_register(&mut self, reg: RegNum) {
        self.return_addr_register = reg;
    }

    /// The register the first row computes the CFA from, a cheap sanity check
    /// before trusting the plan.
    pub fn initial_cfa_register(&self) -> RegNum {
        self.rows
            .first()
            .map_or(INVALID_REGNUM, |row| row.cfa_value().register_number())
    }

    /// Restricts the plan to `ranges`, for plans that are only correct in part
    /// of the function (not in the prologue, for example).
    pub fn set_plan_valid_address_ranges(&mut self, ranges: Vec<AddressRange>) {
        self.valid_ranges = ranges;
    }

    pub fn plan_valid_address_ranges(&self) -> &[AddressRange] {
        &self.valid_ranges
    }

    pub fn plan_valid_at_address(&self, addr: u64) -> bool {
        if self.valid_ranges.is_empty() {
            return true;
        }
        let valid = self.valid_ranges.iter().any(|range| range.contains(addr));
        if !valid {
            debug!(
                source = %self.source_name,
                "unwind plan is not valid at address {addr:#x}"
            );
        }
        valid
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn set_source_name(&mut self, name: impl Into<String>) {
        self.source_name = name.into();
    }

    /// Whether the plan was emitted by a compiler.
    pub fn sourced_from_compiler(&self) -> LazyBool {
        self.sourced_from_compiler
    }

    pub fn set_sourced_from_compiler(&mut self, from_compiler: LazyBool) {
        self.sourced_from_compiler = from_compiler;
    }

    /// Whether the plan is correct at every instruction. If it isn't, it can
    /// only be trusted at call sites (which is all exception handling needs).
    pub fn valid_at_all_instructions(&self) -> LazyBool {
        self.valid_at_all_instructions
    }

    pub fn set_valid_at_all_instructions(&mut self, valid_at_all_insn: LazyBool) {
        self.valid_at_all_instructions = valid_at_all_insn;
    }

    /// Whether this is the plan of a signal trampoline, whose saved pc may
    /// have been set by the kernel and not follow a call.
    pub fn for_signal_trap(&self) -> LazyBool {
        self.for_signal_trap
    }

    pub fn set_for_signal_trap(&mut self, is_for_signal_trap: LazyBool) {
        self.for_signal_trap = is_for_signal_trap;
    }

    /// Drops all rows and ranges and resets the metadata. The return address
    /// register is kept.
    #[instrument(skip(self), fields(source = %self.source_name, rows = self.rows.len()))]
    pub fn clear(&mut self) {
        self.rows.clear();
        self.valid_ranges.clear();
        self.register_kind = RegisterKind::Dwarf;
        self.source_name.clear();
        self.sourced_from_compiler = LazyBool::Calculate;
        self.valid_at_all_instructions = LazyBool::Calculate;
        self.for_signal_trap = LazyBool::Calculate;
    }
}
