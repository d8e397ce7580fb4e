//! Human readable rendering of plans, for logs and debugging. The format is
//! not meant to be parsed.
//!
//! ```text
//! This UnwindPlan originally sourced from x86_64 at-func-entry default
//! This UnwindPlan is sourced from the compiler: no.
//! This UnwindPlan is valid at all instruction locations: not specified.
//! This UnwindPlan is for a trap handler function: not specified.
//! row[0]: 0: CFA=rsp+8 => rsp=CFA+0 rip=[CFA-8]
//! ```

use core::fmt::{self, Display, Write};

use crate::{
    FaValue, LazyBool, RegNum, RegisterKind, RegisterLocation, Row, UnwindPlan, INVALID_REGNUM,
};

/// Gives registers a name, usually by knowing the target's register file.
pub trait RegisterNames {
    fn register_name(&self, kind: RegisterKind, reg: RegNum) -> Option<&'static str>;
}

/// Renders every register as `reg<N>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegisterNames;

impl RegisterNames for NoRegisterNames {
    fn register_name(&self, _kind: RegisterKind, _reg: RegNum) -> Option<&'static str> {
        None
    }
}

struct RegName<'n> {
    reg: RegNum,
    kind: RegisterKind,
    names: &'n dyn RegisterNames,
}

fn reg_name(reg: RegNum, kind: RegisterKind, names: &dyn RegisterNames) -> RegName<'_> {
    RegName { reg, kind, names }
}

impl Display for RegName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reg == INVALID_REGNUM {
            return f.write_str("<invalid>");
        }
        match self.names.register_name(self.kind, self.reg) {
            Some(name) => f.write_str(name),
            None => write!(f, "reg{}", self.reg),
        }
    }
}

pub struct RegisterLocationDisplay<'l, 'n> {
    location: &'l RegisterLocation<'l>,
    kind: RegisterKind,
    names: &'n dyn RegisterNames,
}

impl<'a> RegisterLocation<'a> {
    pub fn display<'l, 'n>(
        &'l self,
        kind: RegisterKind,
        names: &'n dyn RegisterNames,
    ) -> RegisterLocationDisplay<'l, 'n> {
        RegisterLocationDisplay {
            location: self,
            kind,
            names,
        }
    }
}

impl Display for RegisterLocationDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.location {
            RegisterLocation::Unspecified => f.write_str("<unspec>"),
            RegisterLocation::Undefined => f.write_str("<undef>"),
            RegisterLocation::Same => f.write_str("<same>"),
            RegisterLocation::AtCfaPlusOffset(offset) => write!(f, "[CFA{offset:+}]"),
            RegisterLocation::IsCfaPlusOffset(offset) => write!(f, "CFA{offset:+}"),
            RegisterLocation::AtAfaPlusOffset(offset) => write!(f, "[AFA{offset:+}]"),
            RegisterLocation::IsAfaPlusOffset(offset) => write!(f, "AFA{offset:+}"),
            RegisterLocation::InOtherRegister(reg) => reg_name(reg, self.kind, self.names).fmt(f),
            RegisterLocation::AtDwarfExpression(_) => f.write_str("[dwarf-expr]"),
            RegisterLocation::IsDwarfExpression(_) => f.write_str("dwarf-expr"),
            RegisterLocation::IsConstant(value) => write!(f, "{value:#x}"),
        }
    }
}

pub struct FaValueDisplay<'v, 'n> {
    value: &'v FaValue<'v>,
    kind: RegisterKind,
    names: &'n dyn RegisterNames,
}

impl<'a> FaValue<'a> {
    pub fn display<'v, 'n>(
        &'v self,
        kind: RegisterKind,
        names: &'n dyn RegisterNames,
    ) -> FaValueDisplay<'v, 'n> {
        FaValueDisplay {
            value: self,
            kind,
            names,
        }
    }
}

impl Display for FaValueDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |reg| reg_name(reg, self.kind, self.names);
        match *self.value {
            FaValue::Unspecified => f.write_str("unspecified"),
            FaValue::RegisterPlusOffset { reg, offset } => write!(f, "{}{offset:+}", name(reg)),
            FaValue::RegisterDereferenced(reg) => write!(f, "[{}]", name(reg)),
            FaValue::DwarfExpression(_) => f.write_str("dwarf-expr"),
            FaValue::RaSearch(offset) => write!(f, "RaSearch@SP{offset:+}"),
            FaValue::Constant(value) => write!(f, "{value:#x}"),
        }
    }
}

pub struct RowDisplay<'r, 'n> {
    row: &'r Row<'r>,
    kind: RegisterKind,
    names: &'n dyn RegisterNames,
    base_addr: Option<u64>,
}

impl<'a> Row<'a> {
    /// With a `base_addr`, the row's offset is shown as an absolute address.
    pub fn display<'r, 'n>(
        &'r self,
        kind: RegisterKind,
        names: &'n dyn RegisterNames,
        base_addr: Option<u64>,
    ) -> RowDisplay<'r, 'n> {
        RowDisplay {
            row: self,
            kind,
            names,
            base_addr,
        }
    }
}

impl Display for RowDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = self.row;
        match self.base_addr {
            Some(base) => write!(f, "{:#018x}: ", base.wrapping_add_signed(row.offset()))?,
            None => write!(f, "{}: ", row.offset())?,
        }
        write!(f, "CFA={}", row.cfa_value().display(self.kind, self.names))?;
        if !row.afa_value().is_unspecified() {
            write!(f, " AFA={}", row.afa_value().display(self.kind, self.names))?;
        }
        f.write_str(" =>")?;
        for (reg, location) in row.registers() {
            let name = reg_name(reg, self.kind, self.names);
            write!(f, " {name}={}", location.display(self.kind, self.names))?;
        }
        if row.unspecified_registers_are_undefined() {
            f.write_str(" (unspecified registers are undefined)")?;
        }
        Ok(())
    }
}

pub struct UnwindPlanDisplay<'p, 'n> {
    plan: &'p UnwindPlan<'p>,
    names: &'n dyn RegisterNames,
    base_addr: Option<u64>,
}

impl<'a> UnwindPlan<'a> {
    pub fn display<'p, 'n>(
        &'p self,
        names: &'n dyn RegisterNames,
        base_addr: Option<u64>,
    ) -> UnwindPlanDisplay<'p, 'n> {
        UnwindPlanDisplay {
            plan: self,
            names,
            base_addr,
        }
    }

    /// Prints the plan to stdout.
    pub fn dump(&self, names: &dyn RegisterNames, base_addr: Option<u64>) -> fmt::Result {
        writeln!(LibCStdoutWriter, "{}", self.display(names, base_addr))
    }
}

fn lazy_bool_str(value: LazyBool) -> &'static str {
    match value {
        LazyBool::Yes => "yes.",
        LazyBool::No => "no.",
        LazyBool::Calculate => "not specified.",
    }
}

impl Display for UnwindPlanDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        let kind = plan.register_kind();
        if !plan.source_name().is_empty() {
            writeln!(f, "This UnwindPlan originally sourced from {}", plan.source_name())?;
        }
        writeln!(
            f,
            "This UnwindPlan is sourced from the compiler: {}",
            lazy_bool_str(plan.sourced_from_compiler())
        )?;
        writeln!(
            f,
            "This UnwindPlan is valid at all instruction locations: {}",
            lazy_bool_str(plan.valid_at_all_instructions())
        )?;
        writeln!(
            f,
            "This UnwindPlan is for a trap handler function: {}",
            lazy_bool_str(plan.for_signal_trap())
        )?;
        if plan.return_address_register() != INVALID_REGNUM {
            let name = reg_name(plan.return_address_register(), kind, self.names);
            writeln!(f, "Return address register: {name}")?;
        }
        if !plan.plan_valid_address_ranges().is_empty() {
            f.write_str("Address range of this UnwindPlan:")?;
            for range in plan.plan_valid_address_ranges() {
                write!(f, " [{:#x}-{:#x})", range.base, range.end())?;
            }
            writeln!(f)?;
        }
        for (idx, row) in plan.rows().enumerate() {
            writeln!(f, "row[{idx}]: {}", row.display(kind, self.names, self.base_addr))?;
        }
        Ok(())
    }
}

/// Writes straight to fd 1, we don't have `std::io`.
struct LibCStdoutWriter;

impl Write for LibCStdoutWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_all(s.as_bytes(), |buf| {
            // SAFETY: the pointer and length come from a live slice.
            unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) }
        })
    }
}

/// Keeps calling `write` until all of `bytes` is out. Partial writes may split
/// a UTF-8 character, so this works on bytes. Writing nothing is an error,
/// the rest of the output would be lost otherwise.
fn write_all(mut bytes: &[u8], mut write: impl FnMut(&[u8]) -> isize) -> fmt::Result {
    while !bytes.is_empty() {
        let written = write(bytes);
        if written <= 0 {
            return Err(fmt::Error);
        }
        bytes = bytes.get((written as usize)..).ok_or(fmt::Error)?;
    }
    Ok(())
}
