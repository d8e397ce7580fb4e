use crate::{RegNum, INVALID_REGNUM};

/// How to compute a frame address, either the Canonical Frame Address or the
/// Aligned Frame Address of a row.
///
/// The AFA only exists for frames that realign the stack: it's the stack
/// pointer right after the realignment, and the only way to reach values
/// spilled after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaValue<'a> {
    #[default]
    Unspecified,
    /// `FA = reg + offset`
    RegisterPlusOffset { reg: RegNum, offset: i32 },
    /// `FA = deref(reg)`
    RegisterDereferenced(RegNum),
    /// `FA = eval(expr)`. Borrows the expression the same way
    /// [`RegisterLocation`](crate::RegisterLocation) does.
    DwarfExpression(&'a [u8]),
    /// There is no rule. Search the stack around `SP + offset` for something
    /// that looks like a return address.
    RaSearch(i32),
    /// `FA = constant`
    Constant(u64),
}

impl<'a> FaValue<'a> {
    pub fn set_unspecified(&mut self) {
        *self = Self::Unspecified;
    }

    pub fn set_is_register_plus_offset(&mut self, reg: RegNum, offset: i32) {
        *self = Self::RegisterPlusOffset { reg, offset };
    }

    pub fn set_is_register_dereferenced(&mut self, reg: RegNum) {
        *self = Self::RegisterDereferenced(reg);
    }

    pub fn set_is_dwarf_expression(&mut self, expr: &'a [u8]) {
        *self = Self::DwarfExpression(expr);
    }

    pub fn set_ra_search(&mut self, offset: i32) {
        *self = Self::RaSearch(offset);
    }

    pub fn set_is_constant(&mut self, value: u64) {
        *self = Self::Constant(value);
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    pub fn is_register_plus_offset(&self) -> bool {
        matches!(self, Self::RegisterPlusOffset { .. })
    }

    pub fn is_register_dereferenced(&self) -> bool {
        matches!(self, Self::RegisterDereferenced(_))
    }

    pub fn is_dwarf_expression(&self) -> bool {
        matches!(self, Self::DwarfExpression(_))
    }

    pub fn is_ra_search(&self) -> bool {
        matches!(self, Self::RaSearch(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn register_number(&self) -> RegNum {
        match *self {
            Self::RegisterPlusOffset { reg, .. } | Self::RegisterDereferenced(reg) => reg,
            _ => INVALID_REGNUM,
        }
    }

    pub fn offset(&self) -> i32 {
        match *self {
            Self::RegisterPlusOffset { offset, .. } | Self::RaSearch(offset) => offset,
            _ => 0,
        }
    }

    /// Moves a `reg + offset` value by `delta`. Any other value is left alone,
    /// which is what lets a whole plan be slid by calling this on every row.
    pub fn inc_offset(&mut self, delta: i32) {
        if let Self::RegisterPlusOffset { offset, .. } = self {
            *offset = offset.wrapping_add(delta);
        }
    }

    /// Same as [`FaValue::inc_offset`], but absolute.
    pub fn set_offset(&mut self, new_offset: i32) {
        if let Self::RegisterPlusOffset { offset, .. } = self {
            *offset = new_offset;
        }
    }

    pub fn dwarf_expression_bytes(&self) -> &'a [u8] {
        match *self {
            Self::DwarfExpression(expr) => expr,
            _ => &[],
        }
    }

    pub fn dwarf_expression_len(&self) -> usize {
        self.dwarf_expression_bytes().len()
    }

    pub fn constant(&self) -> u64 {
        match *self {
            Self::Constant(value) => value,
            _ => 0,
        }
    }
}
