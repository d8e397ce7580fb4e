use crate::{RegNum, INVALID_REGNUM};

/// How to recover the value a register had in the caller.
///
/// The DWARF expression variants borrow their bytes. They are never copied,
/// so the buffer (usually the section data of the module the plan was
/// derived from) has to outlive every location, row and plan pointing into
/// it.
///
/// The payload accessors never fail: asking a location for a payload it
/// doesn't have returns `0`, [`INVALID_REGNUM`] or an empty slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterLocation<'a> {
    /// Nothing is known about this register. It may well be unchanged, but
    /// that's only an assumption.
    #[default]
    Unspecified,
    /// The register has no recoverable value in the previous frame (by
    /// convention, it is not preserved by a callee).
    Undefined,
    /// The register has not been modified from the previous frame.
    Same,
    /// `reg = deref(CFA + offset)`
    AtCfaPlusOffset(i32),
    /// `reg = CFA + offset`
    IsCfaPlusOffset(i32),
    /// `reg = deref(AFA + offset)`
    AtAfaPlusOffset(i32),
    /// `reg = AFA + offset`
    IsAfaPlusOffset(i32),
    /// The previous value of this register is stored in another register.
    InOtherRegister(RegNum),
    /// `reg = deref(eval(expr))`
    AtDwarfExpression(&'a [u8]),
    /// `reg = eval(expr)`
    IsDwarfExpression(&'a [u8]),
    /// `reg = constant`
    IsConstant(u64),
}

impl<'a> RegisterLocation<'a> {
    pub fn set_unspecified(&mut self) {
        *self = Self::Unspecified;
    }

    pub fn set_undefined(&mut self) {
        *self = Self::Undefined;
    }

    pub fn set_same(&mut self) {
        *self = Self::Same;
    }

    pub fn set_at_cfa_plus_offset(&mut self, offset: i32) {
        *self = Self::AtCfaPlusOffset(offset);
    }

    pub fn set_is_cfa_plus_offset(&mut self, offset: i32) {
        *self = Self::IsCfaPlusOffset(offset);
    }

    pub fn set_at_afa_plus_offset(&mut self, offset: i32) {
        *self = Self::AtAfaPlusOffset(offset);
    }

    pub fn set_is_afa_plus_offset(&mut self, offset: i32) {
        *self = Self::IsAfaPlusOffset(offset);
    }

    pub fn set_in_register(&mut self, reg: RegNum) {
        *self = Self::InOtherRegister(reg);
    }

    pub fn set_at_dwarf_expression(&mut self, expr: &'a [u8]) {
        *self = Self::AtDwarfExpression(expr);
    }

    pub fn set_is_dwarf_expression(&mut self, expr: &'a [u8]) {
        *self = Self::IsDwarfExpression(expr);
    }

    pub fn set_is_constant(&mut self, value: u64) {
        *self = Self::IsConstant(value);
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same)
    }

    pub fn is_at_cfa_plus_offset(&self) -> bool {
        matches!(self, Self::AtCfaPlusOffset(_))
    }

    pub fn is_cfa_plus_offset(&self) -> bool {
        matches!(self, Self::IsCfaPlusOffset(_))
    }

    pub fn is_at_afa_plus_offset(&self) -> bool {
        matches!(self, Self::AtAfaPlusOffset(_))
    }

    pub fn is_afa_plus_offset(&self) -> bool {
        matches!(self, Self::IsAfaPlusOffset(_))
    }

    pub fn is_in_other_register(&self) -> bool {
        matches!(self, Self::InOtherRegister(_))
    }

    pub fn is_at_dwarf_expression(&self) -> bool {
        matches!(self, Self::AtDwarfExpression(_))
    }

    pub fn is_dwarf_expression(&self) -> bool {
        matches!(self, Self::IsDwarfExpression(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::IsConstant(_))
    }

    /// The offset from the CFA or AFA, `0` for every other variant.
    pub fn offset(&self) -> i32 {
        match *self {
            Self::AtCfaPlusOffset(offset)
            | Self::IsCfaPlusOffset(offset)
            | Self::AtAfaPlusOffset(offset)
            | Self::IsAfaPlusOffset(offset) => offset,
            _ => 0,
        }
    }

    /// The register holding the value, [`INVALID_REGNUM`] unless this is
    /// [`RegisterLocation::InOtherRegister`].
    pub fn register_number(&self) -> RegNum {
        match *self {
            Self::InOtherRegister(reg) => reg,
            _ => INVALID_REGNUM,
        }
    }

    /// The expression bytes, empty unless this is one of the two expression
    /// variants. The returned slice borrows the original buffer, not `self`.
    pub fn dwarf_expression_bytes(&self) -> &'a [u8] {
        match *self {
            Self::AtDwarfExpression(expr) | Self::IsDwarfExpression(expr) => expr,
            _ => &[],
        }
    }

    pub fn dwarf_expression_len(&self) -> usize {
        self.dwarf_expression_bytes().len()
    }

    pub fn constant(&self) -> u64 {
        match *self {
            Self::IsConstant(value) => value,
            _ => 0,
        }
    }
}
