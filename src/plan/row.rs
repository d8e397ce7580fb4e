//! A single row of the unwind table.

#[cfg(test)]
mod tests;

use alloc::collections::{btree_map::Entry, BTreeMap};

use crate::{FaValue, RegNum, RegisterLocation};

/// The rules that apply from `offset` into the function until the next row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row<'a> {
    /// Offset from the start of the function.
    offset: i64,
    cfa_value: FaValue<'a>,
    afa_value: FaValue<'a>,
    register_locations: BTreeMap<RegNum, RegisterLocation<'a>>,
    /// Whether a register missing from `register_locations` is undefined
    /// instead of unspecified.
    unspecified_registers_are_undefined: bool,
}

impl<'a> Row<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i64) {
        self.offset = offset;
    }

    pub fn slide_offset(&mut self, delta: i64) {
        self.offset = self.offset.wrapping_add(delta);
    }

    pub fn cfa_value(&self) -> &FaValue<'a> {
        &self.cfa_value
    }

    pub fn cfa_value_mut(&mut self) -> &mut FaValue<'a> {
        &mut self.cfa_value
    }

    pub fn afa_value(&self) -> &FaValue<'a> {
        &self.afa_value
    }

    pub fn afa_value_mut(&mut self) -> &mut FaValue<'a> {
        &mut self.afa_value
    }

    /// The rule recorded for `reg`. `None` is "no rule", which is not the same
    /// thing as an explicit [`RegisterLocation::Undefined`].
    pub fn register_info(&self, reg: RegNum) -> Option<RegisterLocation<'a>> {
        self.register_locations.get(&reg).copied()
    }

    pub fn set_register_info(&mut self, reg: RegNum, location: RegisterLocation<'a>) {
        self.register_locations.insert(reg, location);
    }

    pub fn remove_register_info(&mut self, reg: RegNum) {
        self.register_locations.remove(&reg);
    }

    /// All recorded rules, in ascending register order.
    pub fn registers(&self) -> impl Iterator<Item = (RegNum, &RegisterLocation<'a>)> + '_ {
        self.register_locations.iter().map(|(&reg, loc)| (reg, loc))
    }

    pub fn set_register_location_to_at_cfa_plus_offset(
        &mut self,
        reg: RegNum,
        offset: i32,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::AtCfaPlusOffset(offset), can_replace)
    }

    pub fn set_register_location_to_is_cfa_plus_offset(
        &mut self,
        reg: RegNum,
        offset: i32,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::IsCfaPlusOffset(offset), can_replace)
    }

    pub fn set_register_location_to_at_afa_plus_offset(
        &mut self,
        reg: RegNum,
        offset: i32,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::AtAfaPlusOffset(offset), can_replace)
    }

    pub fn set_register_location_to_is_afa_plus_offset(
        &mut self,
        reg: RegNum,
        offset: i32,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::IsAfaPlusOffset(offset), can_replace)
    }

    /// Marks `reg` as undefined. On top of `can_replace`, an existing rule may
    /// be overwritten if it is [`RegisterLocation::Unspecified`] and
    /// `can_replace_only_if_unspecified` is set.
    pub fn set_register_location_to_undefined(
        &mut self,
        reg: RegNum,
        can_replace: bool,
        can_replace_only_if_unspecified: bool,
    ) -> bool {
        match self.register_locations.entry(reg) {
            Entry::Vacant(entry) => {
                entry.insert(RegisterLocation::Undefined);
                true
            }
            Entry::Occupied(mut entry) => {
                if can_replace || (can_replace_only_if_unspecified && entry.get().is_unspecified())
                {
                    entry.insert(RegisterLocation::Undefined);
                    true
                } else {
                    trace!(?reg, existing = ?entry.get(), "not replacing rule with undefined");
                    false
                }
            }
        }
    }

    pub fn set_register_location_to_unspecified(&mut self, reg: RegNum, can_replace: bool) -> bool {
        self.set_guarded(reg, RegisterLocation::Unspecified, can_replace)
    }

    pub fn set_register_location_to_register(
        &mut self,
        reg: RegNum,
        other_reg: RegNum,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::InOtherRegister(other_reg), can_replace)
    }

    pub fn set_register_location_to_same(&mut self, reg: RegNum, must_replace: bool) -> bool {
        self.set_guarded(reg, RegisterLocation::Same, must_replace)
    }

    /// `expr` is borrowed, not copied.
    pub fn set_register_location_to_is_dwarf_expression(
        &mut self,
        reg: RegNum,
        expr: &'a [u8],
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::IsDwarfExpression(expr), can_replace)
    }

    /// `expr` is borrowed, not copied.
    pub fn set_register_location_to_at_dwarf_expression(
        &mut self,
        reg: RegNum,
        expr: &'a [u8],
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::AtDwarfExpression(expr), can_replace)
    }

    pub fn set_register_location_to_is_constant(
        &mut self,
        reg: RegNum,
        value: u64,
        can_replace: bool,
    ) -> bool {
        self.set_guarded(reg, RegisterLocation::IsConstant(value), can_replace)
    }

    /// When set, registers without a rule in this row must be treated as
    /// undefined rather than looked up in a newer frame. This is for rows
    /// where spills can't be tracked (a jitted frame without unwind info,
    /// for example), where the value found further down the stack may
    /// already have been overwritten.
    pub fn set_unspecified_registers_are_undefined(&mut self, unspec_is_undef: bool) {
        self.unspecified_registers_are_undefined = unspec_is_undef;
    }

    pub fn unspecified_registers_are_undefined(&self) -> bool {
        self.unspecified_registers_are_undefined
    }

    pub fn clear(&mut self) {
        self.offset = 0;
        self.cfa_value.set_unspecified();
        self.afa_value.set_unspecified();
        self.register_locations.clear();
        self.unspecified_registers_are_undefined = false;
    }

    fn set_guarded(&mut self, reg: RegNum, location: RegisterLocation<'a>, can_replace: bool) -> bool {
        match self.register_locations.entry(reg) {
            Entry::Vacant(entry) => {
                entry.insert(location);
                true
            }
            Entry::Occupied(mut entry) if can_replace => {
                entry.insert(location);
                true
            }
            Entry::Occupied(entry) => {
                trace!(?reg, existing = ?entry.get(), new = ?location, "not replacing rule");
                false
            }
        }
    }
}
