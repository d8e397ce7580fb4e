//! What we know about specific targets: register numbering, and the plans to
//! fall back to when a function has no unwind info of its own.

pub mod x86_64 {
    //! x86-64 System V. Register numbers are DWARF numbers from the psABI,
    //! which `.eh_frame` shares on this target.

    use crate::{LazyBool, RegNum, RegisterKind, RegisterNames, Row, UnwindPlan};

    pub const RAX: RegNum = 0;
    pub const RDX: RegNum = 1;
    pub const RCX: RegNum = 2;
    pub const RBX: RegNum = 3;
    pub const RSI: RegNum = 4;
    pub const RDI: RegNum = 5;
    pub const RBP: RegNum = 6;
    pub const RSP: RegNum = 7;
    pub const R8: RegNum = 8;
    pub const R9: RegNum = 9;
    pub const R10: RegNum = 10;
    pub const R11: RegNum = 11;
    pub const R12: RegNum = 12;
    pub const R13: RegNum = 13;
    pub const R14: RegNum = 14;
    pub const R15: RegNum = 15;
    /// The return address column.
    pub const RIP: RegNum = 16;

    const ADDR_SIZE: i32 = 8;

    const DWARF_NAMES: [&str; 17] = [
        "rax", "rdx", "rcx", "rbx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11", "r12",
        "r13", "r14", "r15", "rip",
    ];

    const GENERIC_NAMES: [&str; 5] = ["pc", "sp", "fp", "ra", "flags"];

    #[derive(Debug, Clone, Copy, Default)]
    pub struct X86_64;

    impl RegisterNames for X86_64 {
        fn register_name(&self, kind: RegisterKind, reg: RegNum) -> Option<&'static str> {
            let names: &[&'static str] = match kind {
                RegisterKind::Dwarf | RegisterKind::EhFrame => &DWARF_NAMES,
                RegisterKind::Generic => &GENERIC_NAMES,
                RegisterKind::ProcessPlugin | RegisterKind::Native => return None,
            };
            names.get(usize::try_from(reg).ok()?).copied()
        }
    }

    /// The state right after the `call`: the return address is on top of the
    /// stack and nothing else has been touched yet.
    pub fn function_entry_plan() -> UnwindPlan<'static> {
        let mut row = Row::new();
        row.cfa_value_mut().set_is_register_plus_offset(RSP, ADDR_SIZE);
        row.set_register_location_to_at_cfa_plus_offset(RIP, -ADDR_SIZE, false);
        row.set_register_location_to_is_cfa_plus_offset(RSP, 0, true);

        let mut plan = UnwindPlan::new(RegisterKind::Dwarf);
        plan.append_row(row);
        plan.set_return_address_register(RIP);
        plan.set_source_name("x86_64 at-func-entry default");
        plan.set_sourced_from_compiler(LazyBool::No);
        plan.set_valid_at_all_instructions(LazyBool::No);
        plan
    }

    /// Assumes a `push rbp; mov rbp, rsp` prologue has run, the only thing
    /// left to try for a function we know nothing about.
    pub fn default_plan() -> UnwindPlan<'static> {
        let mut row = Row::new();
        // We have no idea what the function spilled, don't let the walker
        // take stale values from younger frames.
        row.set_unspecified_registers_are_undefined(true);
        row.cfa_value_mut().set_is_register_plus_offset(RBP, 2 * ADDR_SIZE);
        row.set_register_location_to_at_cfa_plus_offset(RBP, -2 * ADDR_SIZE, true);
        row.set_register_location_to_at_cfa_plus_offset(RIP, -ADDR_SIZE, true);
        row.set_register_location_to_is_cfa_plus_offset(RSP, 0, true);

        let mut plan = UnwindPlan::new(RegisterKind::Dwarf);
        plan.append_row(row);
        plan.set_return_address_register(RIP);
        plan.set_source_name("x86_64 default unwind plan");
        plan.set_sourced_from_compiler(LazyBool::No);
        plan.set_valid_at_all_instructions(LazyBool::No);
        plan
    }

}
