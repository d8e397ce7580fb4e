use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uwuplan::arch::x86_64::{self, X86_64, RBP, RBX, RIP, RSP};
use uwuplan::{AddressRange, LazyBool, RegisterKind, Row, UnwindPlan};

/// Pretend `.eh_frame` contents. The plan borrows the expression out of it,
/// so it has to stay around for as long as the plan does.
#[rustfmt::skip]
const EH_FRAME: &[u8] = &[
    // DW_OP_breg7 (rsp) +8, DW_OP_deref
    0x77, 0x08, 0x06,
];

const FUNCTION_START: u64 = 0x40_1000;

/// The rows a CFI decoder would produce for
///
/// ```text
/// 0: push rbp
/// 1: mov rbp, rsp
/// 4: push rbx
/// 5: ...
/// 20: pop rbx
/// 21: pop rbp
/// 22: ret
/// ```
fn frame_pointer_function(section: &[u8]) -> UnwindPlan<'_> {
    let mut plan = UnwindPlan::new(RegisterKind::EhFrame);
    plan.set_source_name("eh_frame CFI");
    plan.set_sourced_from_compiler(LazyBool::Yes);
    plan.set_valid_at_all_instructions(LazyBool::No);
    plan.set_return_address_register(RIP);

    let mut row = Row::new();
    row.cfa_value_mut().set_is_register_plus_offset(RSP, 8);
    row.set_register_location_to_at_cfa_plus_offset(RIP, -8, true);
    plan.append_row(row.clone());

    row.set_offset(1);
    row.cfa_value_mut().set_offset(16);
    row.set_register_location_to_at_cfa_plus_offset(RBP, -16, true);
    plan.append_row(row.clone());

    row.set_offset(4);
    row.cfa_value_mut().set_is_register_plus_offset(RBP, 16);
    plan.append_row(row.clone());

    row.set_offset(5);
    row.set_register_location_to_at_cfa_plus_offset(RBX, -24, true);
    plan.append_row(row.clone());

    row.set_offset(21);
    row.remove_register_info(RBX);
    row.cfa_value_mut().set_is_register_plus_offset(RSP, 16);
    plan.append_row(row.clone());

    row.set_offset(22);
    row.cfa_value_mut().set_is_register_plus_offset(RSP, 8);
    row.remove_register_info(RBP);
    plan.append_row(row);

    // A late rule from another source, for an offset that already has one.
    let mut late = Row::new();
    late.set_offset(5);
    late.cfa_value_mut().set_is_dwarf_expression(section);
    plan.insert_row(late, false);

    plan
}

fn main() {
    let registry = tracing_subscriber::Registry::default().with(
        EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .from_env()
            .unwrap(),
    );

    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_targets(true)
        .with_bracketed_fields(true);

    registry.with(tree_layer).init();

    let section = EH_FRAME.to_vec();
    let plan = frame_pointer_function(&section);
    plan.dump(&X86_64, Some(FUNCTION_START)).unwrap();

    for offset in [Some(0), Some(3), Some(12), Some(21), Some(40), None] {
        match plan.row_for_function_offset(offset) {
            Some(row) => info!(
                ?offset,
                "{}",
                row.display(plan.register_kind(), &X86_64, None)
            ),
            None => warn!(?offset, "no row"),
        }
    }

    let mut prologue_only = x86_64::function_entry_plan();
    prologue_only.set_plan_valid_address_ranges(vec![AddressRange::new(FUNCTION_START, 1)]);
    for pc in [FUNCTION_START, FUNCTION_START + 1] {
        info!(
            valid = prologue_only.plan_valid_at_address(pc),
            "{} at {pc:#x}",
            prologue_only.source_name()
        );
    }

    let fallback = x86_64::default_plan();
    fallback.dump(&X86_64, None).unwrap();
}
