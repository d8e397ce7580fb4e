use crate::{FaValue, RegisterLocation, Row};

const R0: u32 = 0;
const R1: u32 = 1;

#[test]
fn missing_rule_is_not_undefined() {
    let mut row = Row::new();
    assert_eq!(row.register_info(R0), None);

    row.set_register_info(R0, RegisterLocation::Undefined);
    assert_eq!(row.register_info(R0), Some(RegisterLocation::Undefined));

    row.remove_register_info(R0);
    assert_eq!(row.register_info(R0), None);
    // removing twice is fine
    row.remove_register_info(R0);
    assert_eq!(row.registers().count(), 0);
}

#[test]
fn set_register_info_overwrites() {
    let mut row = Row::new();
    row.set_register_info(R0, RegisterLocation::Same);
    row.set_register_info(R0, RegisterLocation::AtCfaPlusOffset(-16));
    assert_eq!(
        row.register_info(R0),
        Some(RegisterLocation::AtCfaPlusOffset(-16))
    );
}

#[test]
fn guarded_setter_keeps_existing_rule() {
    let mut row = Row::new();
    assert!(row.set_register_location_to_is_cfa_plus_offset(R0, 8, false));

    assert!(!row.set_register_location_to_same(R0, false));
    assert_eq!(row.register_info(R0), Some(RegisterLocation::IsCfaPlusOffset(8)));

    assert!(row.set_register_location_to_same(R0, true));
    assert_eq!(row.register_info(R0), Some(RegisterLocation::Same));
}

#[test]
fn guarded_setters_install_when_empty() {
    let expr = [0x77, 0x08];
    let mut row = Row::new();
    assert!(row.set_register_location_to_at_cfa_plus_offset(0, -8, false));
    assert!(row.set_register_location_to_is_cfa_plus_offset(1, 0, false));
    assert!(row.set_register_location_to_at_afa_plus_offset(2, -24, false));
    assert!(row.set_register_location_to_is_afa_plus_offset(3, 8, false));
    assert!(row.set_register_location_to_register(4, 12, false));
    assert!(row.set_register_location_to_is_dwarf_expression(5, &expr, false));
    assert!(row.set_register_location_to_at_dwarf_expression(6, &expr, false));
    assert!(row.set_register_location_to_is_constant(7, 42, false));
    assert!(row.set_register_location_to_unspecified(8, false));
    assert!(row.set_register_location_to_undefined(9, false, false));
    assert!(row.set_register_location_to_same(10, false));

    let rules: Vec<_> = row.registers().map(|(reg, loc)| (reg, *loc)).collect();
    assert_eq!(
        rules,
        [
            (0, RegisterLocation::AtCfaPlusOffset(-8)),
            (1, RegisterLocation::IsCfaPlusOffset(0)),
            (2, RegisterLocation::AtAfaPlusOffset(-24)),
            (3, RegisterLocation::IsAfaPlusOffset(8)),
            (4, RegisterLocation::InOtherRegister(12)),
            (5, RegisterLocation::IsDwarfExpression(&expr)),
            (6, RegisterLocation::AtDwarfExpression(&expr)),
            (7, RegisterLocation::IsConstant(42)),
            (8, RegisterLocation::Unspecified),
            (9, RegisterLocation::Undefined),
            (10, RegisterLocation::Same),
        ]
    );

    // none of them may replace without permission
    assert!(!row.set_register_location_to_at_cfa_plus_offset(1, -8, false));
    assert!(!row.set_register_location_to_register(0, 3, false));
    assert!(!row.set_register_location_to_is_constant(4, 1, false));
    assert!(!row.set_register_location_to_unspecified(7, false));
    assert_eq!(row.register_info(0), Some(RegisterLocation::AtCfaPlusOffset(-8)));
    assert_eq!(row.register_info(7), Some(RegisterLocation::IsConstant(42)));
}

#[test]
fn undefined_may_replace_unspecified() {
    let mut row = Row::new();

    // nothing there yet
    assert!(row.set_register_location_to_undefined(R0, false, true));
    assert_eq!(row.register_info(R0), Some(RegisterLocation::Undefined));

    // an explicit rule is protected
    row.set_register_info(R1, RegisterLocation::AtCfaPlusOffset(-8));
    assert!(!row.set_register_location_to_undefined(R1, false, true));
    assert!(!row.set_register_location_to_undefined(R1, false, false));
    assert_eq!(row.register_info(R1), Some(RegisterLocation::AtCfaPlusOffset(-8)));

    // an unspecified one is not, but only with the flag
    row.set_register_info(R1, RegisterLocation::Unspecified);
    assert!(!row.set_register_location_to_undefined(R1, false, false));
    assert_eq!(row.register_info(R1), Some(RegisterLocation::Unspecified));
    assert!(row.set_register_location_to_undefined(R1, false, true));
    assert_eq!(row.register_info(R1), Some(RegisterLocation::Undefined));

    // can_replace always wins
    row.set_register_info(R1, RegisterLocation::Same);
    assert!(row.set_register_location_to_undefined(R1, true, false));
    assert_eq!(row.register_info(R1), Some(RegisterLocation::Undefined));
}

#[test]
fn clear_resets_everything() {
    let mut row = Row::new();
    row.set_offset(12);
    row.cfa_value_mut().set_is_register_plus_offset(7, 16);
    row.afa_value_mut().set_is_register_dereferenced(6);
    row.set_register_location_to_same(R0, false);
    row.set_unspecified_registers_are_undefined(true);
    assert_ne!(row, Row::new());

    row.clear();
    assert_eq!(row, Row::new());
    assert_eq!(row.offset(), 0);
    assert!(row.cfa_value().is_unspecified());
    assert!(row.afa_value().is_unspecified());
    assert_eq!(row.register_info(R0), None);
    assert!(!row.unspecified_registers_are_undefined());
}

#[test]
fn equality_is_structural() {
    let a_expr = [0x70, 0x10, 0x06];
    let b_expr = a_expr;

    let mut a = Row::new();
    a.set_offset(4);
    a.cfa_value_mut().set_is_register_plus_offset(6, 16);
    a.set_register_location_to_is_dwarf_expression(R0, &a_expr, false);

    let mut b = Row::new();
    b.set_offset(4);
    b.cfa_value_mut().set_is_register_plus_offset(6, 16);
    b.set_register_location_to_is_dwarf_expression(R0, &b_expr, false);

    // different buffers, same bytes
    assert_eq!(a, b);

    b.set_unspecified_registers_are_undefined(true);
    assert_ne!(a, b);
    b.set_unspecified_registers_are_undefined(false);

    b.afa_value_mut().set_is_register_plus_offset(7, 0);
    assert_ne!(a, b);
    b.afa_value_mut().set_unspecified();
    assert_eq!(a, b);

    b.set_register_location_to_same(R1, false);
    assert_ne!(a, b);
    b.remove_register_info(R1);

    b.slide_offset(4);
    assert_eq!(b.offset(), 8);
    assert_ne!(a, b);
}

#[test]
fn frame_address_values_are_independent() {
    let mut row = Row::new();
    row.cfa_value_mut().set_is_register_plus_offset(7, 8);
    row.afa_value_mut().set_is_register_plus_offset(7, 0);
    row.cfa_value_mut().inc_offset(8);
    assert_eq!(*row.cfa_value(), FaValue::RegisterPlusOffset { reg: 7, offset: 16 });
    assert_eq!(*row.afa_value(), FaValue::RegisterPlusOffset { reg: 7, offset: 0 });
}
