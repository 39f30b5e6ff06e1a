use proptest::prelude::*;

use super::Harness;
use crate::components::{Device, Gate, GateKind, single_output};

fn multi_input_kind() -> impl Strategy<Value = GateKind> {
    prop_oneof![
        Just(GateKind::And),
        Just(GateKind::Or),
        Just(GateKind::Xor)
    ]
}

fn gate_inputs() -> impl Strategy<Value = Vec<bool>> {
    (2_usize..9).prop_flat_map(|n| prop::collection::vec(any::<bool>(), n))
}

fn expected(kind: GateKind, inputs: &[bool]) -> bool {
    let high = inputs.iter().filter(|v| **v).count();
    match kind {
        GateKind::And => inputs.iter().all(|v| *v),
        GateKind::Or => inputs.iter().any(|v| *v),
        GateKind::Xor => high % 2 == 1,
        GateKind::Buffer => inputs[0],
    }
}

proptest! {
    #[test]
    fn truth_tables(
        kind in multi_input_kind(),
        inputs in gate_inputs(),
    ) {
        let gate = Gate::new(kind, inputs.len()).unwrap();
        let mut harness = Harness::new(Device::gate(gate));
        prop_assert_eq!(harness.apply(&inputs), vec![expected(kind, &inputs)]);
    }

    #[test]
    fn inverted_gates_negate(
        kind in multi_input_kind(),
        inputs in gate_inputs(),
    ) {
        let gate = Gate::new(kind, inputs.len()).unwrap().inverted();
        let mut harness = Harness::new(Device::gate(gate));
        prop_assert_eq!(harness.apply(&inputs), vec![!expected(kind, &inputs)]);
    }

    #[test]
    fn inversion_is_negation_for_every_count(
        kind in multi_input_kind(),
        arity in 2_usize..16,
    ) {
        let gate = Gate::new(kind, arity).unwrap();
        for count in 0..=arity {
            prop_assert_eq!(gate.inverted().eval(count), !gate.eval(count));
        }
    }

    #[test]
    fn update_is_pure_in_the_buffer(
        kind in multi_input_kind(),
        inputs in gate_inputs(),
    ) {
        let gate = Gate::new(kind, inputs.len()).unwrap();
        let mut harness = Harness::new(Device::gate(gate));
        let first = harness.apply(&inputs);
        prop_assert_eq!(harness.apply(&inputs), first);
    }
}

#[test]
fn buffer_and_not() {
    let mut buffer = Harness::new(Device::buffer());
    let mut not = Harness::new(Device::not());
    for value in [false, true] {
        assert_eq!(buffer.apply(&[value]), vec![value]);
        assert_eq!(not.apply(&[value]), vec![!value]);
    }
    assert_eq!(
        single_output::read(&not.env[not.dut]),
        Ok(false),
        "NOT of the last input"
    );
}

#[test]
fn inverted_device_is_independent() {
    let mut and = Harness::new(Device::and(2).unwrap());
    assert_eq!(and.apply(&[true, true]), vec![true]);

    let nand = and.env[and.dut]
        .as_device()
        .unwrap()
        .inverted()
        .unwrap();
    // the snapshot is taken over, not recomputed
    assert_eq!(nand.io().values(), &[true]);

    let mut nand = Harness::new(nand);
    assert_eq!(nand.apply(&[true, true]), vec![false]);
    assert_eq!(nand.apply(&[false, true]), vec![true]);
    // the wrapped gate is untouched
    assert_eq!(and.env[and.dut].get_out(), &[true]);
}
