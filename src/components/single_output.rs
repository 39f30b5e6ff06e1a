//! The single-output-bus convention shared by gates, switches, and relays.
//!
//! Such systems expose exactly one output bus, aliased [`OUT`].

use crate::{
    errors::SimResult,
    structures::alias::{AliasIndex, BusKind},
};

use super::System;

pub const OUT: &str = "OUT";

/// The output alias table of a single-output system.
pub fn output_aliases() -> AliasIndex {
    AliasIndex::single(BusKind::Output, OUT)
}

/// Whether `system` follows the convention.
pub fn is_single_output(system: &System) -> bool {
    system.num_outputs() == 1 && system.out_alias_to_index(OUT) == Ok(0)
}

/// Read the value of the `OUT` bus.
pub fn read(system: &System) -> SimResult<bool> {
    system.get_out_bus(OUT)
}

#[cfg(test)]
mod tests {
    use super::{OUT, is_single_output, output_aliases, read};
    use crate::{
        components::{
            Device, DeviceLogic, Gate, GateKind, System, SystemData,
        },
        errors::SimError,
        structures::alias::BusKind,
    };

    #[test]
    fn index_has_one_entry() {
        let index = output_aliases();
        assert_eq!(index.len(), 1);
        assert_eq!(index.kind(), BusKind::Output);
        assert_eq!(index.index_of("out").unwrap(), 0);
        assert_eq!(index.alias_of(0).unwrap(), OUT);
    }

    #[test]
    fn convention_is_detected() {
        let not: System = Device::not().into();
        assert!(is_single_output(&not));
        assert_eq!(read(&not), Ok(false));

        // front-end data without aliases falls back to the numbered default
        let data = SystemData::builder()
            .type_name("And-Gate(2)")
            .num_inputs(2)
            .num_outputs(1)
            .build();
        let gate = Gate::new(GateKind::And, 2).unwrap();
        let numbered: System =
            Device::new(&data, DeviceLogic::Gate(gate)).unwrap().into();
        assert!(!is_single_output(&numbered));
        assert!(matches!(
            read(&numbered),
            Err(SimError::UnknownAlias {
                kind: BusKind::Output,
                ..
            })
        ));
    }
}
