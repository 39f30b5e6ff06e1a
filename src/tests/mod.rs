mod gates;

use crate::{
    components::{
        Circuit, Device, DeviceLogic, Endpoint, Gate, GateKind, System,
        SystemData, single_output::OUT,
    },
    configuration::RuntimeConfig,
    structures::{connection::SystemIdx, environment::Environment},
};

pub(crate) fn names(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|a| a.to_string()).collect()
}

/// A, B -> Sum, Carry
pub(crate) fn half_adder() -> Circuit {
    let data = SystemData::builder()
        .type_name("Half-Adder")
        .num_inputs(2)
        .num_outputs(2)
        .input_aliases(names(&["A", "B"]))
        .output_aliases(names(&["Sum", "Carry"]))
        .build();
    let mut circuit = Circuit::new(&data, RuntimeConfig::default()).unwrap();
    circuit.add_system("sum", Device::xor(2).unwrap()).unwrap();
    circuit.add_system("carry", Device::and(2).unwrap()).unwrap();

    for (input, bus) in [("A", "1"), ("B", "2")] {
        for gate in ["sum", "carry"] {
            circuit
                .connect_aliases(
                    Endpoint::Boundary,
                    input,
                    Endpoint::internal(gate),
                    bus,
                )
                .unwrap();
        }
    }
    circuit
        .connect_aliases(
            Endpoint::internal("sum"),
            "OUT",
            Endpoint::Boundary,
            "Sum",
        )
        .unwrap();
    circuit
        .connect_aliases(
            Endpoint::internal("carry"),
            "OUT",
            Endpoint::Boundary,
            "Carry",
        )
        .unwrap();
    circuit
}

/// A, B, Cin -> Sum, Cout, built from two half adders. `order` is the order
/// the internal systems are added in.
pub(crate) fn full_adder_in_order(order: &[&str]) -> Circuit {
    let data = SystemData::builder()
        .type_name("Full-Adder")
        .num_inputs(3)
        .num_outputs(2)
        .input_aliases(names(&["A", "B", "Cin"]))
        .output_aliases(names(&["Sum", "Cout"]))
        .build();
    let mut circuit = Circuit::new(&data, RuntimeConfig::default()).unwrap();
    for alias in order {
        let added = match *alias {
            "cout" => circuit.add_system("cout", Device::or(2).unwrap()),
            half => circuit.add_system(half, half_adder()),
        };
        added.unwrap();
    }

    let wires = [
        (Endpoint::Boundary, "A", Endpoint::internal("ha1"), "A"),
        (Endpoint::Boundary, "B", Endpoint::internal("ha1"), "B"),
        (Endpoint::internal("ha1"), "Sum", Endpoint::internal("ha2"), "A"),
        (Endpoint::Boundary, "Cin", Endpoint::internal("ha2"), "B"),
        (Endpoint::internal("ha1"), "Carry", Endpoint::internal("cout"), "1"),
        (Endpoint::internal("ha2"), "Carry", Endpoint::internal("cout"), "2"),
        (Endpoint::internal("ha2"), "Sum", Endpoint::Boundary, "Sum"),
        (Endpoint::internal("cout"), "OUT", Endpoint::Boundary, "Cout"),
    ];
    for (source, source_alias, target, target_alias) in wires {
        circuit
            .connect_aliases(source, source_alias, target, target_alias)
            .unwrap();
    }
    circuit
}

pub(crate) fn full_adder() -> Circuit {
    full_adder_in_order(&["ha1", "ha2", "cout"])
}

fn nor_with_state(state: bool) -> Device {
    let data = SystemData::builder()
        .type_name("Nor-Gate(2)")
        .num_inputs(2)
        .num_outputs(1)
        .initial_state(vec![state])
        .output_aliases(names(&[OUT]))
        .build();
    let nor = Gate::new(GateKind::Or, 2).unwrap().inverted();
    Device::new(&data, DeviceLogic::Gate(nor)).unwrap()
}

/// S, R -> Q, Qn from cross-coupled NOR gates, starting out set.
pub(crate) fn sr_latch(config: RuntimeConfig) -> Circuit {
    let data = SystemData::builder()
        .type_name("SR-Latch")
        .num_inputs(2)
        .num_outputs(2)
        .initial_state(vec![true, false])
        .input_aliases(names(&["S", "R"]))
        .output_aliases(names(&["Q", "Qn"]))
        .build();
    let mut latch = Circuit::new(&data, config).unwrap();
    latch.add_system("upper", nor_with_state(true)).unwrap();
    latch.add_system("lower", nor_with_state(false)).unwrap();

    let wires = [
        (Endpoint::Boundary, "R", Endpoint::internal("upper"), "1"),
        (Endpoint::internal("lower"), OUT, Endpoint::internal("upper"), "2"),
        (Endpoint::Boundary, "S", Endpoint::internal("lower"), "1"),
        (Endpoint::internal("upper"), OUT, Endpoint::internal("lower"), "2"),
        (Endpoint::internal("upper"), OUT, Endpoint::Boundary, "Q"),
        (Endpoint::internal("lower"), OUT, Endpoint::Boundary, "Qn"),
    ];
    for (source, source_alias, target, target_alias) in wires {
        latch
            .connect_aliases(source, source_alias, target, target_alias)
            .unwrap();
    }
    latch
}

/// A system under test with one switch driving each of its inputs.
pub(crate) struct Harness {
    pub env: Environment,
    pub switches: Vec<SystemIdx>,
    pub dut: SystemIdx,
}

impl Harness {
    pub fn new<S: Into<System>>(system: S) -> Self {
        let mut env = Environment::new();
        let dut = env.add(system);
        let switches = (0..env[dut].num_inputs())
            .map(|bus| {
                let switch = env.add(Device::switch(false));
                env.connect_index(switch, 0, dut, bus).unwrap();
                switch
            })
            .collect();
        Self { env, switches, dut }
    }

    /// Latch and publish the input values, then update the system under test
    /// and return its outputs.
    pub fn apply(&mut self, inputs: &[bool]) -> Vec<bool> {
        assert_eq!(inputs.len(), self.switches.len());
        for (switch, value) in self.switches.iter().zip(inputs) {
            self.env.set_switch(*switch, *value).unwrap();
            assert!(self.env.update(*switch).unwrap());
        }
        self.env.load_input_buffer(self.dut).unwrap();
        assert!(self.env.update(self.dut).unwrap());
        self.env[self.dut].get_out().to_vec()
    }
}

/// All assignments of `n` bits, least significant input first.
pub(crate) fn assignments(n: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1_usize << n)
        .map(move |bits| (0..n).map(|i| (bits >> i) & 1 == 1).collect())
}
