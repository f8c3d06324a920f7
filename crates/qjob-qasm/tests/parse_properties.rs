//! Property tests for the OpenQASM 2 front end.

use proptest::prelude::*;
use qjob_qasm::{emit_qasm2, parse};

const GATES_1Q: [&str; 6] = ["h", "x", "y", "z", "s", "t"];

fn program(n_qubits: u32, ops: &[(usize, u32, u32)]) -> String {
    let mut src = format!(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[{n_qubits}];\ncreg c[{n_qubits}];\n"
    );
    for &(kind, a, b) in ops {
        let (a, b) = (a % n_qubits, b % n_qubits);
        if kind % 2 == 0 || a == b {
            src.push_str(&format!("{} q[{a}];\n", GATES_1Q[kind % GATES_1Q.len()]));
        } else {
            src.push_str(&format!("cx q[{a}], q[{b}];\n"));
        }
    }
    src.push_str("measure q -> c;\n");
    src
}

proptest! {
    #[test]
    fn parser_never_panics(source in "\\PC{0,200}") {
        let _ = parse(&source);
        let _ = parse(&format!("OPENQASM 2.0;\n{source}"));
    }

    #[test]
    fn depth_bounded_by_op_count(
        n_qubits in 1u32..5,
        ops in prop::collection::vec((0usize..12, 0u32..5, 0u32..5), 0..30),
    ) {
        let circuit = parse(&program(n_qubits, &ops)).unwrap();
        let depth = circuit.depth().unwrap();
        prop_assert!(depth >= 1);
        prop_assert!(depth <= ops.len() + 1);
        prop_assert_eq!(circuit.num_ops(), ops.len() + n_qubits as usize);
    }

    #[test]
    fn normalized_output_preserves_structure(
        n_qubits in 1u32..4,
        ops in prop::collection::vec((0usize..12, 0u32..4, 0u32..4), 0..20),
    ) {
        let circuit = parse(&program(n_qubits, &ops)).unwrap();
        let reparsed = parse(&emit_qasm2(&circuit)).unwrap();
        prop_assert_eq!(reparsed.num_ops(), circuit.num_ops());
        prop_assert_eq!(reparsed.depth().unwrap(), circuit.depth().unwrap());
    }
}
