//! OpenQASM emitters for serializing circuits.
//!
//! [`emit_qasm3`] produces the dialect accepted by IBM's sampler primitive;
//! [`emit_qasm2`] writes the normalized form of a parsed program back out.

use qjob_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

/// Emit a circuit as OpenQASM 3 using `stdgates.inc`.
///
/// Gates missing from `stdgates.inc` (`sxdg`, `rxx`, `rzz`) get inline
/// definitions; `cu3` becomes `cu` with a zero global phase.
pub fn emit_qasm3(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new(circuit, Dialect::Qasm3);
    emitter.emit_circuit();
    emitter.output
}

/// Emit a circuit as OpenQASM 2 using `qelib1.inc`.
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new(circuit, Dialect::Qasm2);
    emitter.emit_circuit();
    emitter.output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Qasm2,
    Qasm3,
}

const QASM3_EXTRA_GATES: [(&str, &str); 3] = [
    ("sxdg", "gate sxdg a { s a; h a; s a; }"),
    (
        "rzz",
        "gate rzz(theta) a, b { cx a, b; p(theta) b; cx a, b; }",
    ),
    (
        "rxx",
        "gate rxx(theta) a, b { U(pi/2, theta, 0) a; h b; cx a, b; p(-theta) b; cx a, b; h b; U(pi/2, -pi, pi - theta) a; }",
    ),
];

struct Emitter<'a> {
    circuit: &'a Circuit,
    dialect: Dialect,
    output: String,
}

impl<'a> Emitter<'a> {
    fn new(circuit: &'a Circuit, dialect: Dialect) -> Self {
        Self {
            circuit,
            dialect,
            output: String::new(),
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn emit_circuit(&mut self) {
        let circuit = self.circuit;
        match self.dialect {
            Dialect::Qasm2 => {
                self.writeln("OPENQASM 2.0;");
                self.writeln("include \"qelib1.inc\";");
            }
            Dialect::Qasm3 => {
                self.writeln("OPENQASM 3.0;");
                self.writeln("include \"stdgates.inc\";");
                self.emit_extra_gate_definitions();
            }
        }

        for reg in circuit.qregs() {
            let decl = match self.dialect {
                Dialect::Qasm2 => format!("qreg {}[{}];", reg.name, reg.size),
                Dialect::Qasm3 => format!("qubit[{}] {};", reg.size, reg.name),
            };
            self.writeln(&decl);
        }
        for reg in circuit.cregs() {
            let decl = match self.dialect {
                Dialect::Qasm2 => format!("creg {}[{}];", reg.name, reg.size),
                Dialect::Qasm3 => format!("bit[{}] {};", reg.size, reg.name),
            };
            self.writeln(&decl);
        }

        for (_, instruction) in circuit.dag().ops() {
            let line = self.instruction(instruction);
            self.writeln(&line);
        }
    }

    fn emit_extra_gate_definitions(&mut self) {
        let circuit = self.circuit;
        let used: Vec<&str> = circuit
            .dag()
            .ops()
            .filter_map(|(_, inst)| inst.as_gate().map(|g| g.name()))
            .collect();
        for (name, definition) in QASM3_EXTRA_GATES {
            if used.contains(&name) {
                self.writeln(definition);
            }
        }
    }

    fn instruction(&self, instruction: &Instruction) -> String {
        let body = match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let (name, params) = self.gate_spelling(&gate.kind);
                let qubits = self.qubit_list(&instruction.qubits);
                if params.is_empty() {
                    format!("{name} {qubits};")
                } else {
                    let params: Vec<String> = params.iter().map(|p| format_angle(*p)).collect();
                    format!("{name}({}) {qubits};", params.join(", "))
                }
            }
            InstructionKind::Measure => {
                let pairs: Vec<String> = instruction
                    .qubits
                    .iter()
                    .zip(&instruction.clbits)
                    .map(|(q, c)| match self.dialect {
                        Dialect::Qasm2 => {
                            format!("measure {} -> {};", self.qubit(*q), self.clbit(*c))
                        }
                        Dialect::Qasm3 => {
                            format!("{} = measure {};", self.clbit(*c), self.qubit(*q))
                        }
                    })
                    .collect();
                pairs.join(" ")
            }
            InstructionKind::Reset => format!("reset {};", self.qubit_list(&instruction.qubits)),
            InstructionKind::Barrier => {
                format!("barrier {};", self.qubit_list(&instruction.qubits))
            }
        };

        match &instruction.condition {
            Some(cond) => match self.dialect {
                Dialect::Qasm2 => format!("if({}=={}) {body}", cond.register, cond.value),
                Dialect::Qasm3 => format!("if ({} == {}) {{ {body} }}", cond.register, cond.value),
            },
            None => body,
        }
    }

    fn gate_spelling(&self, gate: &StandardGate) -> (&'static str, Vec<f64>) {
        let params = gate.parameters();
        let name = match (self.dialect, gate) {
            (Dialect::Qasm2, StandardGate::P(_)) => "u1",
            (Dialect::Qasm2, StandardGate::U(..)) => "u3",
            (Dialect::Qasm2, StandardGate::CP(_)) => "cu1",
            (Dialect::Qasm3, StandardGate::U(..)) => "U",
            (Dialect::Qasm3, StandardGate::CU3(..)) => {
                let mut params = params;
                params.push(0.0);
                return ("cu", params);
            }
            _ => gate.name(),
        };
        (name, params)
    }

    fn qubit(&self, id: QubitId) -> String {
        self.circuit
            .qubits()
            .get(id.0 as usize)
            .map_or_else(|| id.to_string(), ToString::to_string)
    }

    fn clbit(&self, id: ClbitId) -> String {
        self.circuit
            .clbits()
            .get(id.0 as usize)
            .map_or_else(|| id.to_string(), ToString::to_string)
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit(*q))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Shortest round-trippable decimal form of an angle.
fn format_angle(value: f64) -> String {
    let text = format!("{value}");
    if text.contains(['.', 'e', 'E', 'i', 'N']) {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_qasm3_default_circuit() {
        let circuit = parse(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\ncreg c[1];\nx q[0];\nmeasure q[0] -> c[0];",
        )
        .unwrap();
        let out = emit_qasm3(&circuit);
        assert_eq!(
            out,
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[1] q;\nbit[1] c;\nx q[0];\nc[0] = measure q[0];\n"
        );
    }

    #[test]
    fn test_qasm3_gate_spellings() {
        let circuit = parse(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nu3(1, 2, 3) q[0];\ncu3(1, 2, 3) q[0], q[1];\nrzz(0.5) q[0], q[1];",
        )
        .unwrap();
        let out = emit_qasm3(&circuit);
        assert!(out.contains("U(1.0, 2.0, 3.0) q[0];"), "{out}");
        assert!(out.contains("cu(1.0, 2.0, 3.0, 0.0) q[0], q[1];"), "{out}");
        assert!(out.contains("gate rzz(theta)"), "{out}");
        assert!(!out.contains("gate rxx"), "{out}");
    }

    #[test]
    fn test_qasm3_condition() {
        let circuit = parse(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\ncreg c[1];\nif (c == 1) x q[0];",
        )
        .unwrap();
        assert!(emit_qasm3(&circuit).contains("if (c == 1) { x q[0]; }"));
    }

    #[test]
    fn test_qasm2_normalizes_spelling_and_reparses() {
        let source = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg a[2];\ncreg m[2];\ngate g(t) x { p(t) x; }\ng(pi) a[1];\nbarrier a;\nmeasure a -> m;";
        let circuit = parse(source).unwrap();
        let out = emit_qasm2(&circuit);
        assert!(out.contains("u1(3.141592653589793) a[1];"), "{out}");
        assert!(out.contains("measure a[1] -> m[1];"), "{out}");

        let reparsed = parse(&out).unwrap();
        assert_eq!(reparsed.num_ops(), circuit.num_ops());
        assert_eq!(reparsed.depth().unwrap(), circuit.depth().unwrap());
    }
}
