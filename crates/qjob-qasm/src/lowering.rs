//! AST-to-circuit lowering for OpenQASM 2.
//!
//! Declarations take effect in program order. User-defined gates are
//! expanded inline into standard gates, so the resulting circuit only
//! contains operations the emitter knows how to write back out.

use qjob_ir::{Circuit, ClassicalCondition, ClbitId, Instruction, QubitId, StandardGate};
use rustc_hash::FxHashMap;

use crate::ast::{
    Argument, BinOp, Expression, GateBodyOp, GateDef, Located, Program, QuantumOp, Statement,
};
use crate::error::{ParseError, ParseResult};

/// The standard include that makes the `qelib1.inc` gates visible.
pub const QELIB: &str = "qelib1.inc";

/// Gates that exist without any include.
const BUILTIN_GATES: [&str; 2] = ["U", "CX"];

/// Most qubits, and separately most classical bits, a circuit may declare.
pub const MAX_WIRES: usize = 4096;

/// Most operations a circuit may hold after gate expansion, and most gate
/// applications lowering performs to get there.
pub const MAX_OPERATIONS: usize = 100_000;

/// Deepest chain of user-defined gates calling each other.
const MAX_GATE_NESTING: usize = 64;

pub(crate) fn lower_to_circuit(program: &Program, name: &str) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::new(name);
    for located in &program.statements {
        lowerer.statement(located)?;
    }
    Ok(lowerer.circuit)
}

struct Lowerer {
    circuit: Circuit,
    gates: FxHashMap<String, GateDef>,
    qelib: bool,
    gate_calls: usize,
}

type Env<'a> = FxHashMap<&'a str, f64>;

impl Lowerer {
    fn new(name: &str) -> Self {
        Self {
            circuit: Circuit::new(name),
            gates: FxHashMap::default(),
            qelib: false,
            gate_calls: 0,
        }
    }

    fn statement(&mut self, located: &Located) -> ParseResult<()> {
        let line = located.line;
        match &located.statement {
            Statement::Include(file) => {
                if file != QELIB {
                    return Err(ParseError::UnsupportedInclude {
                        line,
                        file: file.clone(),
                    });
                }
                self.qelib = true;
                Ok(())
            }
            Statement::QReg { name, size } => {
                let size = register_size(name, *size, self.circuit.num_qubits(), "qubits", line)?;
                self.circuit
                    .try_add_qreg(name.as_str(), size)
                    .map_err(|e| declaration_error(e, name, line))?;
                Ok(())
            }
            Statement::CReg { name, size } => {
                let size = register_size(name, *size, self.circuit.num_clbits(), "clbits", line)?;
                self.circuit
                    .try_add_creg(name.as_str(), size)
                    .map_err(|e| declaration_error(e, name, line))?;
                Ok(())
            }
            Statement::GateDef(def) => self.define_gate(def, line),
            Statement::Opaque { name } => Err(ParseError::Unsupported {
                line,
                feature: format!("opaque gate '{name}'"),
            }),
            Statement::Op(op) => self.quantum_op(op, None, line),
            Statement::If {
                register,
                value,
                op,
            } => {
                let condition = self.condition(register, *value, line)?;
                self.quantum_op(op, Some(condition), line)
            }
        }
    }

    fn gate_is_known(&self, name: &str) -> bool {
        self.gates.contains_key(name)
            || BUILTIN_GATES.contains(&name)
            || (self.qelib && StandardGate::arity(name).is_some())
    }

    fn unknown_gate(&self, name: &str, line: usize) -> ParseError {
        let hint = if !self.qelib && StandardGate::arity(name).is_some() {
            format!(" (missing include \"{QELIB}\"?)")
        } else {
            String::new()
        };
        ParseError::UnknownGate {
            line,
            name: name.to_string(),
            hint,
        }
    }

    fn define_gate(&mut self, def: &GateDef, line: usize) -> ParseResult<()> {
        if self.gate_is_known(&def.name) {
            return Err(duplicate(&def.name, line));
        }
        for op in &def.body {
            let (qubits, params): (&[String], &[Expression]) = match op {
                GateBodyOp::Call {
                    name,
                    params,
                    qubits,
                } => {
                    if !self.gate_is_known(name) {
                        return Err(self.unknown_gate(name, line));
                    }
                    (qubits.as_slice(), params.as_slice())
                }
                GateBodyOp::Barrier(qubits) => (qubits.as_slice(), &[][..]),
            };
            if let Some(q) = qubits.iter().find(|q| !def.qubits.contains(q)) {
                return Err(ParseError::UndefinedIdentifier {
                    line,
                    name: q.clone(),
                });
            }
            for expr in params {
                check_free_identifiers(expr, &def.params, line)?;
            }
        }
        self.gates.insert(def.name.clone(), def.clone());
        Ok(())
    }

    fn condition(&self, register: &str, value: u64, line: usize) -> ParseResult<ClassicalCondition> {
        let creg = self.circuit.creg(register).ok_or_else(|| {
            if self.circuit.qreg(register).is_some() {
                ParseError::WrongRegisterKind {
                    line,
                    name: register.to_string(),
                    expected: "classical",
                }
            } else {
                ParseError::UndefinedIdentifier {
                    line,
                    name: register.to_string(),
                }
            }
        })?;
        Ok(ClassicalCondition {
            register: register.to_string(),
            clbits: creg.ids().map(ClbitId).collect(),
            value,
        })
    }

    fn quantum_op(
        &mut self,
        op: &QuantumOp,
        condition: Option<ClassicalCondition>,
        line: usize,
    ) -> ParseResult<()> {
        match op {
            QuantumOp::Gate { name, params, args } => {
                if !self.gate_is_known(name) {
                    return Err(self.unknown_gate(name, line));
                }
                let values = params
                    .iter()
                    .map(|p| eval(p, &Env::default(), line))
                    .collect::<ParseResult<Vec<_>>>()?;
                let operands = args
                    .iter()
                    .map(|a| self.resolve_qubits(a, line))
                    .collect::<ParseResult<Vec<_>>>()?;
                for qubits in broadcast(&operands, line)? {
                    self.apply_gate(name, &values, &qubits, condition.as_ref(), 0, line)?;
                }
                Ok(())
            }
            QuantumOp::Measure { qubit, clbit } => {
                let qubits = self.resolve_qubits(qubit, line)?;
                let clbits = self.resolve_clbits(clbit, line)?;
                if qubits.len() != clbits.len() {
                    return Err(ParseError::SizeMismatch {
                        line,
                        message: format!(
                            "measuring {} qubits into {} classical bits",
                            qubits.len(),
                            clbits.len()
                        ),
                    });
                }
                for (q, c) in qubits.into_iter().zip(clbits) {
                    self.push(Instruction::measure(q, c), condition.as_ref(), line)?;
                }
                Ok(())
            }
            QuantumOp::Reset(arg) => {
                for q in self.resolve_qubits(arg, line)? {
                    self.push(Instruction::reset(q), condition.as_ref(), line)?;
                }
                Ok(())
            }
            QuantumOp::Barrier(args) => {
                let mut qubits: Vec<QubitId> = Vec::new();
                for arg in args {
                    for q in self.resolve_qubits(arg, line)? {
                        if !qubits.contains(&q) {
                            qubits.push(q);
                        }
                    }
                }
                self.push(Instruction::barrier(qubits), None, line)
            }
        }
    }

    fn push(
        &mut self,
        inst: Instruction,
        condition: Option<&ClassicalCondition>,
        line: usize,
    ) -> ParseResult<()> {
        if self.circuit.num_ops() >= MAX_OPERATIONS {
            return Err(ParseError::Unsupported {
                line,
                feature: format!("a circuit of more than {MAX_OPERATIONS} operations"),
            });
        }
        let inst = match condition {
            Some(c) => inst.with_condition(c.clone()),
            None => inst,
        };
        self.circuit.apply(inst)?;
        Ok(())
    }

    fn apply_gate(
        &mut self,
        name: &str,
        params: &[f64],
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
        nesting: usize,
        line: usize,
    ) -> ParseResult<()> {
        self.gate_calls += 1;
        if self.gate_calls > MAX_OPERATIONS {
            return Err(ParseError::Unsupported {
                line,
                feature: format!("expanding to more than {MAX_OPERATIONS} gate applications"),
            });
        }
        if let Some(def) = self.gates.get(name).cloned() {
            if nesting >= MAX_GATE_NESTING {
                return Err(ParseError::Unsupported {
                    line,
                    feature: format!("gate definitions nested more than {MAX_GATE_NESTING} deep"),
                });
            }
            check_counts(name, def.params.len(), params.len(), def.qubits.len(), qubits.len(), line)?;
            let env: Env<'_> = def
                .params
                .iter()
                .map(String::as_str)
                .zip(params.iter().copied())
                .collect();
            let wires: FxHashMap<&str, QubitId> = def
                .qubits
                .iter()
                .map(String::as_str)
                .zip(qubits.iter().copied())
                .collect();

            for op in &def.body {
                match op {
                    GateBodyOp::Call {
                        name: inner,
                        params: inner_params,
                        qubits: inner_qubits,
                    } => {
                        let values = inner_params
                            .iter()
                            .map(|p| eval(p, &env, line))
                            .collect::<ParseResult<Vec<_>>>()?;
                        let targets: Vec<QubitId> =
                            inner_qubits.iter().map(|q| wires[q.as_str()]).collect();
                        self.apply_gate(inner, &values, &targets, condition, nesting + 1, line)?;
                    }
                    GateBodyOp::Barrier(names) => {
                        let targets: Vec<QubitId> =
                            names.iter().map(|q| wires[q.as_str()]).collect();
                        self.push(Instruction::barrier(targets), None, line)?;
                    }
                }
            }
            return Ok(());
        }

        let (expected_params, expected_qubits) =
            StandardGate::arity(name).ok_or_else(|| self.unknown_gate(name, line))?;
        check_counts(
            name,
            expected_params,
            params.len(),
            expected_qubits as usize,
            qubits.len(),
            line,
        )?;
        let gate =
            StandardGate::from_qasm(name, params).ok_or_else(|| self.unknown_gate(name, line))?;
        self.push(Instruction::gate(gate, qubits.iter().copied()), condition, line)
    }

    fn resolve_qubits(&self, arg: &Argument, line: usize) -> ParseResult<Vec<QubitId>> {
        let Some(reg) = self.circuit.qreg(&arg.register) else {
            return Err(self.missing_register(&arg.register, "quantum", line));
        };
        let ids = select(reg, arg, line)?;
        Ok(ids.into_iter().map(QubitId).collect())
    }

    fn resolve_clbits(&self, arg: &Argument, line: usize) -> ParseResult<Vec<ClbitId>> {
        let Some(reg) = self.circuit.creg(&arg.register) else {
            return Err(self.missing_register(&arg.register, "classical", line));
        };
        let ids = select(reg, arg, line)?;
        Ok(ids.into_iter().map(ClbitId).collect())
    }

    fn missing_register(&self, name: &str, expected: &'static str, line: usize) -> ParseError {
        let other_kind = if expected == "quantum" {
            self.circuit.creg(name).is_some()
        } else {
            self.circuit.qreg(name).is_some()
        };
        if other_kind {
            ParseError::WrongRegisterKind {
                line,
                name: name.to_string(),
                expected,
            }
        } else {
            ParseError::UndefinedIdentifier {
                line,
                name: name.to_string(),
            }
        }
    }
}

fn duplicate(name: &str, line: usize) -> ParseError {
    ParseError::DuplicateDeclaration {
        line,
        name: name.to_string(),
    }
}

fn declaration_error(e: qjob_ir::IrError, name: &str, line: usize) -> ParseError {
    match e {
        qjob_ir::IrError::DuplicateRegister(_) => duplicate(name, line),
        other => other.into(),
    }
}

/// Size of a new register, given `allocated` wires of the same kind so far.
fn register_size(
    name: &str,
    size: u64,
    allocated: usize,
    kind: &str,
    line: usize,
) -> ParseResult<u32> {
    let total = usize::try_from(size)
        .ok()
        .and_then(|n| n.checked_add(allocated));
    match (u32::try_from(size), total) {
        (Ok(size), Some(total)) if size > 0 && total <= MAX_WIRES => Ok(size),
        (Ok(0), _) => Err(ParseError::Unsupported {
            line,
            feature: format!("register '{name}' of size 0"),
        }),
        _ => Err(ParseError::Unsupported {
            line,
            feature: format!(
                "register '{name}' of size {size} (at most {MAX_WIRES} {kind} per circuit)"
            ),
        }),
    }
}

fn select(reg: &qjob_ir::Register, arg: &Argument, line: usize) -> ParseResult<Vec<u32>> {
    match arg.index {
        None => Ok(reg.ids().collect()),
        Some(index) => u32::try_from(index)
            .ok()
            .and_then(|i| reg.get(i))
            .map(|id| vec![id])
            .ok_or_else(|| ParseError::IndexOutOfBounds {
                line,
                register: reg.name.clone(),
                index,
                size: reg.size,
            }),
    }
}

/// Expand whole-register operands into one qubit tuple per register element.
fn broadcast(operands: &[Vec<QubitId>], line: usize) -> ParseResult<Vec<Vec<QubitId>>> {
    let width = operands.iter().map(Vec::len).filter(|&n| n > 1).max().unwrap_or(1);
    if let Some(bad) = operands.iter().find(|o| o.len() > 1 && o.len() != width) {
        return Err(ParseError::SizeMismatch {
            line,
            message: format!("registers of size {} and {width} in one gate call", bad.len()),
        });
    }
    Ok((0..width)
        .map(|i| {
            operands
                .iter()
                .map(|o| if o.len() == 1 { o[0] } else { o[i] })
                .collect()
        })
        .collect())
}

fn check_counts(
    gate: &str,
    expected_params: usize,
    got_params: usize,
    expected_qubits: usize,
    got_qubits: usize,
    line: usize,
) -> ParseResult<()> {
    if expected_params != got_params {
        return Err(ParseError::WrongParameterCount {
            line,
            gate: gate.to_string(),
            expected: expected_params,
            got: got_params,
        });
    }
    if expected_qubits != got_qubits {
        return Err(ParseError::WrongQubitCount {
            line,
            gate: gate.to_string(),
            expected: expected_qubits,
            got: got_qubits,
        });
    }
    Ok(())
}

fn check_free_identifiers(expr: &Expression, bound: &[String], line: usize) -> ParseResult<()> {
    match expr {
        Expression::Identifier(name) if !bound.contains(name) => {
            Err(ParseError::UndefinedIdentifier {
                line,
                name: name.clone(),
            })
        }
        Expression::Neg(inner) | Expression::Call { arg: inner, .. } => {
            check_free_identifiers(inner, bound, line)
        }
        Expression::BinOp { left, right, .. } => {
            check_free_identifiers(left, bound, line)?;
            check_free_identifiers(right, bound, line)
        }
        _ => Ok(()),
    }
}

/// Evaluate a parameter expression to a finite angle.
#[allow(clippy::cast_precision_loss)]
fn eval(expr: &Expression, env: &Env<'_>, line: usize) -> ParseResult<f64> {
    let value = match expr {
        Expression::Real(v) => *v,
        Expression::Int(v) => *v as f64,
        Expression::Pi => std::f64::consts::PI,
        Expression::Identifier(name) => {
            *env
                .get(name.as_str())
                .ok_or_else(|| ParseError::UndefinedIdentifier {
                    line,
                    name: name.clone(),
                })?
        }
        Expression::Neg(inner) => -eval(inner, env, line)?,
        Expression::BinOp { left, op, right } => {
            let l = eval(left, env, line)?;
            let r = eval(right, env, line)?;
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Pow => l.powf(r),
            }
        }
        Expression::Call { function, arg } => {
            let x = eval(arg, env, line)?;
            match function.as_str() {
                "sin" => x.sin(),
                "cos" => x.cos(),
                "tan" => x.tan(),
                "exp" => x.exp(),
                "ln" => x.ln(),
                "sqrt" => x.sqrt(),
                other => {
                    return Err(ParseError::InvalidExpression {
                        line,
                        message: format!("unknown function '{other}'"),
                    });
                }
            }
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidExpression {
            line,
            message: "parameter does not evaluate to a finite number".into(),
        })
    }
}
