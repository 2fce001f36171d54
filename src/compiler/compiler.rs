//! IR emitter and the compilation entry point.
//!
//! The `Compiler` owns the emitted instruction lines and the counters that
//! hand out fresh temporaries, labels, function labels and storage names.
//! Function regions are collected apart from the main program and placed
//! before it, so regions never nest in the output.

use log::debug;

use crate::{
    ast::expressions::{Location, Value},
    errors::errors::Error,
    parser::parser::{parse_program, Parser},
    type_checker::types::{find_conversion, Conversion, Type},
};

#[derive(Debug, Default)]
pub struct Compiler {
    /// Lines of the region currently being emitted.
    pub output: Vec<String>,
    /// Finished function regions.
    pub functions: Vec<String>,
    temporaries: usize,
    labels: usize,
    function_labels: usize,
    storages: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, line: String) {
        self.output.push(line);
    }

    pub fn emit_all(&mut self, lines: Vec<String>) {
        self.output.extend(lines);
    }

    pub fn fresh_temp(&mut self) -> String {
        self.temporaries += 1;
        format!("t{}", self.temporaries - 1)
    }

    pub fn fresh_label(&mut self) -> String {
        self.labels += 1;
        format!("L{}", self.labels - 1)
    }

    pub fn fresh_function(&mut self) -> String {
        self.function_labels += 1;
        format!("f{}", self.function_labels - 1)
    }

    pub fn fresh_storage(&mut self, name: &str) -> String {
        self.storages += 1;
        format!("{}_{}", name, self.storages - 1)
    }

    /// Declares a zeroed temporary of `ty` and returns its name.
    pub fn declare_temp(&mut self, ty: &Type) -> String {
        let name = self.fresh_temp();
        self.emit(format!("dvar {} {}", name, ty.zero_value()));
        name
    }

    /// Writes `value` into `destination`.
    ///
    /// With `declare` set, storage that is filled by `cvar` is declared
    /// first; immediates always go through `dvar`.
    pub fn store(&mut self, value: &Value, destination: &str, declare: bool) {
        match value.source_storage() {
            Some(source) if source == destination => {}
            Some(source) => {
                let source = source.to_string();
                if declare {
                    self.emit(format!("dvar {} {}", destination, value.ty.zero_value()));
                }
                self.emit(format!("cvar {} {}", source, destination));
            }
            None => self.emit(format!("dvar {} {}", destination, value.ir)),
        }
    }

    /// A temporary holding a copy of `value` that aliases nothing else.
    pub fn owned_copy(&mut self, value: Value) -> Value {
        match value.location {
            Location::Temporary(_) | Location::Label(_) => value,
            Location::Immediate => {
                let name = self.fresh_temp();
                self.emit(format!("dvar {} {}", name, value.ir));
                Value::temporary(name, value.ty)
            }
            Location::Named { .. } => {
                let ty = value.ty.strip().clone();
                let name = self.declare_temp(&ty);
                self.store(&value, &name, false);
                Value::temporary(name, ty)
            }
        }
    }

    /// Converts `value` to the value type of `target`, emitting a cast when
    /// one is needed. `None` means no conversion exists.
    pub fn convert(&mut self, value: Value, target: &Type, explicit: bool) -> Option<Value> {
        let target = target.strip().clone();

        match find_conversion(&value.ty, &target, explicit)? {
            Conversion::Identity => Some(value),
            Conversion::BoolToInt => Some(value.retyped(target)),
            Conversion::IntToDouble | Conversion::BoolToDouble => {
                if let (Location::Immediate, Some(number)) =
                    (&value.location, value.ir.strip_prefix("sint:"))
                {
                    return Some(Value::immediate(format!("dbl:{}", number), target));
                }

                let name = self.fresh_temp();
                self.emit(format!("s2d {} {}", value.ir, name));
                Some(Value::temporary(name, target))
            }
            Conversion::DoubleToInt => {
                let name = self.fresh_temp();
                self.emit(format!("d2s {} {}", value.ir, name));
                Some(Value::temporary(name, target))
            }
        }
    }

    /// The finished program: every function region, then the main code.
    pub fn finish(self) -> String {
        let mut lines = self.functions;
        lines.extend(self.output);

        let mut ir = lines.join("\n");
        if !ir.is_empty() {
            ir.push('\n');
        }
        ir
    }
}

/// Compiles `source` to IR text. The first error aborts compilation and no
/// partial output is returned.
pub fn compile(source: &str, file: &str) -> Result<String, Error> {
    let mut parser = Parser::new(source, file);
    parse_program(&mut parser)?;

    let ir = parser.compiler.finish();
    debug!("compiled {} into {} IR line(s)", file, ir.lines().count());

    Ok(ir)
}
