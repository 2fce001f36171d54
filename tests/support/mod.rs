//! A small interpreter for emitted IR, used to check what compiled programs
//! compute rather than only which instructions they contain.

use std::collections::HashMap;

const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Int(i64),
    Double(f64),
    Str(Vec<u8>),
    Null,
}

#[derive(Debug, Default)]
pub struct Machine {
    lines: Vec<Vec<String>>,
    labels: HashMap<String, usize>,
    functions: HashMap<String, usize>,
    pub storage: HashMap<String, Data>,
    steps: usize,
}

impl Machine {
    pub fn new(ir: &str) -> Self {
        let lines: Vec<Vec<String>> = ir
            .lines()
            .map(|line| line.split_whitespace().map(String::from).collect())
            .filter(|words: &Vec<String>| !words.is_empty())
            .collect();

        let mut machine = Machine::default();
        for (index, words) in lines.iter().enumerate() {
            match words[0].as_str() {
                "label" => {
                    machine.labels.insert(words[1].clone(), index);
                }
                "dfunc" => {
                    machine.functions.insert(words[1].clone(), index);
                }
                _ => {}
            }
        }
        machine.lines = lines;
        machine
    }

    /// Runs the whole program from its first line.
    pub fn run(ir: &str) -> Self {
        let mut machine = Machine::new(ir);
        machine.execute(0);
        machine
    }

    pub fn int(&self, storage: &str) -> i64 {
        match self.storage.get(storage) {
            Some(Data::Int(value)) => *value,
            other => panic!("`{}` is not an int: {:?}", storage, other),
        }
    }

    pub fn double(&self, storage: &str) -> f64 {
        match self.storage.get(storage) {
            Some(Data::Double(value)) => *value,
            other => panic!("`{}` is not a double: {:?}", storage, other),
        }
    }

    fn read(&self, operand: &str) -> Data {
        let (kind, text) = operand
            .split_once(':')
            .unwrap_or_else(|| panic!("malformed operand `{}`", operand));

        match (kind, text) {
            ("sym", name) => self
                .storage
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("`{}` read before it was declared", name)),
            ("sint", "null") => Data::Null,
            ("sint", number) => Data::Int(number.parse().unwrap()),
            ("dbl", number) => Data::Double(number.parse().unwrap()),
            ("str", "null") => Data::Str(vec![]),
            ("str", bytes) => Data::Str(bytes.split(',').map(|b| b.parse().unwrap()).collect()),
            _ => panic!("unknown operand kind in `{}`", operand),
        }
    }

    fn read_int(&self, operand: &str) -> i64 {
        match self.read(operand) {
            Data::Int(value) => value,
            other => panic!("expected an int from `{}`, found {:?}", operand, other),
        }
    }

    fn read_double(&self, operand: &str) -> f64 {
        match self.read(operand) {
            Data::Double(value) => value,
            other => panic!("expected a double from `{}`, found {:?}", operand, other),
        }
    }

    fn write(&mut self, name: &str, data: Data) {
        self.storage.insert(name.to_string(), data);
    }

    fn jump_taken(&self, mnemonic: &str, a: &str, b: &str) -> bool {
        let condition = &mnemonic[2..];
        let ordering = if mnemonic.starts_with('d') {
            self.read_double(a).partial_cmp(&self.read_double(b))
        } else {
            match (self.read(a), self.read(b)) {
                (Data::Int(a), Data::Int(b)) => Some(a.cmp(&b)),
                (a, b) if condition == "e" => return a == b,
                (a, b) if condition == "ne" => return a != b,
                (a, b) => panic!("cannot order {:?} and {:?}", a, b),
            }
        };

        let ordering = match ordering {
            Some(ordering) => ordering,
            None => return condition == "ne",
        };
        match condition {
            "e" => ordering.is_eq(),
            "ne" => ordering.is_ne(),
            "l" => ordering.is_lt(),
            "le" => ordering.is_le(),
            "g" => ordering.is_gt(),
            "ge" => ordering.is_ge(),
            _ => panic!("unknown jump `{}`", mnemonic),
        }
    }

    fn label(&self, name: &str) -> usize {
        *self
            .labels
            .get(name)
            .unwrap_or_else(|| panic!("jump to unknown label `{}`", name))
    }

    /// Runs from `pc` until the program ends or an `endfunc` is reached.
    fn execute(&mut self, mut pc: usize) {
        while pc < self.lines.len() {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "program did not terminate");

            let words = self.lines[pc].clone();
            let operands = &words[1..];
            pc += 1;

            match words[0].as_str() {
                "dvar" => {
                    let data = self.read(&operands[1]);
                    self.write(&operands[0], data);
                }
                "cvar" => {
                    let data = self.read(&format!("sym:{}", operands[0]));
                    self.write(&operands[1], data);
                }
                "sadd" | "ssub" | "smul" => {
                    let (a, b) = (self.read_int(&operands[0]), self.read_int(&operands[1]));
                    let result = match words[0].as_str() {
                        "sadd" => a + b,
                        "ssub" => a - b,
                        _ => a * b,
                    };
                    self.write(&operands[2], Data::Int(result));
                }
                "dadd" | "dsub" | "dmul" => {
                    let (a, b) = (
                        self.read_double(&operands[0]),
                        self.read_double(&operands[1]),
                    );
                    let result = match words[0].as_str() {
                        "dadd" => a + b,
                        "dsub" => a - b,
                        _ => a * b,
                    };
                    self.write(&operands[2], Data::Double(result));
                }
                "sdiv" => {
                    let (a, b) = (self.read_int(&operands[0]), self.read_int(&operands[1]));
                    self.write(&operands[2], Data::Int(a / b));
                    self.write(&operands[3], Data::Int(a % b));
                }
                "ddiv" => {
                    let (a, b) = (
                        self.read_double(&operands[0]),
                        self.read_double(&operands[1]),
                    );
                    self.write(&operands[2], Data::Double(a / b));
                    self.write(&operands[3], Data::Double(a % b));
                }
                "s2d" => {
                    let value = self.read_int(&operands[0]);
                    self.write(&operands[1], Data::Double(value as f64));
                }
                "d2s" => {
                    let value = self.read_double(&operands[0]);
                    self.write(&operands[1], Data::Int(value as i64));
                }
                "jmp" => pc = self.label(&operands[0]),
                "label" => {}
                "dfunc" => {
                    // Regions only run through `cfunc`.
                    while self.lines[pc][0] != "endfunc" {
                        pc += 1;
                    }
                    pc += 1;
                }
                "endfunc" => return,
                "cfunc" => self.call(&operands[0], &operands[1]),
                mnemonic if mnemonic.starts_with("sj") || mnemonic.starts_with("dj") => {
                    if self.jump_taken(mnemonic, &operands[1], &operands[2]) {
                        pc = self.label(&operands[0]);
                    }
                }
                other => panic!("unknown instruction `{}`", other),
            }
        }
    }

    /// Reference (`sym`) parameters are copied in and copied back out on
    /// return rather than aliased. Two reference arguments naming the same
    /// variable do not see each other's writes; the last write-back wins.
    fn call(&mut self, function: &str, arguments: &str) {
        let start = *self
            .functions
            .get(function)
            .unwrap_or_else(|| panic!("call to unknown function `{}`", function));
        let header = self.lines[start][2].clone();

        let parameters: Vec<(String, String)> = if header == "null" {
            vec![]
        } else {
            header
                .split('/')
                .map(|parameter| {
                    let (name, kind) = parameter.split_once(':').unwrap();
                    (name.to_string(), kind.to_string())
                })
                .collect()
        };
        let arguments: Vec<&str> = if arguments == "null" {
            vec![]
        } else {
            arguments.split('/').collect()
        };
        assert_eq!(parameters.len(), arguments.len(), "arity of `{}`", function);

        let mut write_back = vec![];
        for ((parameter, kind), argument) in parameters.iter().zip(&arguments) {
            let data = self.read(argument);
            self.write(parameter, data);
            if kind == "sym" {
                if let Some(source) = argument.strip_prefix("sym:") {
                    write_back.push((parameter.clone(), source.to_string()));
                }
            }
        }

        self.execute(start + 1);

        for (parameter, source) in write_back {
            let data = self.read(&format!("sym:{}", parameter));
            self.write(&source, data);
        }
    }
}
