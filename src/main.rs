use std::{
    env,
    fs::{self, create_dir_all},
    path::PathBuf,
    process::{self, Command},
    time::Instant,
};

use mcc::{compiler::compiler::compile, display_error};

const DEFAULT_OUTPUT: &str = "build/out.mcasm";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <source> [output]", args[0]);
        process::exit(2);
    }

    let source_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT));
    let file_name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args[1].clone());

    let start = Instant::now();

    let source = match fs::read_to_string(&source_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", source_path.display(), error);
            process::exit(1);
        }
    };

    let ir = match compile(&source, &file_name) {
        Ok(ir) => ir,
        Err(error) => {
            display_error(&error, &source, &file_name);
            process::exit(1);
        }
    };

    println!("Compiled in {:?}", start.elapsed());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(error) = create_dir_all(parent) {
                eprintln!("Failed to create {}: {}", parent.display(), error);
                process::exit(1);
            }
        }
    }

    if let Err(error) = fs::write(&output_path, ir) {
        eprintln!("Failed to write {}: {}", output_path.display(), error);
        process::exit(1);
    }

    println!("Wrote {}", output_path.display());

    if let Ok(assembler) = env::var("MCASM") {
        let result = match Command::new(&assembler).arg(&output_path).output() {
            Ok(result) => result,
            Err(error) => {
                eprintln!("Failed to run {}: {}", assembler, error);
                process::exit(1);
            }
        };

        if !result.stderr.is_empty() {
            eprintln!(
                "Failed to assemble using {}:\n{}",
                assembler,
                String::from_utf8_lossy(&result.stderr)
            );
            process::exit(1);
        }

        print!("{}", String::from_utf8_lossy(&result.stdout));
        println!("Assembled using {}", assembler);
    }

    println!("Total time: {:?}", start.elapsed());
}
