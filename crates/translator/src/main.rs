//! bas2c CLI
//!
//! Command-line interface for translating X-BASIC sources to C.

use clap::{CommandFactory, Parser as ClapParser};
use clap_complete::{generate, Shell};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use bas2c::{decode_source, encode_sjis, translate_source, Config, Tables};

#[derive(ClapParser)]
#[command(name = "bas2c")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "X-BASIC to C source translator", long_about = None)]
struct Cli {
    /// Abort on the first pass-2 error instead of recovering
    #[arg(short = 'D')]
    debug: bool,

    /// Treat a call to an undefined function as an error
    #[arg(short = 'u')]
    undef_error: bool,

    /// Omit b_init()/b_exit(); END becomes exit(0)
    #[arg(short = 'n')]
    no_binit: bool,

    /// Echo each BASIC line while pass 2 runs
    #[arg(short = 'v')]
    verbose: bool,

    /// BC.X-compatible output (no extra parens/casts, logical NOT,
    /// raw comparison results)
    #[arg(short = 'b')]
    bc_compat: bool,

    /// Write the generated C as CP932 (Shift_JIS)
    #[arg(short = 's')]
    sjis_output: bool,

    /// Insert each BASIC line as a C comment, indented by TABS tab stops
    #[arg(short = 'c', value_name = "TABS", num_args = 0..=1, default_missing_value = "7")]
    comment: Option<usize>,

    /// Output file ('-' writes to stdout; default derives from the input name)
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Signature definition file (default: bas2c.def next to the executable)
    #[arg(long = "def", value_name = "FILE")]
    def_file: Option<PathBuf>,

    /// Generate a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Input .bas file (stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (same as -o)
    output_pos: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "bas2c", &mut io::stdout());
        return;
    }

    let config = Config {
        debug: cli.debug,
        undef_error: cli.undef_error,
        no_binit: cli.no_binit,
        verbose: cli.verbose,
        bc_compat: cli.bc_compat,
        bas_comment: cli.comment,
    };

    // signature table
    let def_path = match cli.def_file.clone().or_else(find_def_file) {
        Some(p) => p,
        None => {
            eprintln!("Error: bas2c.def not found (searched BAS2C_DEF, the executable directory, and the current directory)");
            process::exit(1);
        }
    };
    let def_text = match fs::read(&def_path) {
        Ok(bytes) => decode_source(&bytes),
        Err(e) => {
            eprintln!("Error reading {}: {}", def_path.display(), e);
            process::exit(1);
        }
    };
    let mut tables = Tables::new();
    tables.load_exfn(&def_text);

    // input source (stdin is buffered so the lexer can rewind)
    let (bytes, file_name) = match &cli.input {
        Some(path) => match fs::read(path) {
            Ok(b) => (b, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut b = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut b) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            (b, "<stdin>".to_string())
        }
    };
    let source = decode_source(&bytes);

    let output = cli
        .output
        .clone()
        .or(cli.output_pos.clone())
        .or_else(|| cli.input.as_ref().map(|p| default_output(p)));

    match translate_source(&source, &tables, &config, &file_name) {
        Ok(t) => {
            if let Err(e) = write_output(output.as_deref(), &t.text, cli.sjis_output) {
                eprintln!("Error writing output: {}", e);
                process::exit(1);
            }
            process::exit(if t.errors > 0 { 1 } else { 0 });
        }
        Err(e) => {
            eprintln!("{}: error: {}", file_name, e);
            process::exit(1);
        }
    }
}

/// Default output name: the input with its `.bas` extension replaced
/// by `.c`.
fn default_output(input: &Path) -> PathBuf {
    if input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("bas"))
    {
        input.with_extension("c")
    } else {
        let mut s = input.as_os_str().to_owned();
        s.push(".c");
        PathBuf::from(s)
    }
}

/// Locate bas2c.def: $BAS2C_DEF, then next to the executable, then the
/// current directory.
fn find_def_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BAS2C_DEF") {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        eprintln!(
            "Warning: BAS2C_DEF is set to '{}' but that file doesn't exist",
            path.display()
        );
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("bas2c.def");
            if p.is_file() {
                return Some(p);
            }
        }
    }
    let p = PathBuf::from("bas2c.def");
    if p.is_file() {
        return Some(p);
    }
    None
}

fn write_output(path: Option<&Path>, text: &str, sjis: bool) -> io::Result<()> {
    let bytes = if sjis {
        encode_sjis(text)
    } else {
        text.as_bytes().to_vec()
    };
    match path {
        None => io::stdout().write_all(&bytes),
        Some(p) if p.as_os_str() == "-" => io::stdout().write_all(&bytes),
        Some(p) => fs::write(p, bytes),
    }
}
