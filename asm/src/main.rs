use color_print::{cformat, cprintln};
use qasm::msg::{report, Msg};
use qasm::{first_pass, parse, second_pass, write_mif, DEFAULT_DEPTH};
use qcore::{disassemble, doc::generate_reference};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Assembly source file
    #[clap(required_unless_present = "doc")]
    input: Option<String>,

    /// Output file (`.mif` is appended when missing)
    #[clap(short, long, default_value = "a.mif")]
    output: String,

    /// Print statements, symbols and a listing
    #[clap(short, long)]
    verbose: bool,

    /// Print the instruction set reference and exit
    #[clap(long)]
    doc: bool,

    /// Memory depth in words
    #[clap(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    if args.doc {
        print!("{}", generate_reference());
        return;
    }
    let Some(input) = args.input.as_deref() else {
        Msg::Error("no input file".to_string()).print();
        std::process::exit(1);
    };
    if !run(input, &args) {
        std::process::exit(1);
    }
}

fn run(input: &str, args: &Args) -> bool {
    println!("qCore Assembler");

    println!("1. Read File and Parse Lines");
    println!("  < {}", input);
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            Msg::Error(cformat!("Failed to open file <underline>{}</>: {}", input, err)).print();
            return false;
        }
    };
    let program = match parse(&source) {
        Ok(program) => program,
        Err(errs) => {
            for err in &errs {
                report(input, &source, err);
            }
            return false;
        }
    };
    if args.verbose {
        for stmt in &program {
            cprintln!("  <blue>{:>4}</> {}", stmt.pos.line, stmt);
        }
    }

    println!("2. Collect Symbols");
    let layout = match first_pass(&program) {
        Ok(layout) => layout,
        Err(err) => {
            report(input, &source, &err);
            return false;
        }
    };
    if args.verbose {
        for (name, addr, line) in layout.symbols.labels() {
            cprintln!("  <g>{:<16}</> 0x{:04x}  <blue>(line {})</>", name, addr, line);
        }
        for (name, value, line) in layout.symbols.defines() {
            cprintln!("  <y>{:<16}</> {:<6}  <blue>(line {})</>", name, value, line);
        }
        println!("  {} words", layout.size());
    }

    println!("3. Encode Instructions");
    let image = match second_pass(&program, &layout) {
        Ok(image) => image,
        Err(err) => {
            report(input, &source, &err);
            return false;
        }
    };
    if args.verbose {
        println!("-------+------+---------------------------------------------");
        for (addr, word, data) in image.iter() {
            let text = if data {
                cformat!("<m>data</>")
            } else {
                disassemble(word, addr).cformat()
            };
            println!(" {:04x}  | {:04x} | {}", addr, word, text);
        }
        println!("-------+------+---------------------------------------------");
    }

    match write_mif(&image, &args.output, args.depth) {
        Ok(path) => {
            println!("  > {}", path);
            true
        }
        Err(err) => {
            report(input, &source, &err);
            false
        }
    }
}
