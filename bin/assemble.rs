use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use slog::{info, o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use hackasm::{
    bytecode,
    error::{self, VerboseError},
    event::Event,
    instruction::ResolvedInstruction,
    symbolic::parser::Parser,
};

enum Error {
    /// The source had errors. They have already been printed.
    Assembly(usize),
    Hack(bytecode::ParseError),
    IO(PathBuf, std::io::Error),
}

impl From<bytecode::ParseError> for Error {
    fn from(e: bytecode::ParseError) -> Error {
        Error::Hack(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("hackasm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Assembler for the Hack assembly language")
        .arg(Arg::with_name("source")
             .help("File containing assembly source, or machine code with --disassemble")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("output")
             .help("Where to write the machine code. Defaults to SOURCE with the extension .hack")
             .value_name("OUTPUT")
             .index(2))
        .arg(Arg::with_name("listing")
             .help("Print the address, machine word and instruction of every word")
             .long("listing")
             .short("l"))
        .arg(Arg::with_name("symbols")
             .help("Print the addresses of labels and variables")
             .long("symbols")
             .short("s"))
        .arg(Arg::with_name("disassemble")
             .help("Read SOURCE as a .hack file and print its instructions")
             .long("disassemble")
             .short("d"))
        .arg(Arg::with_name("verbose")
             .help("Log the progress of the assembler")
             .long("verbose")
             .short("v"))
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    let logger = if args.is_present("verbose") {
        let decorator = TermDecorator::new().stderr().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    };

    let result = if args.is_present("disassemble") {
        disassemble(&args)
    } else {
        assemble(&args, logger)
    };

    match result {
        Ok(()) => (),
        Err(Error::Assembly(count)) => {
            eprintln!("assembly failed with {} error(s)", count);
            std::process::exit(1);
        }
        Err(Error::Hack(err)) => {
            eprintln!("invalid machine code: {}", err);
            std::process::exit(1);
        }
        Err(Error::IO(path, err)) => {
            eprintln!("{}: {}", path.display(), err);
            std::process::exit(1);
        }
    }
}

fn read_source(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| Error::IO(path.to_path_buf(), err))
}

/// Draws `~` under the expression and `^` under the token the error points at.
fn underline(error: &VerboseError) -> String {
    let start = std::cmp::min(error.column, error.expression_column);
    let end = std::cmp::max(
        error.column + std::cmp::max(error.length, 1),
        error.expression_column + error.expression_length,
    );

    (start..end)
        .map(|column| {
            if column >= error.column && column < error.column + std::cmp::max(error.length, 1) {
                '^'
            } else if column >= error.expression_column
                && column < error.expression_column + error.expression_length
            {
                '~'
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn print_diagnostic(path: &Path, source: &str, error: &error::Error) {
    let error = error.clone().verbose(source);

    let padding = " ".repeat(error.column.min(error.expression_column) - 1);

    eprintln!("{}:{}:{}: {}", path.display(), error.line, error.column, error.kind);
    eprintln!("    {}", error.source_line);
    eprintln!("    {}{}", padding, underline(&error));

    if let Some(help) = &error.help {
        eprintln!("    help: {}", help);
    }
}

fn assemble(args: &ArgMatches, logger: Logger) -> Result<(), Error> {
    let source_path = Path::new(args.value_of("source").unwrap_or_default());
    let output_path = args
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| source_path.with_extension("hack"));

    let source = read_source(source_path)?;

    info!(logger, "assembling"; "source" => %source_path.display());

    let program = {
        let mut parser = Parser::with_logger(&source, logger.clone());
        parser.add_listener(|event: &Event| {
            if let Event::Diagnostic(error) = event {
                print_diagnostic(source_path, &source, error);
            }
        });
        parser.parse().map_err(|errors| Error::Assembly(errors.len()))?
    };

    let compiled: hackasm::compiler::WithSourceMap<bytecode::Program> =
        hackasm::compiler::compile_with_logger(program, logger.clone()).map_err(|errors| {
            for error in &errors {
                print_diagnostic(source_path, &source, error);
            }

            Error::Assembly(errors.len())
        })?;

    std::fs::write(&output_path, format!("{}\n", compiled.compiled))
        .map_err(|err| Error::IO(output_path.clone(), err))?;

    info!(logger, "wrote machine code";
        "output" => %output_path.display(),
        "words" => compiled.compiled.words.len());

    if args.is_present("listing") {
        let lines = compiled.source_map.clone().into_line_based(&source);

        for (address, word) in compiled.compiled.words.iter().enumerate() {
            let instruction = ResolvedInstruction::try_from(*word)
                .map(|instruction| instruction.to_string())
                .unwrap_or_default();

            match lines.get_source_span(address as u16) {
                Some(span) => println!("{:04}  {:016b}  {:<16}  line {}", address, word, instruction, span.start.line),
                None => println!("{:04}  {:016b}  {}", address, word, instruction),
            }
        }
    }

    if args.is_present("symbols") {
        for (name, address) in compiled.compiled.user_symbols() {
            println!("{:<24} {}", name, address);
        }
    }

    Ok(())
}

fn disassemble(args: &ArgMatches) -> Result<(), Error> {
    let path = Path::new(args.value_of("source").unwrap_or_default());
    let program = bytecode::Program::parse(&read_source(path)?)?;

    for (address, decoded) in program.decode().enumerate() {
        match decoded {
            Ok(instruction) => println!("{:04}  {}", address, instruction),
            Err(err) => println!("{:04}  ; {}", address, err),
        }
    }

    Ok(())
}
