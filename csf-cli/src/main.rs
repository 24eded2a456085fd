//! Credential security factory configuration CLI
//!
//! Reads Elytron subsystem documents into add operations and writes subsystem
//! documents back from a model.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use clap::{ArgAction, Parser, Subcommand};
use elytron_csf::{
    KerberosSecurityFactory, ModelNode, PathAddress, SubsystemModel, SubsystemNamespace,
    SubsystemParser, XmlStreamWriter, XmlWriterOptions, DEFAULT_NAMESPACE,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Elytron credential security factory tool
#[derive(Parser)]
#[command(name = "csf")]
#[command(version)]
#[command(about = "Read and write Elytron credential security factory configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Subsystem namespace URI
    #[arg(long, global = true, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Subsystem address, as `type=name,...` or `/type=name/...`
    #[arg(long, global = true, default_value = "subsystem=elytron")]
    address: PathAddress,

    /// Spaces per nesting level in written XML
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a subsystem document and print its add operations as JSON
    #[command(visible_alias = "r")]
    Read {
        /// Subsystem XML file
        file: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Write a subsystem document from a JSON model
    #[command(visible_alias = "w")]
    Write {
        /// JSON file holding the subsystem subtree
        model: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Read a subsystem document, build its model and write it back
    #[command(visible_alias = "rt")]
    RoundTrip {
        /// Subsystem XML file
        file: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Print every factory of a subsystem document with defaults applied
    Show {
        /// Subsystem XML file
        file: String,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let parser = SubsystemParser::new(SubsystemNamespace::new(cli.namespace.as_str()))
        .with_address(cli.address.clone());
    let options = XmlWriterOptions { indent: cli.indent };

    let result = match cli.command {
        Commands::Read { file, output } => run_read(&parser, &file, output.as_deref()),
        Commands::Write { model, output } => {
            run_write(&parser, &model, output.as_deref(), options)
        }
        Commands::RoundTrip { file, output } => {
            run_round_trip(&parser, &file, output.as_deref(), options)
        }
        Commands::Show { file } => run_show(&parser, &file),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Installs a stderr subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_output(path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

/// Parses `file` and applies its operations to an empty model.
fn load_model(parser: &SubsystemParser, file: &str) -> Result<SubsystemModel, Box<dyn std::error::Error>> {
    info!("Parsing {}", file);
    let operations = parser.parse_file(file)?;
    let mut model = SubsystemModel::new(parser.address().clone());
    model.apply_all(&operations)?;
    Ok(model)
}

fn write_model(
    parser: &SubsystemParser,
    model: &SubsystemModel,
    output_path: Option<&str>,
    options: XmlWriterOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = XmlStreamWriter::with_options(open_output(output_path)?, options);
    parser.write(model.node(), &mut writer)?;
    let mut output = writer.into_inner()?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

/// Prints the add operations of a subsystem document.
fn run_read(
    parser: &SubsystemParser,
    path: &str,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Parsing {}", path);
    let operations = parser.parse_file(path)?;

    let json: Vec<serde_json::Value> = operations
        .iter()
        .map(|op| serde_json::Value::from(&op.to_model_node()))
        .collect();

    let mut output = open_output(output_path)?;
    serde_json::to_writer_pretty(&mut output, &json)?;
    writeln!(output)?;
    output.flush()?;

    info!("Read {} operation(s).", operations.len());
    Ok(())
}

/// Writes a subsystem document from a JSON subtree.
fn run_write(
    parser: &SubsystemParser,
    model_path: &str,
    output_path: Option<&str>,
    options: XmlWriterOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading model {}", model_path);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(model_path)?)?;
    let node = ModelNode::try_from(&json)?;
    let model = SubsystemModel::from_node(parser.address().clone(), node)?;
    model.validate()?;

    write_model(parser, &model, output_path, options)?;
    info!("Write complete.");
    Ok(())
}

/// Reads a subsystem document and writes it back through the model.
fn run_round_trip(
    parser: &SubsystemParser,
    path: &str,
    output_path: Option<&str>,
    options: XmlWriterOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(parser, path)?;
    write_model(parser, &model, output_path, options)?;
    info!("Round trip complete.");
    Ok(())
}

/// Prints each factory with its defaults resolved.
fn run_show(parser: &SubsystemParser, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(parser, path)?;
    let factories = KerberosSecurityFactory::all(model.address(), model.node())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for factory in &factories {
        writeln!(out, "kerberos-security-factory {}", factory.name)?;
        writeln!(out, "  principal:                  {}", factory.principal)?;
        writeln!(out, "  path:                       {}", factory.path)?;
        if let Some(relative_to) = &factory.relative_to {
            writeln!(out, "  relative-to:                {}", relative_to)?;
        }
        writeln!(out, "  server:                     {}", factory.server)?;
        writeln!(
            out,
            "  minimum-remaining-lifetime: {}",
            factory.minimum_remaining_lifetime
        )?;
        writeln!(out, "  request-lifetime:           {}", factory.request_lifetime)?;
        writeln!(out, "  debug:                      {}", factory.debug)?;
        writeln!(
            out,
            "  mechanism-oids:             {}",
            factory.mechanism_oids.join(" ")
        )?;
    }

    info!("{} factory(ies).", factories.len());
    Ok(())
}
