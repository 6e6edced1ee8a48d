use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "fmapper")]
#[command(about = "Field accessor synthesis for entity classes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Inject FieldMapper types and emit the resulting Java sources */
    Codegen {
        /* Input YAML files containing class descriptions */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Output directory for generated sources */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* Enable injection regardless of the config file; FMAPPER_INLINE
         * accepts shell-style values (1, true, yes, on) */
        #[arg(
            long = "inline",
            env = "FMAPPER_INLINE",
            value_parser = FalseyValueParser::new()
        )]
        inline: bool,

        /* Config file to use instead of the default location */
        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Java package clause for the emitted sources */
        #[arg(long = "package", value_name = "NAME")]
        package: Option<String>,

        /* Print the synthesized method bodies (JSON) */
        #[arg(long = "print-ir")]
        print_ir: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Show field classification and accessor resolution for entity classes */
    Analyze {
        /* Input YAML files containing class descriptions */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Codegen { verbose, .. } | Commands::Analyze { verbose, .. } => *verbose,
    };
    /* RUST_LOG wins; otherwise only --verbose turns logging on */
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "off" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Codegen {
            files,
            output_dir,
            inline,
            config,
            package,
            print_ir,
            verbose,
        } => {
            cmds::codegen::run(cmds::codegen::CodegenArgs {
                files,
                output_dir,
                inline,
                config,
                package,
                print_ir,
                verbose,
            })?;
        }

        Commands::Analyze { files, verbose } => {
            cmds::analyze::run(files, verbose)?;
        }
    }

    Ok(())
}
