use camino::Utf8PathBuf;
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;
use weft_driver::{Config, Driver};
use weft_ir::codec;
use weft_ir::diag::Diagnostic;
use weft_link::linker::link;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(clap::Subcommand, Debug)]
pub enum Cmd {
    /// Validate a target's graph document against its dependency artifacts.
    Check {
        /// The current target's IR document.
        doc: Utf8PathBuf,
        /// Directories scanned for dependency artifacts.
        #[arg(long = "dep-dir")]
        dep_dirs: Vec<Utf8PathBuf>,
        /// Where to write the current target's artifact.
        #[arg(long)]
        out: Option<Utf8PathBuf>,
        /// Provider type names to exclude from the report.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// Resolve root components on separate threads.
        #[arg(long)]
        parallel: bool,
    },
    /// Re-encode a document as a trimmed artifact without resolving it.
    Emit {
        doc: Utf8PathBuf,
        #[arg(long)]
        out: Utf8PathBuf,
    },
    /// Print the linked symbol tables of a single document.
    Dump { doc: Utf8PathBuf },
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let cli: Cli = clap::Parser::parse();

    match cli.command {
        Cmd::Check {
            doc,
            dep_dirs,
            out,
            exclude,
            parallel,
        } => {
            let document = Driver::load_document(&doc)?;

            let mut config = Config::new()
                .with_search_paths(dep_dirs)
                .with_excluded(exclude);
            if let Some(out) = out {
                config = config.with_artifact_dir(out);
            }
            if parallel {
                config = config.with_parallel_roots();
            }

            let outcome = Driver::new(config).check(document)?;

            for diagnostic in outcome.diagnostics() {
                print_diagnostic(diagnostic);
            }

            if outcome.is_failure() {
                eprintln!(
                    "{}: {} diagnostic(s)",
                    "failed".red().bold(),
                    outcome.diagnostics().count()
                );
                std::process::exit(1);
            }

            println!(
                "{}: {} root component(s), artifact at {}",
                "ok".green().bold(),
                outcome.resolved.len(),
                outcome.artifact
            );
        }
        Cmd::Emit { doc, out } => {
            let document = Driver::load_document(&doc)?;
            let driver = Driver::new(Config::new().with_artifact_dir(out));
            let path = driver.persist(&document)?;
            println!("wrote {path}");
        }
        Cmd::Dump { doc } => {
            let bytes = std::fs::read(&doc).into_diagnostic()?;
            let document = codec::decode(&bytes).into_diagnostic()?;
            let output = link(document, vec![]);

            println!("{}", "Providers".bold().bright_white());
            for (key, sites) in &output.interface.providers {
                for site in sites {
                    println!("  {key} <- {} ({})", site.owner, site.provider.debug);
                }
            }

            println!("{}", "Modules".bold().bright_white());
            for decl in output.interface.modules.values() {
                println!("  {} ({})", decl.module.name, decl.module.debug);
            }

            println!("{}", "Components".bold().bright_white());
            for decl in output.interface.components.values() {
                let component = &decl.component;
                let kind = if component.root { "root" } else { "sub" };
                println!("  {} [{kind}] ({})", component.name, component.debug);
            }

            for diagnostic in output.report.iter() {
                print_diagnostic(diagnostic);
            }
        }
    }

    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    eprintln!("{}: {diagnostic}", "error".red());
}
