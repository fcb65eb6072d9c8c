use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use strata_framework::{
    ComponentFactory, Dictionary, DocumentationFactory, Registries, Session,
    component::DEFAULT_VERSION,
};

/// Configuration-driven component runner.
#[derive(Debug, Parser)]
#[command(name = "strata", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create every component a configuration declares and drive it through its lifecycle.
    Run {
        /// JSON configuration file.
        config: PathBuf,
    },
    /// Create and check every declared component against its type's metadata without running.
    Check {
        /// JSON configuration file.
        config: PathBuf,
    },
    /// Print the dependencies and parameters a type requests, or those of every type.
    Document {
        #[arg(value_name = "TYPE")]
        type_name: Option<String>,
    },
    /// Print the metadata registered for a type.
    Meta {
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
    /// List every registered type and version.
    Types,
    /// Print the tree of types below a type.
    Hierarchy {
        #[arg(value_name = "TYPE", default_value = "Component")]
        type_name: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read configuration '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{count} component(s) failed validation")]
    Invalid { count: usize },

    #[error(transparent)]
    Framework(#[from] strata_framework::Error),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("cannot format output")]
    Format(#[from] fmt::Error),
}

/// Runs commands against a set of registries.
///
/// This is the only place a fatal framework error ends the program: [`start`](Self::start)
/// logs it, prints it with its suggestions and reports exit status 1.
pub struct CliControl<'a> {
    registries: &'a Registries,
}

impl<'a> CliControl<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Parse the process arguments and run the command. Returns the exit status.
    pub fn start(&self) -> i32 {
        let cli = Cli::parse();
        self.start_with(&cli.command)
    }

    pub fn start_with(&self, command: &Command) -> i32 {
        let stdout = io::stdout();
        match self.handle_command(command, &mut stdout.lock()) {
            Ok(()) => 0,
            Err(error) => {
                log::error!("{error}");
                eprintln!("error: {error}");
                1
            }
        }
    }

    pub fn handle_command(&self, command: &Command, out: &mut impl Write) -> Result<(), CliError> {
        match command {
            Command::Run { config } => self.run(config, out),
            Command::Check { config } => self.check(config, out),
            Command::Document { type_name } => self.document(type_name.as_deref(), out),
            Command::Meta { type_name } => {
                let components = self.registries.components();
                components.assert_lookup(type_name, DEFAULT_VERSION)?;
                if let Some(meta) = components.metadata(type_name, DEFAULT_VERSION) {
                    write!(out, "{meta}")?;
                }
                Ok(())
            }
            Command::Types => {
                for (type_name, version) in self.registries.components().entries() {
                    writeln!(out, "{type_name} (version {version})")?;
                }
                Ok(())
            }
            Command::Hierarchy { type_name } => {
                let mut tree = String::new();
                self.registries.print_descendants(type_name, &mut tree)?;
                write!(out, "{tree}")?;
                Ok(())
            }
        }
    }

    fn run(&self, config: &Path, out: &mut impl Write) -> Result<(), CliError> {
        let root = read_config(config)?;
        let mut session = Session::new(self.registries, &root);
        session.run(&mut ())?;
        writeln!(out, "ran {} components", session.live().len())?;
        session.finish();
        Ok(())
    }

    fn check(&self, config: &Path, out: &mut impl Write) -> Result<(), CliError> {
        let root = read_config(config)?;
        let mut factory = ComponentFactory::new(self.registries, &root);
        factory.create_all()?;

        let validations = factory.validate_all()?;
        for validation in &validations {
            write!(out, "{validation}")?;
        }
        match validations.iter().filter(|validation| !validation.is_valid()).count() {
            0 => Ok(()),
            count => Err(CliError::Invalid { count }),
        }
    }

    fn document(&self, type_name: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
        let mut docs = DocumentationFactory::new(self.registries);
        match type_name {
            Some(type_name) => write!(out, "{}", docs.document_type(type_name)?)?,
            None => {
                for doc in docs.document_all()? {
                    writeln!(out, "{doc}")?;
                }
            }
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<Dictionary, CliError> {
    log::info!("reading configuration from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Dictionary::from_json_str(&text)?)
}
