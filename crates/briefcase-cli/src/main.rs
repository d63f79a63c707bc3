//! Thin command-line shell over the vault engine.
//!
//! Maps one subcommand per documented engine operation and exits 0 on
//! success, 1 on any invocation error. Human-readable failure messages
//! are composed here; the engine only returns structured errors.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use briefcase_core::{Compression, Password, Vault};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "briefcase")]
#[command(about = "Single-file encrypted, versioned document vault", long_about = None)]
struct Cli {
    /// Path of the briefcase container file
    #[arg(long = "db")]
    db: PathBuf,

    /// Vault password; omit for a passwordless vault
    #[arg(long = "pwd", default_value = "")]
    pwd: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new version of one file
    #[command(name = "addfile")]
    AddFile {
        path: PathBuf,
        /// Per-file password; omit to use the vault default, pass an
        /// empty string to store without encryption
        #[arg(long)]
        filepwd: Option<String>,
        /// Labels, separated by ";"
        #[arg(long, default_value = "")]
        labels: String,
        /// Compression algorithm: zlib or bz2
        #[arg(long, default_value = "zlib")]
        algo: String,
        /// Refuse to add when the file already exists in the vault
        #[arg(long)]
        no_versions: bool,
    },

    /// Store every file matching a glob pattern
    #[command(name = "addmanyfiles")]
    AddManyFiles {
        pattern: String,
        #[arg(long)]
        filepwd: Option<String>,
        #[arg(long, default_value = "")]
        labels: String,
        #[arg(long, default_value = "zlib")]
        algo: String,
        #[arg(long)]
        no_versions: bool,
    },

    /// Copy one version of a file into a new file starting at version 1
    #[command(name = "copyintonew")]
    CopyIntoNew {
        name: String,
        /// Version to copy; 0 selects the latest
        #[arg(long, default_value_t = 0)]
        version: i64,
        new_name: String,
    },

    /// Decrypt and export one file
    #[command(name = "exportfile")]
    ExportFile {
        name: String,
        /// Directory to export into; required unless --execute is given
        #[arg(long)]
        dest: Option<PathBuf>,
        #[arg(long)]
        filepwd: Option<String>,
        #[arg(long, default_value_t = 0)]
        version: i64,
        /// Open with the host viewer from a wiped temporary directory
        #[arg(long)]
        execute: bool,
    },

    /// Export the latest version of every matching file
    #[command(name = "exportall")]
    ExportAll {
        dest: PathBuf,
        #[arg(long)]
        filepwd: Option<String>,
    },

    /// Rename a file
    #[command(name = "renfile")]
    RenFile { name: String, new_name: String },

    /// Delete a file or a single version of it
    #[command(name = "delfile")]
    DelFile {
        name: String,
        /// Version to delete; 0 removes the whole file
        #[arg(long, default_value_t = 0)]
        version: i64,
    },

    /// Replace the labels of a file
    #[command(name = "setlabels")]
    SetLabels { name: String, labels: String },

    /// List file names, optionally sorted and filtered
    #[command(name = "list")]
    List {
        /// Sort key and direction, e.g. "size desc"
        #[arg(long)]
        sort: Option<String>,
        /// Filter expression, e.g. "labels like '%photo%'"
        #[arg(long)]
        filter: Option<String>,
    },

    /// Print the statistics row of one file
    #[command(name = "statistics")]
    Statistics { name: String },

    /// Print container-level information
    #[command(name = "info")]
    Info,

    /// Reset logs, rebuild statistics and compact the container
    #[command(name = "cleanup")]
    Cleanup,
}

fn password_arg(filepwd: Option<String>) -> Password {
    match filepwd {
        None => Password::Default,
        Some(s) if s.is_empty() => Password::None,
        Some(s) => Password::Literal(s),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut vault = Vault::open(&cli.db, &cli.pwd)?;

    match cli.command {
        Commands::AddFile {
            path,
            filepwd,
            labels,
            algo,
            no_versions,
        } => {
            let algo: Compression = algo.parse()?;
            vault.add_file(&path, &password_arg(filepwd), &labels, algo, !no_versions)?;
        }
        Commands::AddManyFiles {
            pattern,
            filepwd,
            labels,
            algo,
            no_versions,
        } => {
            let algo: Compression = algo.parse()?;
            let added = vault.add_many_files(
                &pattern,
                &password_arg(filepwd),
                &labels,
                algo,
                !no_versions,
            )?;
            println!("{added}");
        }
        Commands::CopyIntoNew {
            name,
            version,
            new_name,
        } => {
            vault.copy_into_new(&name, version, &new_name)?;
        }
        Commands::ExportFile {
            name,
            dest,
            filepwd,
            version,
            execute,
        } => {
            let hash = vault.export_file(
                &name,
                &password_arg(filepwd),
                version,
                dest.as_deref(),
                execute,
            )?;
            println!("{hash}");
        }
        Commands::ExportAll { dest, filepwd } => {
            let exported = vault.export_all(&dest, &password_arg(filepwd))?;
            println!("{exported}");
        }
        Commands::RenFile { name, new_name } => {
            vault.ren_file(&name, &new_name)?;
        }
        Commands::DelFile { name, version } => {
            vault.del_file(&name, version)?;
        }
        Commands::SetLabels { name, labels } => {
            let canon = vault.set_labels(&name, &labels)?;
            println!("{canon}");
        }
        Commands::List { sort, filter } => {
            let names = vault.get_file_list(sort.as_deref(), filter.as_deref())?;
            for name in names {
                println!("{name}");
            }
        }
        Commands::Statistics { name } => {
            let stats = vault.file_statistics(&name)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Info => {
            let info = vault.info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Cleanup => {
            vault.cleanup()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("briefcase: {err}");
            ExitCode::FAILURE
        }
    }
}
