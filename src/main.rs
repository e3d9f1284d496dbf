use anyhow::Result;
use clap::{Parser, Subcommand};
use nit::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "nit",
    version = "0.1.0",
    about = "A minimal git core",
    long_about = "A minimal implementation of git's core: the object database, \
    the staging index, and the commit pipeline. \
    It is a learning project, not a git replacement.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command hashes a file as a blob and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "ls-tree",
        about = "List the contents of a tree object",
        long_about = "This command lists the rows of a tree object. \
        It accepts a tree SHA, a commit SHA, or HEAD."
    )]
    LsTree {
        #[arg(index = 1, help = "The tree-ish SHA to list")]
        sha: String,
    },
    #[command(
        name = "write-tree",
        about = "Write the staging index as a tree object",
        long_about = "This command materializes the current staging index as a tree graph \
        in the object database and prints the root tree SHA."
    )]
    WriteTree,
    #[command(
        name = "add",
        about = "Stage files for commit",
        long_about = "This command stages the specified files or directories into the index. \
        Directories are walked recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The paths to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "diff",
        about = "Show changes between the index and the working tree or HEAD",
        long_about = "This command shows unstaged changes by default, \
        or staged changes against HEAD with --cached."
    )]
    Diff {
        #[arg(long, help = "Compare HEAD against the index")]
        cached: bool,
        #[arg(long, help = "Print a per-file change summary instead of patches")]
        stat: bool,
    },
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init()?
        }
        Commands::CatFile { sha } => open_repository()?.cat_file(sha)?,
        Commands::HashObject { write, file } => open_repository()?.hash_object(file, *write)?,
        Commands::LsTree { sha } => open_repository()?.ls_tree(sha)?,
        Commands::WriteTree => open_repository()?.write_tree()?,
        Commands::Add { paths } => open_repository()?.add(paths)?,
        Commands::Commit { message } => {
            if !open_repository()?.commit(message)? {
                std::process::exit(1);
            }
        }
        Commands::Diff { cached, stat } => open_repository()?.diff(*cached, *stat)?,
    }

    Ok(())
}
