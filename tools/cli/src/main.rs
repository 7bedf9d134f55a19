//! PDF Vault CLI - Command line interface for vault tree operations.
//!
//! This tool drives the vault engine from a terminal: one-shot commands for
//! scripting, and an interactive shell that keeps a selection and expansion
//! state between commands the way a tree view would.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pdfvault_storage::StorageProvider;
use pdfvault_vault::{
    DeleteOutcome, DragGesture, DropEffect, ImportReport, LoggingObserver, MoveOutcome, Point,
    RenameOutcome, Selection, VaultConfig, VaultNode, VaultTreeSync,
};

#[derive(Parser)]
#[command(name = "pdfvault")]
#[command(about = "PDF Vault - Folder tree management for PDF documents")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Vault root directory (default: "My CASTLE" in the documents folder).
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the vault tree.
    Tree {
        /// Emit the tree as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Create a new folder.
    Mkdir {
        /// Folder (or file, meaning its folder) to create in; default root.
        #[arg(long = "in")]
        within: Option<PathBuf>,
    },

    /// Import PDF files into the vault.
    Import {
        /// Folder (or file, meaning its folder) to import into; default root.
        #[arg(long)]
        into: Option<PathBuf>,

        /// Files to copy.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Rename a file or folder.
    Rename {
        /// Entry to rename.
        path: PathBuf,

        /// New name.
        name: String,
    },

    /// Move a file or folder into another folder.
    Mv {
        /// Entry to move.
        source: PathBuf,

        /// Destination folder, or a file inside it.
        target: PathBuf,
    },

    /// Delete a file, or a folder with its contents.
    Rm {
        /// Entry to delete.
        path: PathBuf,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Start an interactive session.
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref(), cli.vault)?;
    let mut sync = VaultTreeSync::open(&config)
        .with_context(|| format!("Failed to open vault at {}", config.root.display()))?
        .with_observer(Box::new(LoggingObserver));
    for warning in sync.scan_warnings() {
        eprintln!("warning: {}", warning);
    }

    match cli.command {
        Commands::Tree { json } => cmd_tree(&sync, json),

        Commands::Mkdir { within } => cmd_mkdir(&mut sync, within.as_deref()),

        Commands::Import { into, files } => cmd_import(&mut sync, into.as_deref(), &files),

        Commands::Rename { path, name } => cmd_rename(&mut sync, &path, &name),

        Commands::Mv { source, target } => cmd_move(&mut sync, &source, &target),

        Commands::Rm { path, yes } => cmd_remove(&mut sync, &path, yes),

        Commands::Shell => cmd_shell(&mut sync, &config),
    }
}

/// Build the effective configuration from the file and flag overrides.
fn load_config(path: Option<&Path>, vault: Option<PathBuf>) -> Result<VaultConfig> {
    let mut config = match path {
        Some(path) => VaultConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => VaultConfig::default(),
    };
    if let Some(root) = vault {
        config.root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .context("Failed to read current directory")?
                .join(root)
        };
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Resolve a user-supplied path against the vault root.
fn resolve<P: StorageProvider>(sync: &VaultTreeSync<P>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        sync.root_path().join(path)
    }
}

/// Selection for a user-supplied path, if one was given.
fn selection_for<P: StorageProvider>(
    sync: &VaultTreeSync<P>,
    path: Option<&Path>,
) -> Result<Option<Selection>> {
    path.map(|p| {
        let resolved = resolve(sync, p);
        sync.select(&resolved)
            .with_context(|| format!("No such entry: {}", resolved.display()))
    })
    .transpose()
}

/// Display form of a vault path, relative to the root.
fn display_path<P: StorageProvider>(sync: &VaultTreeSync<P>, path: &Path) -> String {
    match path.strip_prefix(sync.root_path()) {
        Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Print `node` and its children; collapsed folders are not descended
/// into unless `full` is set.
fn print_node(node: &VaultNode, depth: usize, full: bool, selected: Option<&Path>) {
    let marker = if node.is_file() {
        "   "
    } else if node.is_expanded() || full {
        "[-]"
    } else {
        "[+]"
    };
    let cursor = if selected == Some(node.path()) { ">" } else { " " };
    println!("{}{}{} {}", cursor, "  ".repeat(depth), marker, node.name());

    if node.is_directory() && (node.is_expanded() || full) {
        for child in node.children() {
            print_node(child, depth + 1, full, selected);
        }
    }
}

/// Print the vault tree.
fn cmd_tree<P: StorageProvider>(sync: &VaultTreeSync<P>, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(sync.tree()).context("Failed to encode tree")?;
        println!("{}", out);
        return Ok(());
    }

    print_node(sync.tree().root(), 0, true, None);
    println!(
        "\n{} folder(s), {} file(s)",
        sync.tree().count_folders(),
        sync.tree().count_files()
    );
    Ok(())
}

/// Create a folder.
fn cmd_mkdir<P: StorageProvider>(sync: &mut VaultTreeSync<P>, within: Option<&Path>) -> Result<()> {
    let selection = selection_for(sync, within)?;
    let path = sync
        .create_folder(selection.as_ref())
        .context("Failed to create folder")?;

    println!("Folder created: {}", display_path(sync, &path));
    Ok(())
}

fn print_import_report<P: StorageProvider>(sync: &VaultTreeSync<P>, report: &ImportReport) {
    for path in &report.imported {
        println!("Imported: {}", display_path(sync, path));
    }
    for failure in &report.failed {
        eprintln!("Failed: {} ({})", failure.source.display(), failure.error);
    }
}

/// Import files.
fn cmd_import<P: StorageProvider>(
    sync: &mut VaultTreeSync<P>,
    into: Option<&Path>,
    files: &[PathBuf],
) -> Result<()> {
    info!("Importing {} file(s)", files.len());

    let selection = selection_for(sync, into)?;
    let report = sync
        .import_files(selection.as_ref(), files)
        .context("Failed to import files")?;

    print_import_report(sync, &report);
    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} file(s) failed", report.failed.len(), files.len());
    }
    Ok(())
}

/// Rename an entry.
fn cmd_rename<P: StorageProvider>(
    sync: &mut VaultTreeSync<P>,
    path: &Path,
    name: &str,
) -> Result<()> {
    let path = resolve(sync, path);
    match sync.rename(&path, name).context("Failed to rename")? {
        RenameOutcome::Renamed { from, to } => println!(
            "Renamed: {} -> {}",
            display_path(sync, &from),
            display_path(sync, &to)
        ),
        RenameOutcome::Unchanged => println!("Nothing to rename."),
    }
    Ok(())
}

/// Move an entry.
fn cmd_move<P: StorageProvider>(
    sync: &mut VaultTreeSync<P>,
    source: &Path,
    target: &Path,
) -> Result<()> {
    let source = resolve(sync, source);
    let target = resolve(sync, target);
    match sync.move_node(&source, &target).context("Failed to move")? {
        MoveOutcome::Moved { from, to } => println!(
            "Moved: {} -> {}",
            display_path(sync, &from),
            display_path(sync, &to)
        ),
        MoveOutcome::Ignored => println!("Nothing to move."),
    }
    Ok(())
}

/// Ask a yes/no question on the terminal; anything but "y" declines.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Delete an entry.
fn cmd_remove<P: StorageProvider>(sync: &mut VaultTreeSync<P>, path: &Path, yes: bool) -> Result<()> {
    let path = resolve(sync, path);
    if sync.tree().is_root(&path) {
        println!("The vault root cannot be deleted.");
        return Ok(());
    }

    let node = sync
        .tree()
        .find_node(&path)
        .with_context(|| format!("No such entry: {}", path.display()))?;
    let prompt = if node.is_directory() {
        format!(
            "Delete folder '{}' and everything in it?",
            display_path(sync, &path)
        )
    } else {
        format!("Delete '{}'?", display_path(sync, &path))
    };
    if !yes && !confirm(&prompt)? {
        println!("Cancelled.");
        return Ok(());
    }

    match sync.delete(&path).context("Failed to delete")? {
        DeleteOutcome::Deleted { path } => println!("Deleted: {}", display_path(sync, &path)),
        DeleteOutcome::Ignored => println!("Nothing to delete."),
    }
    Ok(())
}

const SHELL_HELP: &str = "\
Commands:
  ls                     show the tree (expanded folders only)
  select PATH            select an entry
  unselect               clear the selection
  expand PATH            expand a folder
  collapse PATH          collapse a folder
  mkdir                  create a folder at the selection
  import FILE...         import PDF files at the selection
  rename PATH NAME       rename an entry
  mv SOURCE TARGET       drag SOURCE and drop it on TARGET
  rm PATH                delete an entry (asks first)
  reload                 rescan the vault from disk
  help                   show this help
  quit                   leave the shell";

/// Split a shell line into words; double quotes group words with spaces.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}

/// Interactive session state.
struct Shell {
    selection: Option<Selection>,
    gesture: DragGesture,
}

impl Shell {
    fn new(config: &VaultConfig) -> Self {
        Self {
            selection: None,
            gesture: DragGesture::new(config.drag_threshold),
        }
    }

    /// Drop the selection if its entry no longer exists.
    fn refresh_selection<P: StorageProvider>(&mut self, sync: &VaultTreeSync<P>) {
        if let Some(selection) = &self.selection {
            if !sync.tree().exists(selection.path()) {
                self.selection = None;
            }
        }
    }

    /// Replay a drag from `source` to `target` through the gesture tracker.
    fn drag<P: StorageProvider>(
        &mut self,
        sync: &mut VaultTreeSync<P>,
        source: &Path,
        target: &Path,
    ) -> Result<()> {
        let threshold = self.gesture.threshold();
        self.gesture.press(source, Point::new(0.0, 0.0));
        self.gesture.motion(Point::new(threshold + 1.0, 0.0));

        let target_is_dir = sync.tree().find_node(target).is_some_and(|n| n.is_directory());
        if target_is_dir && self.gesture.hover(target, true) == DropEffect::None {
            self.gesture.cancel();
            println!("Cannot drop here.");
            return Ok(());
        }

        match self.gesture.drop_on(target) {
            Some(request) => cmd_move(sync, &request.source, &request.target),
            None => {
                println!("Nothing to move.");
                Ok(())
            }
        }
    }

    /// Run one command line. Returns false when the session should end.
    fn execute<P: StorageProvider>(
        &mut self,
        sync: &mut VaultTreeSync<P>,
        words: &[String],
    ) -> Result<bool> {
        let Some((command, args)) = words.split_first() else {
            return Ok(true);
        };
        let root = sync.root_path().to_path_buf();
        let arg = |i: usize| -> Result<PathBuf> {
            args.get(i)
                .map(|a| root.join(a))
                .with_context(|| format!("'{}' needs more arguments (see help)", command))
        };

        match command.as_str() {
            "ls" => {
                let selected = self.selection.as_ref().map(|s| s.path());
                print_node(sync.tree().root(), 0, false, selected);
            }
            "select" => {
                let path = arg(0)?;
                let selection = sync
                    .select(&path)
                    .with_context(|| format!("No such entry: {}", path.display()))?;
                self.selection = Some(selection);
            }
            "unselect" => self.selection = None,
            "expand" | "collapse" => {
                let path = arg(0)?;
                sync.set_expanded(&path, command == "expand")
                    .with_context(|| format!("Cannot {} {}", command, path.display()))?;
            }
            "mkdir" => {
                let path = sync
                    .create_folder(self.selection.as_ref())
                    .context("Failed to create folder")?;
                println!("Folder created: {}", display_path(sync, &path));
            }
            "import" => {
                let files: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
                if files.is_empty() {
                    anyhow::bail!("'import' needs at least one file");
                }
                let report = sync
                    .import_files(self.selection.as_ref(), &files)
                    .context("Failed to import files")?;
                print_import_report(sync, &report);
            }
            "rename" => {
                let path = arg(0)?;
                let name = args.get(1).map(String::as_str).unwrap_or("");
                cmd_rename(sync, &path, name)?;
            }
            "mv" => {
                let (source, target) = (arg(0)?, arg(1)?);
                self.drag(sync, &source, &target)?;
            }
            "rm" => {
                let path = arg(0)?;
                cmd_remove(sync, &path, false)?;
            }
            "reload" => {
                for warning in sync.reload().context("Failed to rescan vault")? {
                    eprintln!("warning: {}", warning);
                }
            }
            "help" => println!("{}", SHELL_HELP),
            "quit" | "exit" => return Ok(false),
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }

        self.refresh_selection(sync);
        Ok(true)
    }
}

/// Interactive session.
fn cmd_shell<P: StorageProvider>(sync: &mut VaultTreeSync<P>, config: &VaultConfig) -> Result<()> {
    info!("Starting shell on {}", sync.root_path().display());
    println!("Vault: {}", sync.root_path().display());
    println!("Type 'help' for commands.");

    let mut shell = Shell::new(config);
    let stdin = io::stdin();
    loop {
        print!("pdfvault> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        let words = split_words(&line);
        match shell.execute(sync, &words) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfvault_storage::LocalProvider;
    use std::fs;
    use tempfile::TempDir;

    fn open(temp: &TempDir) -> VaultTreeSync<LocalProvider> {
        VaultTreeSync::open(&VaultConfig::with_root(temp.path())).unwrap()
    }

    fn words(line: &str) -> Vec<String> {
        split_words(line)
    }

    #[test]
    fn test_split_words_quotes() {
        assert_eq!(words("rename a.pdf b.pdf"), vec!["rename", "a.pdf", "b.pdf"]);
        assert_eq!(
            words("rename \"New Folder\" \"Tax Returns\""),
            vec!["rename", "New Folder", "Tax Returns"]
        );
        assert_eq!(words("rename x \"\""), vec!["rename", "x", ""]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_resolve_relative_to_root() {
        let temp = TempDir::new().unwrap();
        let sync = open(&temp);

        assert_eq!(resolve(&sync, Path::new("A/b.pdf")), temp.path().join("A/b.pdf"));
        assert_eq!(resolve(&sync, Path::new("/abs")), PathBuf::from("/abs"));
        assert_eq!(display_path(&sync, temp.path()), "/");
        assert_eq!(display_path(&sync, &temp.path().join("A")), "A");
    }

    #[test]
    fn test_shell_selection_drives_mkdir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();
        let mut sync = open(&temp);
        let mut shell = Shell::new(&VaultConfig::with_root(temp.path()));

        assert!(shell.execute(&mut sync, &words("select A")).unwrap());
        shell.execute(&mut sync, &words("mkdir")).unwrap();
        assert!(temp.path().join("A/New Folder").is_dir());

        shell.execute(&mut sync, &words("unselect")).unwrap();
        shell.execute(&mut sync, &words("mkdir")).unwrap();
        assert!(temp.path().join("New Folder").is_dir());
    }

    #[test]
    fn test_shell_mv_goes_through_gesture() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Y")).unwrap();
        fs::write(temp.path().join("x.pdf"), b"x").unwrap();
        let mut sync = open(&temp);
        let mut shell = Shell::new(&VaultConfig::with_root(temp.path()));

        shell.execute(&mut sync, &words("mv x.pdf Y")).unwrap();
        assert!(temp.path().join("Y/x.pdf").exists());

        // dropping a folder on itself does nothing
        shell.execute(&mut sync, &words("mv Y Y")).unwrap();
        assert!(temp.path().join("Y").is_dir());
    }

    #[test]
    fn test_shell_selection_cleared_after_delete() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("x.pdf"), b"x").unwrap();
        let mut sync = open(&temp);
        let mut shell = Shell::new(&VaultConfig::with_root(temp.path()));

        shell.execute(&mut sync, &words("select x.pdf")).unwrap();
        sync.delete(&temp.path().join("x.pdf")).unwrap();
        shell.execute(&mut sync, &words("ls")).unwrap();
        assert!(shell.selection.is_none());
    }

    #[test]
    fn test_shell_quit_and_unknown() {
        let temp = TempDir::new().unwrap();
        let mut sync = open(&temp);
        let mut shell = Shell::new(&VaultConfig::with_root(temp.path()));

        assert!(shell.execute(&mut sync, &words("frobnicate")).unwrap());
        assert!(!shell.execute(&mut sync, &words("quit")).unwrap());
        assert!(shell.execute(&mut sync, &words("select")).is_err());
    }

    #[test]
    fn test_load_config_vault_override() {
        let temp = TempDir::new().unwrap();
        let config = load_config(None, Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.root, temp.path());
        assert_eq!(config.folder_template, "New Folder");
    }
}
