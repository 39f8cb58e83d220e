use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf};
use todos::ui::{run_app, App};
use todos::{logging, Category, Config, FileStore, TaskId, TodoList, TodoStorage};
use tracing::info;

#[derive(Parser)]
#[command(name = "todos")]
#[command(version)]
#[command(about = "Work and Travel to-do lists in the terminal", long_about = None)]
struct Cli {
    /// Directory holding the stored to-dos and the log file
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive screen (default)
    Tui,
    /// Print the tasks of one list, or both
    List {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Add a task and print its id
    Add {
        category: Category,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a task as done
    Done {
        id: TaskId,
        /// Clear the mark instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Rm {
        id: TaskId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref()).context("failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    let data_dir = config.data_dir()?;
    logging::init(&config.log_level, &data_dir)?;
    info!("using data directory {}", data_dir.display());

    let storage = TodoStorage::new(FileStore::new(&data_dir));
    let mut todos = TodoList::load(storage, config.default_category)
        .with_context(|| format!("failed to load to-dos from {}", data_dir.display()))?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(todos)?,
        Commands::List { category } => {
            for (id, task) in todos.collection() {
                if category.is_some_and(|c| c != task.category) {
                    continue;
                }
                let mark = if task.checked { "x" } else { " " };
                println!("[{mark}] {id} {} ({})", task.text, task.category);
            }
        }
        Commands::Add { category, text } => match todos.add(&text.join(" "), category)? {
            Some(id) => println!("{id}"),
            None => bail!("task text must not be empty"),
        },
        Commands::Done { id, undo } => {
            if !todos.set_checked(id, !undo)? {
                bail!(todos::TodoError::UnknownTask(id));
            }
        }
        Commands::Rm { id, yes } => {
            if !yes {
                bail!("refusing to delete {id} without --yes");
            }
            if todos.remove(id)?.is_none() {
                bail!(todos::TodoError::UnknownTask(id));
            }
        }
    }
    Ok(())
}

fn run_tui(todos: TodoList<FileStore>) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(todos);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("terminal error")
}
