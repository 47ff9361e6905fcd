use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use scoreboard::client::{BoardDetailSource, DetailSource, HttpDetailSource};
use scoreboard::detail::{reason_views, FetchEvent};
use scoreboard::format::truncate_str;
use scoreboard::table::{SortKey, TableView};
use scoreboard::{logging, serve, tui, Board, Config, ScoreTable, UserChannels};

#[derive(Parser, Debug)]
#[command(name = "scoreboard")]
#[command(author, version, about = "Browse a channel's karma scoreboard and the reasons behind each score")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Board file to open in the TUI when no subcommand is given
    #[arg(long)]
    board: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive score table
    Tui {
        /// Board file (channel + targets JSON)
        #[arg(long)]
        board: PathBuf,

        /// Detail server base URL (overrides config)
        #[arg(long)]
        base_url: Option<String>,

        /// Serve details from the board file instead of the network
        #[arg(long)]
        fixture: bool,
    },

    /// Print the table after applying header clicks in order
    Print {
        /// Board file (channel + targets JSON)
        #[arg(long)]
        board: PathBuf,

        /// Header click; repeat to click again
        #[arg(long = "sort", value_enum)]
        sorts: Vec<SortColumn>,

        /// Expand a target and print its reasons (repeatable)
        #[arg(long)]
        expand: Vec<String>,

        /// Fetch details from this server instead of the board file
        #[arg(long)]
        base_url: Option<String>,

        /// Show the full reason text instead of the short form
        #[arg(long)]
        full: bool,
    },

    /// Render a channel list response
    Channels {
        /// Channel list JSON file
        #[arg(long)]
        file: PathBuf,
    },

    /// Serve a board's details over HTTP
    Serve {
        /// Board file with a `details` map
        #[arg(long)]
        board: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortColumn {
    Name,
    Score,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::Score => SortKey::Score,
        }
    }
}

fn main() {
    let args = Args::parse();
    let config = Config::load();

    let command = match (args.command, args.board) {
        (Some(command), _) => command,
        (None, Some(board)) => Command::Tui {
            board,
            base_url: None,
            fixture: false,
        },
        (None, None) => {
            let _ = Args::command().print_help();
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::Tui {
            board,
            base_url,
            fixture,
        } => run_tui(&config, &board, base_url, fixture),
        Command::Print {
            board,
            sorts,
            expand,
            base_url,
            full,
        } => {
            logging::init_stderr(&config.log.level);
            run_print(&config, &board, &sorts, &expand, base_url, full)
        }
        Command::Channels { file } => {
            logging::init_stderr(&config.log.level);
            run_channels(&file)
        }
        Command::Serve { board, port } => {
            logging::init_stderr(&config.log.level);
            Board::load(&board).and_then(|b| serve::start_board_server(port, b))
        }
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "scoreboard", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn detail_source(
    config: &Config,
    board: &Board,
    base_url: Option<String>,
    fixture: bool,
) -> scoreboard::Result<(Arc<dyn DetailSource>, String)> {
    if fixture {
        return Ok((
            Arc::new(BoardDetailSource::new(board.clone())),
            "fixture".to_string(),
        ));
    }
    let base_url = base_url.unwrap_or_else(|| config.server.base_url.clone());
    let source = HttpDetailSource::new(base_url.clone(), config.server.timeout_ms)?;
    Ok((Arc::new(source), base_url))
}

fn run_tui(
    config: &Config,
    board_path: &Path,
    base_url: Option<String>,
    fixture: bool,
) -> scoreboard::Result<()> {
    let log_file = config.log_file();
    logging::init_file(&config.log.level, &log_file)?;

    let board = Board::load(board_path)?;
    let (source, label) = detail_source(config, &board, base_url, fixture)?;
    log::info!(
        "opening #{} ({} targets), details from {}",
        board.channel,
        board.targets.len(),
        label
    );

    let table = ScoreTable::new(board.channel.clone(), board.targets());
    tui::run(table, source, &label)
}

fn run_print(
    config: &Config,
    board_path: &Path,
    sorts: &[SortColumn],
    expand: &[String],
    base_url: Option<String>,
    full: bool,
) -> scoreboard::Result<()> {
    let board = Board::load(board_path)?;
    let fixture = base_url.is_none();
    let (source, _) = detail_source(config, &board, base_url, fixture)?;

    let mut table = ScoreTable::new(board.channel.clone(), board.targets());
    for &column in sorts {
        table.sort_by(column.into());
    }

    if !expand.is_empty() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        // A second click on the same row would collapse it again
        let mut seen = HashSet::new();
        for name in expand.iter().filter(|name| seen.insert(name.as_str())) {
            match table.expand_target(name) {
                Some(request) => {
                    let result = runtime.block_on(source.fetch_detail(&request.key));
                    table.complete(FetchEvent {
                        key: request.key,
                        result,
                    });
                }
                None => log::warn!("no target named {}", name),
            }
        }
    }

    print_table(table.view(), full);
    Ok(())
}

fn print_table(view: &TableView, full: bool) {
    const NAME_WIDTH: usize = 24;

    println!("{}", format!("#{}", view.channel).bold());
    println!(
        "{}",
        format!(
            "{:<width$} {:>8}",
            view.headers.name,
            view.headers.score,
            width = NAME_WIDTH
        )
        .yellow()
    );

    for row in &view.rows {
        let score = format!("{:>8}", row.score);
        let score = if row.score > 0 {
            score.green()
        } else if row.score < 0 {
            score.red()
        } else {
            score.normal()
        };
        println!(
            "{:<width$} {}",
            truncate_str(&row.name, NAME_WIDTH),
            score,
            width = NAME_WIDTH
        );

        if !row.entry.open {
            continue;
        }
        if let Some(error) = failure(&row.entry.state) {
            println!("    {} {}", "✗".red(), error);
            continue;
        }
        let Some(detail) = row.entry.state.detail() else {
            continue;
        };
        if let Some(ref graph) = detail.graph_image_url {
            println!("    {} {}", "graph".dimmed(), graph.cyan());
        }
        if let Some(ref notice) = detail.notice {
            println!("    {}", notice.yellow());
        }
        for reason in reason_views(detail) {
            let badge = if reason.action.is_plus_plus() {
                reason.action.as_str().green().bold()
            } else {
                reason.action.as_str().red().bold()
            };
            let text = if full {
                Some(reason.full_text.clone())
            } else {
                reason.short_text.clone()
            };
            match text {
                Some(text) => println!(
                    "    {}'ed by {} {} on {}",
                    badge, reason.sender, text, reason.date
                ),
                None => println!("    {}'ed by {} on {}", badge, reason.sender, reason.date),
            }
        }
    }
}

fn failure(state: &scoreboard::ExpansionState) -> Option<&str> {
    match state {
        scoreboard::ExpansionState::Failed(message) => Some(message),
        _ => None,
    }
}

fn run_channels(file: &Path) -> scoreboard::Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let channels = UserChannels::from_json(&contents)?;
    for line in channels.render_lines() {
        println!("{}", line);
    }
    Ok(())
}
