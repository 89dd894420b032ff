use std::io::Write;
use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use indoc::indoc;
use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;
use thiserror::Error;

use graph_search::algorithms::and_or_dfs::AndOrSearch;
use graph_search::algorithms::and_or_dfs::Outcome;
use graph_search::algorithms::astar::AStarSearch;
use graph_search::algorithms::breadth_first::BreadthFirstSearch;
use graph_search::algorithms::depth_first::DepthFirstSearch;
use graph_search::algorithms::dijkstra::DijkstraSearch;
use graph_search::algorithms::limited_depth_first::IterativeDeepeningSearch;
use graph_search::algorithms::limited_depth_first::LimitedDepthFirstSearch;
use graph_search::algorithms::steppable_and_or_dfs::SteppableAndOrSearch;
use graph_search::error::SearchError;
use graph_search::graphs::maze_2d::Maze2D;
use graph_search::graphs::maze_2d::Maze2DEdge;
use graph_search::graphs::maze_2d::Maze2DNode;
use graph_search::graphs::maze_2d::Maze2DParseError;
use graph_search::graphs::maze_2d::Maze2DState;
use graph_search::graphs::maze_2d::diagonal_heuristic;
use graph_search::graphs::propositional::KnowledgeBase;
use graph_search::graphs::propositional::KnowledgeBaseParseError;
use graph_search::graphs::propositional::KnowledgeEdge;
use graph_search::graphs::propositional::KnowledgeNode;
use graph_search::search::ClassicSearch;
use graph_search::search::SteppableSearch;
use graph_search::space::Edge;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const BUILT_IN_MAZE: &str = indoc! {"
    S....#........
    .###.#.######.
    ...#.#......#.
    ##.#.######.#.
    ...#......#.#.
    .#######.##.#.
    .........#...G
"};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = graph_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Finds a path from S to G on a maze
    Maze {
        #[arg(short, long, value_enum, env = "SEARCH_ALGORITHM", default_value_t = Algorithm::Astar)]
        algorithm: Algorithm,

        /// Highest depth explored by the depth-limited searches
        #[arg(long, env = "SEARCH_DEPTH_LIMIT", default_value_t = 64usize)]
        depth_limit: usize,

        /// Text maze (`.` open, `#` wall, `S` start, `G` goal). Uses a
        /// built-in maze when missing.
        #[arg(long)]
        maze: Option<PathBuf>,
    },
    /// Proves a goal from a Horn-clause knowledge base
    Prove {
        knowledge_base: PathBuf,
        goal: String,

        /// Use the steppable and-or search instead of the recursive one
        #[arg(long)]
        steppable: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
    Astar,
    Limited,
    Iddfs,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("I/O error when loading '{p}': {e}")]
    Io { p: PathBuf, e: std::io::Error },
    #[error(transparent)]
    Report(#[from] std::io::Error),
    #[error("Invalid maze: {0}")]
    Maze(#[from] Maze2DParseError),
    #[error("Invalid knowledge base: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseParseError),
    #[error("Unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

fn read(p: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(p).map_err(|e| CliError::Io {
        p: p.to_path_buf(),
        e,
    })
}

/// The maze with the path drawn over it.
fn draw_path(maze: &Maze2D, path: &[Maze2DEdge]) -> String {
    let on_path: FxHashSet<Maze2DState> = path.iter().map(|e| e.to().state()).collect();
    let (max_x, max_y) = maze.dimensions();

    let mut drawing = String::new();
    for y in 0..max_y {
        for x in 0..max_x {
            let Some(state) = Maze2DState::new_from_usize(x, y) else {
                continue;
            };
            let ch = if state == maze.start().state() {
                'S'
            } else if state == maze.goal().state() {
                'G'
            } else if on_path.contains(&state) {
                '*'
            } else if maze.is_open(&state) {
                '.'
            } else {
                '#'
            };
            drawing.push(ch);
        }
        drawing.push('\n');
    }
    drawing
}

fn report_path<'m, S>(name: &str, maze: &'m Maze2D, search: &S) -> Result<(), CliError>
where
    S: ClassicSearch<Maze2DNode<'m>> + std::fmt::Debug,
{
    println!("{} {:?}", name.bold(), search);
    match search.path_to_target() {
        Some(path) => {
            let cost: u32 = path.iter().map(Maze2DEdge::cost).sum();
            println!(
                "{} with {} moves costing {}",
                "Found path".green(),
                path.len().yellow(),
                cost.yellow(),
            );
            println!("{}", draw_path(maze, &path));
        }
        None => println!("{}", "No path found".red()),
    }
    println!(
        "Visited {} nodes, settled {}",
        search.visited().len(),
        search.visited().settled_len()
    );
    Ok(())
}

fn solve_maze(algorithm: Algorithm, depth_limit: usize, maze: &Maze2D) -> Result<(), CliError> {
    println!("{maze}");
    let goal = maze.goal().state();
    let is_goal = |n: &Maze2DNode| n.state() == goal;

    match algorithm {
        Algorithm::Bfs => {
            let mut search = BreadthFirstSearch::new(maze.start(), is_goal);
            search.complete()?;
            report_path("BFS", maze, &search)?;
        }
        Algorithm::Dfs => {
            let mut search = DepthFirstSearch::new(maze.start(), is_goal);
            search.complete()?;
            report_path("DFS", maze, &search)?;
        }
        Algorithm::Dijkstra => {
            let mut search = DijkstraSearch::new(maze.start(), is_goal, |e: &Maze2DEdge| e.cost());
            search.complete()?;
            report_path("Dijkstra", maze, &search)?;
            search.write_memory_stats(std::io::stdout().lock())?;
        }
        Algorithm::Astar => {
            let mut search = AStarSearch::new(
                maze.start(),
                is_goal,
                |e: &Maze2DEdge| e.cost(),
                |n: &Maze2DNode| diagonal_heuristic(&n.state(), &goal),
            );
            search.complete()?;
            report_path("A*", maze, &search)?;
            search.write_memory_stats(std::io::stdout().lock())?;
        }
        Algorithm::Limited => {
            let mut search = LimitedDepthFirstSearch::new(maze.start(), is_goal, depth_limit);
            search.complete()?;
            report_path("Limited DFS", maze, &search)?;
            println!("Concluded as {}", search.state().cyan());
        }
        Algorithm::Iddfs => {
            let mut search =
                IterativeDeepeningSearch::with_depth_limits(maze.start(), is_goal, 0..=depth_limit)?;
            search.complete()?;
            report_path("Iterative deepening", maze, &search)?;
            println!(
                "Concluded as {} with limit {}",
                search.state().cyan(),
                search.depth_limit()
            );
        }
    }
    Ok(())
}

fn prove(kb: &KnowledgeBase, goal: &str, steppable: bool) -> Result<(), CliError> {
    let source = kb
        .symbol(goal)
        .ok_or_else(|| CliError::UnknownSymbol(goal.to_owned()))?;
    let is_truth = |n: &KnowledgeNode| n.is_truth();

    let outcome = if steppable {
        let mut search = SteppableAndOrSearch::new(source, is_truth, |e: &KnowledgeEdge| {
            e.is_conjunction()
        });
        search.complete()?;
        println!("{} visits", search.visits());
        search.into_outcome().unwrap_or(Outcome::Failure)
    } else {
        AndOrSearch::new(source, is_truth, |e: &KnowledgeEdge| e.is_conjunction()).execute()
    };

    match outcome.tree() {
        Some(tree) => {
            println!("{} {}", goal.bold(), "holds".green());
            let mut plan: Vec<_> = tree
                .flatten()
                .into_iter()
                .map(|(symbol, edge)| (symbol.to_string(), edge.to().to_string()))
                .collect();
            plan.sort();
            for (_symbol, clause) in plan {
                println!("  - {clause}");
            }
        }
        None => println!("{} {}", goal.bold(), "can't be proven".red()),
    }
    Ok(())
}

fn main() -> Result<(), CliError> {
    let args = Args::parse();
    args.color.write_global();

    match &args.command {
        Command::Maze {
            algorithm,
            depth_limit,
            maze,
        } => {
            let text = match maze {
                Some(p) => read(p)?,
                None => BUILT_IN_MAZE.to_owned(),
            };
            let maze = Maze2D::try_from(text.as_str())?;
            solve_maze(*algorithm, *depth_limit, &maze)?;
        }
        Command::Prove {
            knowledge_base,
            goal,
            steppable,
        } => {
            let kb = KnowledgeBase::try_from(read(knowledge_base)?.as_str())?;
            prove(&kb, goal, *steppable)?;
        }
    }

    std::io::stdout().flush()?;
    Ok(())
}
