use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Option<Subcommands>,
}

#[derive(clap::Subcommand)]
pub enum Subcommands {
    /// Run the perft test suite.
    Perft,
    /// Print a per-move perft breakdown of a position.
    Divide {
        /// The position, as a FEN string.
        fen: String,
        /// Leaf depth.
        #[clap(default_value = "4")]
        depth: usize,
    },
    /// Search a fixed set of positions and report nodes and speed.
    Bench,
}
