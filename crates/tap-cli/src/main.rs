use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "taptool", about = "Tapword decoder diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a wordlist into a TPLX lexicon
    Build {
        /// Input wordlist (word<TAB>probability, plus optional
        /// bigram:next=prob / shortcut:target=prob / flag:... columns)
        wordlist: String,
        /// Output lexicon path
        output: String,
    },

    /// Print lexicon statistics
    Info {
        /// Compiled lexicon path
        lexicon: String,
    },

    /// Decode a typed string and print ranked suggestions
    Suggest {
        /// Compiled lexicon path
        lexicon: String,
        /// Characters to feed the decoder, in typing order
        typed: String,
        /// Previous word, for bigram context (optional)
        #[arg(long)]
        prev: Option<String>,
        /// Number of suggestions to print
        #[arg(short, long, default_value = "10")]
        n: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { wordlist, output } => commands::build::run(&wordlist, &output),
        Command::Info { lexicon } => commands::build::info(&lexicon),
        Command::Suggest {
            lexicon,
            typed,
            prev,
            n,
        } => commands::suggest::run(&lexicon, &typed, prev.as_deref(), n),
    };
    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}
