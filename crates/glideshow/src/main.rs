mod assets;
mod cli;
mod paths;
mod run;
mod settings;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Check) => run::check(&cli.run),
        Some(Command::List) => run::list(&cli.run),
        Some(Command::Shader { file }) => run::print_shader(&file),
        None => run::run(cli.run),
    }
}
