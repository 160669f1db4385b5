pub mod simulator;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "dineline",
    about = "DineLine terminal order simulator",
    long_about = "Drive the DineLine ordering agent from a terminal: type what a caller would \
                  say, watch the cart and total evolve, and exercise human handoff without a \
                  phone line.",
    after_help = "Examples:\n  dineline\n  dineline --menu menus/lunch.toml\n  dineline --model gpt-4o"
)]
pub struct Cli {
    #[arg(long, help = "Path to a dineline.toml config file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Path to a menu TOML file (defaults to the built-in demo menu)")]
    pub menu: Option<PathBuf>,
    #[arg(long, help = "Chat model override")]
    pub model: Option<String>,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    match simulator::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_menu_and_model_flags() {
        let cli = Cli::try_parse_from(["dineline", "--menu", "lunch.toml", "--model", "gpt-4o"])
            .expect("flags parse");

        assert_eq!(cli.menu.as_deref().map(|p| p.to_str()), Some(Some("lunch.toml")));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["dineline", "--verbose"]).is_err());
    }
}
