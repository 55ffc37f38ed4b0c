use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smallsh", version, about = "smallsh: a small interactive command interpreter")]
pub struct Cli {
    /// Configuration file (defaults to ./smallsh.toml, then $SMALLSH_CONFIG)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Prompt printed before each line of input
    #[arg(short = 'p', long = "prompt")]
    pub prompt: Option<String>,

    /// Disable colored diagnostics
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["smallsh", "-c", "sh.toml", "--prompt", "> ", "--no-color"]);
        assert_eq!(cli.config, Some(PathBuf::from("sh.toml")));
        assert_eq!(cli.prompt.as_deref(), Some("> "));
        assert!(cli.no_color);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["smallsh"]);
        assert!(cli.config.is_none());
        assert!(cli.prompt.is_none());
        assert!(!cli.no_color);
    }
}
