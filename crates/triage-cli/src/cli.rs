//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crisis detection and questionnaire routing
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(about = "Crisis detection and PHQ-9/GAD-7 routing", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine configuration file (YAML, or JSON with a .json extension)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a message for crisis language
    Detect {
        /// Message text
        text: String,
    },

    /// Score answers and print the routing decision
    Route {
        /// PHQ-9 item scores, comma separated (e.g. "1,2,0,3")
        #[arg(long, default_value = "")]
        phq9: String,

        /// GAD-7 item scores, comma separated
        #[arg(long, default_value = "")]
        gad7: String,

        /// Age band reported by the user
        #[arg(long, default_value = "")]
        age_band: String,
    },

    /// Print the crisis message for a country
    CrisisResponse {
        #[arg(long, default_value = "tr")]
        country: String,

        /// Directory of {country}.json records (built-in records if unset)
        #[arg(long)]
        resources_dir: Option<PathBuf>,
    },

    /// List the prompts of an instrument
    Questions {
        /// phq9 or gad7
        instrument: String,
    },

    /// Print the resource record for a country
    Resources {
        #[arg(long, default_value = "tr")]
        country: String,

        #[arg(long)]
        resources_dir: Option<PathBuf>,
    },

    /// Run one intake message through the crisis check and mock responder
    Intake {
        text: String,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        resources_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_route_with_global_flags() {
        let cli = Cli::try_parse_from([
            "triage", "route", "--phq9", "1,2", "--gad7", "3", "--age-band", "under 18", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Route {
                phq9,
                gad7,
                age_band,
            } => {
                assert_eq!(phq9, "1,2");
                assert_eq!(gad7, "3");
                assert_eq!(age_band, "under 18");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_questions_requires_instrument() {
        assert!(Cli::try_parse_from(["triage", "questions"]).is_err());
    }
}
