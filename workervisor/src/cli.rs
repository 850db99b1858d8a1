use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "workervisor")]
#[command(about = "Manage the Supervisor programs consuming Messenger transports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./workervisor.json or ./config/workervisor.json)
    #[arg(short, long, env = "WORKERVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// start|stop|status
    pub action: String,

    /// Program(s) name(s) or "all"
    #[arg(required = true, num_args = 1..)]
    pub programs: Vec<String>,

    /// Suitable for using as a nagios NRPE command
    #[arg(long)]
    pub nagios: bool,
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
    fn test_parse_status_nagios() {
        let cli = Cli::try_parse_from(["workervisor", "status", "program1", "program2", "--nagios"])
            .unwrap();
        assert_eq!(cli.action, "status");
        assert_eq!(cli.programs, vec!["program1", "program2"]);
        assert!(cli.nagios);
    }

    #[test]
    fn test_parse_config_path() {
        let cli =
            Cli::try_parse_from(["workervisor", "-c", "/etc/workervisor.json", "start", "all"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/workervisor.json")));
        assert!(!cli.nagios);
    }

    #[test]
    fn test_programs_required() {
        assert!(Cli::try_parse_from(["workervisor", "start"]).is_err());
    }

    #[test]
    fn test_action_is_free_form() {
        let cli = Cli::try_parse_from(["workervisor", "restart", "all"]).unwrap();
        assert_eq!(cli.action, "restart");
    }
}
