//! Argument model, logging setup, and command dispatch.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Instrument, info_span};
use tyrone_logging::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tyrone_redfish::config::DEFAULT_PORT;
use tyrone_redfish::{BootMode, BootOverrideEnabled, InvalidValue, TelemetryCategory};
use uuid::Uuid;

use crate::client::{AppContext, CliResult, interruptible, shutdown_signal};
use crate::commands::led::handle_led;
use crate::commands::power::handle_power;
use crate::commands::pxe::handle_pxe;
use crate::commands::storage::handle_storage;
use crate::commands::telemetry::handle_telemetry;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return i32::from(err.use_stderr());
        }
    };

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!("command", command = command_label(&cli.command), %trace_id);
    match dispatch(cli, &trace_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let format = cli.output;
    let timeout = cli.timeout;
    match cli.command {
        Command::Power(args) => {
            let ctx = AppContext::connect(&args.connection, timeout, trace_id)?;
            interruptible(handle_power(&ctx, &args.action, format)).await
        }
        Command::Led(args) => {
            let ctx = AppContext::connect(&args.connection, timeout, trace_id)?;
            interruptible(handle_led(&ctx, &args.action, format)).await
        }
        Command::Storage(args) => {
            let ctx = AppContext::connect(&args.connection, timeout, trace_id)?;
            interruptible(handle_storage(&ctx, &args, format)).await
        }
        Command::Telemetry(args) => {
            let ctx = AppContext::connect(&args.connection, timeout, trace_id)?;
            handle_telemetry(&ctx, &args, format, shutdown_signal()).await
        }
        Command::Pxe(args) => {
            let ctx = AppContext::connect(&args.connection, timeout, trace_id)?;
            interruptible(handle_pxe(&ctx, &args, format)).await
        }
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Power(_) => "power",
        Command::Led(_) => "led",
        Command::Storage(_) => "storage",
        Command::Telemetry(_) => "telemetry",
        Command::Pxe(_) => "pxe",
    }
}

#[derive(Parser)]
#[command(
    name = "tyrone-redfish",
    version,
    about = "Manage servers through their BMC's Redfish API"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "TYRONE_REDFISH_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "HTTP request timeout in seconds"
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Select output format"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "TYRONE_REDFISH_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter directive (RUST_LOG takes precedence)"
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        value_parser = parse_log_format,
        default_value = "pretty",
        help = "Log output format: pretty or json"
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Read or change the system power state.
    Power(PowerArgs),
    /// Read or change the chassis indicator LED.
    Led(LedArgs),
    /// Inspect storage controllers, drives, and volumes.
    Storage(StorageArgs),
    /// Collect sensor and inventory telemetry.
    Telemetry(TelemetryArgs),
    /// Configure PXE and other boot source overrides.
    Pxe(PxeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ConnectionArgs {
    #[arg(short = 'H', long, env = "TYRONE_REDFISH_HOST", help = "BMC hostname or IP address")]
    pub(crate) host: String,
    #[arg(short = 'u', long, env = "TYRONE_REDFISH_USERNAME")]
    pub(crate) username: String,
    #[arg(
        short = 'p',
        long,
        env = "TYRONE_REDFISH_PASSWORD",
        hide_env_values = true,
        help = "Prompted for when omitted on a terminal"
    )]
    pub(crate) password: Option<String>,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    #[arg(long, help = "Verify the BMC's TLS certificate")]
    pub(crate) verify_ssl: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PowerArgs {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(flatten)]
    pub(crate) action: PowerAction,
}

#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub(crate) struct PowerAction {
    #[arg(long, help = "Print the current power state")]
    pub(crate) get_state: bool,
    #[arg(long, value_name = "ACTION", help = "Issue a reset action, e.g. On or ForceOff")]
    pub(crate) set_state: Option<String>,
    #[arg(long, help = "List the reset actions the BMC accepts")]
    pub(crate) get_actions: bool,
}

#[derive(Args, Debug)]
pub(crate) struct LedArgs {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(flatten)]
    pub(crate) action: LedAction,
}

#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub(crate) struct LedAction {
    #[arg(long, help = "Print the current LED state")]
    pub(crate) get_state: bool,
    #[arg(long, value_name = "STATE", help = "Set the LED to Off, Lit, or Blinking")]
    pub(crate) set_state: Option<String>,
    #[arg(long, help = "List the LED states the BMC accepts")]
    pub(crate) get_states: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StorageArgs {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(flatten)]
    pub(crate) view: StorageView,
    #[command(flatten)]
    pub(crate) export: ExportArgs,
}

#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub(crate) struct StorageView {
    #[arg(long, help = "Counts by media type, protocol, and RAID level")]
    pub(crate) summary: bool,
    #[arg(long)]
    pub(crate) controllers: bool,
    #[arg(long)]
    pub(crate) drives: bool,
    #[arg(long)]
    pub(crate) volumes: bool,
    #[arg(long, value_name = "ID")]
    pub(crate) drive_id: Option<String>,
    #[arg(long, value_name = "ID")]
    pub(crate) volume_id: Option<String>,
    #[arg(long, help = "Controllers and drives in one listing")]
    pub(crate) get_inventory: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    #[arg(long, value_name = "FILE", help = "Also write the result as JSON")]
    pub(crate) export_json: Option<PathBuf>,
    #[arg(long, value_name = "FILE", help = "Also write the result as flattened CSV")]
    pub(crate) export_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct TelemetryArgs {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(flatten)]
    pub(crate) selection: TelemetrySelection,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Sample repeatedly with this pause between samples"
    )]
    pub(crate) continuous: Option<u64>,
    #[arg(long, requires = "continuous", help = "Stop after this many samples")]
    pub(crate) count: Option<u64>,
    #[command(flatten)]
    pub(crate) export: ExportArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TelemetrySelection {
    #[arg(long, help = "Every category (the default)")]
    pub(crate) all: bool,
    #[arg(long)]
    pub(crate) system: bool,
    #[arg(long)]
    pub(crate) thermal: bool,
    #[arg(long)]
    pub(crate) power: bool,
    #[arg(long)]
    pub(crate) processor: bool,
    #[arg(long)]
    pub(crate) memory: bool,
    #[arg(long)]
    pub(crate) network: bool,
    #[arg(long)]
    pub(crate) storage: bool,
}

impl TelemetrySelection {
    /// Selected categories in collection order; none selected means all.
    pub(crate) fn categories(&self) -> Vec<TelemetryCategory> {
        let picked: Vec<TelemetryCategory> = [
            (self.system, TelemetryCategory::System),
            (self.thermal, TelemetryCategory::Thermal),
            (self.power, TelemetryCategory::Power),
            (self.processor, TelemetryCategory::Processor),
            (self.memory, TelemetryCategory::Memory),
            (self.network, TelemetryCategory::Network),
            (self.storage, TelemetryCategory::Storage),
        ]
        .into_iter()
        .filter_map(|(selected, category)| selected.then_some(category))
        .collect();

        if self.all || picked.is_empty() {
            TelemetryCategory::ALL.to_vec()
        } else {
            picked
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct PxeArgs {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(flatten)]
    pub(crate) action: PxeAction,
    #[arg(
        long,
        value_parser = parse_boot_mode,
        default_value = "UEFI",
        help = "Boot mode: Legacy or UEFI"
    )]
    pub(crate) boot_mode: BootMode,
    #[arg(
        long,
        value_parser = parse_boot_enabled,
        default_value = "Once",
        help = "Override persistence for --set-boot-target: Disabled, Once, or Continuous"
    )]
    pub(crate) boot_enabled: BootOverrideEnabled,
}

#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub(crate) struct PxeAction {
    #[arg(long, help = "Print the current boot override settings")]
    pub(crate) get_boot_info: bool,
    #[arg(long, help = "PXE boot on the next restart only")]
    pub(crate) pxe_once: bool,
    #[arg(long, help = "PXE boot on every restart")]
    pub(crate) pxe_continuous: bool,
    #[arg(long, help = "Clear any boot source override")]
    pub(crate) disable_override: bool,
    #[arg(long, help = "List the boot targets the BMC accepts")]
    pub(crate) get_boot_targets: bool,
    #[arg(long, value_name = "TARGET", help = "Override the boot target, e.g. Hdd or Cd")]
    pub(crate) set_boot_target: Option<String>,
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    LogFormat::from_str(input)
}

fn parse_boot_mode(input: &str) -> Result<BootMode, InvalidValue> {
    input.parse()
}

fn parse_boot_enabled(input: &str) -> Result<BootOverrideEnabled, InvalidValue> {
    input.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const CONNECTION: [&str; 5] = ["-H", "10.0.0.5", "-u", "admin", "-p"];

    fn parse(command: &str, extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["tyrone-redfish", command];
        argv.extend(CONNECTION);
        argv.push("pw");
        argv.extend(extra);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn defaults_match_documented_values() -> Result<(), clap::Error> {
        let cli = parse("power", &["--get-state"])?;
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        let Command::Power(args) = cli.command else {
            panic!("expected power command");
        };
        assert_eq!(args.connection.port, 443);
        assert!(!args.connection.verify_ssl);
        assert!(args.action.get_state);
        Ok(())
    }

    #[test]
    fn action_selectors_are_mutually_exclusive() {
        let err = parse("led", &["--get-state", "--set-state", "Lit"]).err();
        assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::ArgumentConflict));
    }

    #[test]
    fn an_action_selector_is_required() {
        let err = parse("pxe", &[]).err();
        assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::MissingRequiredArgument));
    }

    #[test]
    fn format_alias_and_boot_options_parse() -> Result<(), clap::Error> {
        let cli = parse(
            "pxe",
            &[
                "--set-boot-target",
                "Hdd",
                "--boot-mode",
                "Legacy",
                "--boot-enabled",
                "Continuous",
                "--format",
                "json",
            ],
        )?;
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Pxe(args) = cli.command else {
            panic!("expected pxe command");
        };
        assert_eq!(args.boot_mode, BootMode::Legacy);
        assert_eq!(args.boot_enabled, BootOverrideEnabled::Continuous);
        assert_eq!(args.action.set_boot_target.as_deref(), Some("Hdd"));
        Ok(())
    }

    #[test]
    fn unknown_boot_mode_is_rejected() {
        assert!(parse("pxe", &["--pxe-once", "--boot-mode", "uefi"]).is_err());
    }

    #[test]
    fn count_requires_continuous() {
        let err = parse("telemetry", &["--count", "3"]).err();
        assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::MissingRequiredArgument));
        assert!(parse("telemetry", &["--continuous", "0"]).is_err());
    }

    #[test]
    fn telemetry_categories_default_to_all_and_combine_in_order() -> Result<(), clap::Error> {
        let Command::Telemetry(args) = parse("telemetry", &[])?.command else {
            panic!("expected telemetry command");
        };
        assert_eq!(args.selection.categories(), TelemetryCategory::ALL.to_vec());

        let Command::Telemetry(args) = parse("telemetry", &["--storage", "--thermal"])?.command
        else {
            panic!("expected telemetry command");
        };
        assert_eq!(
            args.selection.categories(),
            vec![TelemetryCategory::Thermal, TelemetryCategory::Storage]
        );
        Ok(())
    }

    #[test]
    fn command_label_matches_variants() -> Result<(), clap::Error> {
        assert_eq!(command_label(&parse("storage", &["--summary"])?.command), "storage");
        assert_eq!(command_label(&parse("telemetry", &[])?.command), "telemetry");
        Ok(())
    }
}
