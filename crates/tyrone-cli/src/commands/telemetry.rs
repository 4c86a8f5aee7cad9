use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Local;
use tracing::warn;
use tyrone_redfish::telemetry::{
    MonitorCycle, MonitorOutcome, MonitorPlan, TokioTicker, monitor,
};
use tyrone_redfish::{TelemetryCategory, TelemetryCollector};

use crate::cli::{ExportArgs, OutputFormat, TelemetryArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{emit, export, numbered_path, telemetry_text};

pub(crate) async fn handle_telemetry<I>(
    ctx: &AppContext,
    args: &TelemetryArgs,
    format: OutputFormat,
    interrupt: I,
) -> CliResult<()>
where
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let collector = tokio::select! {
        biased;
        () = &mut interrupt => return Err(CliError::Cancelled),
        collector = TelemetryCollector::discover(&ctx.client) => collector?,
    };
    let categories = args.selection.categories();

    let Some(seconds) = args.continuous else {
        let samples = tokio::select! {
            biased;
            () = &mut interrupt => return Err(CliError::Cancelled),
            samples = collector.collect_selected(&categories) => samples,
        };
        if samples.is_empty() {
            return Err(CliError::failure(anyhow!("no telemetry data collected")));
        }
        emit(format, samples.as_slice(), telemetry_text)?;
        return export(
            format,
            args.export.export_json.as_deref(),
            args.export.export_csv.as_deref(),
            samples.as_slice(),
        );
    };

    let plan = MonitorPlan {
        interval: Duration::from_secs(seconds),
        count: args.count,
    };
    if format == OutputFormat::Text {
        println!("Starting continuous telemetry collection (interval: {seconds}s)");
        if let Some(count) = args.count {
            println!("Will collect {count} samples");
        }
    }

    let mut cycle = TelemetryCycle {
        collector: &collector,
        categories,
        format,
        export: &args.export,
    };
    match monitor(plan, &mut cycle, &mut TokioTicker, &mut interrupt).await? {
        MonitorOutcome::Completed { .. } => Ok(()),
        MonitorOutcome::Interrupted { samples } => {
            // stderr keeps JSON/CSV stdout parseable.
            eprintln!("\nMonitoring stopped. Collected {samples} samples.");
            Err(CliError::Interrupted { samples })
        }
    }
}

/// One continuous-mode sample: collect, print, export with a `_n` suffix.
struct TelemetryCycle<'a> {
    collector: &'a TelemetryCollector<'a>,
    categories: Vec<TelemetryCategory>,
    format: OutputFormat,
    export: &'a ExportArgs,
}

#[async_trait]
impl<'a> MonitorCycle for TelemetryCycle<'a> {
    type Error = CliError;

    async fn run_cycle(&mut self, sample: u64) -> CliResult<()> {
        let samples = self.collector.collect_selected(&self.categories).await;
        if samples.is_empty() {
            warn!(sample, "no telemetry collected this cycle");
            return Ok(());
        }

        if self.format == OutputFormat::Text {
            println!(
                "\n[{}] Sample {sample}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            );
        }
        emit(self.format, samples.as_slice(), telemetry_text)?;

        let json_path = self
            .export
            .export_json
            .as_deref()
            .map(|path| numbered_path(path, sample, "json"));
        let csv_path = self
            .export
            .export_csv
            .as_deref()
            .map(|path| numbered_path(path, sample, "csv"));
        export(
            self.format,
            json_path.as_deref(),
            csv_path.as_deref(),
            samples.as_slice(),
        )
    }
}
