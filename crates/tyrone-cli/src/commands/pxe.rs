use anyhow::anyhow;
use tyrone_redfish::BootControl;

use crate::cli::{OutputFormat, PxeArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::confirm;
use crate::output::{boot_info_text, bullet_list, emit};

pub(crate) async fn handle_pxe(
    ctx: &AppContext,
    args: &PxeArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let action = &args.action;
    let target = match action.set_boot_target.as_deref().map(str::trim) {
        Some("") => return Err(CliError::validation("boot target cannot be empty")),
        other => other,
    };

    let boot = BootControl::discover(&ctx.client).await?;

    if action.get_boot_info {
        let info = boot.boot_info().await?;
        return emit(format, &info, boot_info_text);
    }

    if action.pxe_once {
        boot.pxe_once(args.boot_mode).await?;
        return confirm(
            format,
            format!("PXE boot configured for next restart (Mode: {})", args.boot_mode),
        );
    }

    if action.pxe_continuous {
        boot.pxe_continuous(args.boot_mode).await?;
        return confirm(
            format,
            format!("PXE boot configured for continuous mode (Mode: {})", args.boot_mode),
        );
    }

    if action.disable_override {
        boot.disable_override().await?;
        return confirm(format, "Boot override disabled".to_string());
    }

    if let Some(target) = target {
        boot.set_boot_target(target, args.boot_enabled, args.boot_mode)
            .await?;
        return confirm(
            format,
            format!(
                "Boot target set to '{target}' ({}, Mode: {})",
                args.boot_enabled, args.boot_mode
            ),
        );
    }

    let targets = boot.allowable_targets().await?;
    if targets.is_empty() {
        return Err(CliError::failure(anyhow!(
            "the BMC does not advertise any boot targets"
        )));
    }
    emit(format, &targets, |targets| {
        bullet_list("Available boot targets:", targets)
    })
}
