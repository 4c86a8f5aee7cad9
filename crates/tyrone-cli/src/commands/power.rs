use anyhow::anyhow;
use serde::Serialize;
use tyrone_redfish::{PowerControl, ResetType};

use crate::cli::{OutputFormat, PowerAction};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::confirm;
use crate::output::{bullet_list, emit};

#[derive(Debug, Serialize)]
struct PowerStateView {
    power_state: String,
}

pub(crate) async fn handle_power(
    ctx: &AppContext,
    action: &PowerAction,
    format: OutputFormat,
) -> CliResult<()> {
    // Reject unknown actions before touching the network.
    let reset = action
        .set_state
        .as_deref()
        .map(str::parse::<ResetType>)
        .transpose()?;

    let power = PowerControl::discover(&ctx.client).await?;

    if let Some(reset) = reset {
        power.reset(reset).await?;
        return confirm(format, format!("Power action '{reset}' executed successfully"));
    }

    if action.get_actions {
        let actions = power.allowable_actions().await?;
        if actions.is_empty() {
            return Err(CliError::failure(anyhow!(
                "the BMC does not advertise any power actions"
            )));
        }
        return emit(format, &actions, |actions| {
            bullet_list("Available power actions:", actions)
        });
    }

    let view = PowerStateView {
        power_state: power.state().await?,
    };
    emit(format, &view, |view| {
        format!("Current power state: {}", view.power_state)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{SYSTEM_PATH, mock_context, mock_system};
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_state_reads_power_state() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_system(&server, json!({"PowerState": "On"}));

        let ctx = mock_context(&server)?;
        let action = PowerAction {
            get_state: true,
            ..PowerAction::default()
        };
        assert!(handle_power(&ctx, &action, OutputFormat::Json).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn set_state_posts_reset_to_advertised_target() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_system(
            &server,
            json!({"Actions": {"#ComputerSystem.Reset": {
                "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
            }}}),
        );
        let reset = server.mock(|when, then| {
            when.method(POST)
                .path(format!("{SYSTEM_PATH}/Actions/ComputerSystem.Reset"))
                .json_body(json!({"ResetType": "ForceRestart"}));
            then.status(204);
        });

        let ctx = mock_context(&server)?;
        let action = PowerAction {
            set_state: Some("ForceRestart".into()),
            ..PowerAction::default()
        };
        assert!(handle_power(&ctx, &action, OutputFormat::Text).await.is_ok());
        reset.assert();
        Ok(())
    }

    #[tokio::test]
    async fn invalid_action_fails_validation_without_requests() -> Result<()> {
        let server = MockServer::start_async().await;
        let any = server.mock(|_when, then| {
            then.status(200);
        });

        let ctx = mock_context(&server)?;
        let action = PowerAction {
            set_state: Some("Reboot".into()),
            ..PowerAction::default()
        };
        let result = handle_power(&ctx, &action, OutputFormat::Text).await;
        assert!(matches!(result, Err(CliError::Validation(_))));
        any.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_action_list_is_a_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_system(&server, json!({"Actions": {"#ComputerSystem.Reset": {}}}));

        let ctx = mock_context(&server)?;
        let action = PowerAction {
            get_actions: true,
            ..PowerAction::default()
        };
        let result = handle_power(&ctx, &action, OutputFormat::Text).await;
        assert!(matches!(result, Err(CliError::Failure(_))));
        Ok(())
    }
}
