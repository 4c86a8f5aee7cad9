use anyhow::anyhow;
use serde::Serialize;
use tyrone_redfish::{IndicatorLed, LedControl};

use crate::cli::{LedAction, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::confirm;
use crate::output::{bullet_list, emit};

#[derive(Debug, Serialize)]
struct LedStateView {
    indicator_led: String,
}

pub(crate) async fn handle_led(
    ctx: &AppContext,
    action: &LedAction,
    format: OutputFormat,
) -> CliResult<()> {
    let requested = action
        .set_state
        .as_deref()
        .map(str::parse::<IndicatorLed>)
        .transpose()?;

    let led = LedControl::discover(&ctx.client).await?;

    if let Some(state) = requested {
        led.set(state).await?;
        return confirm(format, format!("LED state set to '{state}' successfully"));
    }

    if action.get_states {
        let states = led.allowable_states().await?;
        if states.is_empty() {
            return Err(CliError::failure(anyhow!(
                "the BMC does not advertise any LED states"
            )));
        }
        return emit(format, &states, |states| {
            bullet_list("Available LED states:", states)
        });
    }

    let view = LedStateView {
        indicator_led: led.state().await?,
    };
    emit(format, &view, |view| {
        format!("Current LED state: {}", view.indicator_led)
    })
}
