use anyhow::anyhow;
use serde::Serialize;
use tyrone_redfish::StorageInventory;
use tyrone_redfish::storage::{
    ControllerRecord, LocatedDrive, StorageSummary, find_drive, find_volume, located_drives,
    located_volumes,
};

use crate::cli::{ExportArgs, OutputFormat, StorageArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    controllers_text, drive_detail_text, drives_table, emit, export, inventory_text,
    storage_summary_text, volume_detail_text, volumes_table,
};

#[derive(Debug, Serialize)]
struct InventoryView<'a> {
    controllers: &'a [ControllerRecord],
    drives: &'a [LocatedDrive],
}

pub(crate) async fn handle_storage(
    ctx: &AppContext,
    args: &StorageArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let inventory = StorageInventory::discover(&ctx.client).await?;
    let controllers = inventory.controllers().await?;
    if controllers.is_empty() {
        return Err(CliError::failure(anyhow!("no storage controllers found")));
    }

    let view = &args.view;
    if view.summary {
        let summary = StorageSummary::from_controllers(&controllers);
        show(format, &args.export, &summary, storage_summary_text)
    } else if view.controllers {
        show(format, &args.export, controllers.as_slice(), controllers_text)
    } else if view.drives {
        let drives = located_drives(&controllers);
        if drives.is_empty() {
            return Err(CliError::failure(anyhow!("no drives found")));
        }
        show(format, &args.export, drives.as_slice(), drives_table)
    } else if view.volumes {
        let volumes = located_volumes(&controllers);
        if volumes.is_empty() {
            return Err(CliError::failure(anyhow!("no volumes found")));
        }
        show(format, &args.export, volumes.as_slice(), volumes_table)
    } else if let Some(id) = &view.drive_id {
        let drive = find_drive(&controllers, id)
            .ok_or_else(|| CliError::failure(anyhow!("drive '{id}' not found")))?;
        show(format, &args.export, &drive, drive_detail_text)
    } else if let Some(id) = &view.volume_id {
        let volume = find_volume(&controllers, id)
            .ok_or_else(|| CliError::failure(anyhow!("volume '{id}' not found")))?;
        show(format, &args.export, &volume, volume_detail_text)
    } else {
        let drives = located_drives(&controllers);
        let inventory = InventoryView {
            controllers: &controllers,
            drives: &drives,
        };
        // Flat exports carry one row per drive.
        if format == OutputFormat::Csv {
            emit(format, drives.as_slice(), drives_table)?;
        } else {
            emit(format, &inventory, |view| {
                inventory_text(view.controllers, view.drives)
            })?;
        }
        export(
            format,
            args.export.export_json.as_deref(),
            None,
            &inventory,
        )?;
        export(format, None, args.export.export_csv.as_deref(), drives.as_slice())
    }
}

fn show<T, F>(format: OutputFormat, exports: &ExportArgs, value: &T, text: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    emit(format, value, text)?;
    export(
        format,
        exports.export_json.as_deref(),
        exports.export_csv.as_deref(),
        value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConnectionArgs, StorageView};
    use crate::client::test_support::{SYSTEM_PATH, mock_context, mock_system};
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::{Value, json};
    use std::fs;

    const STORAGE_PATH: &str = "/redfish/v1/Systems/1/Storage";

    fn mock_storage(server: &MockServer) {
        mock_system(
            server,
            json!({"Storage": {"@odata.id": STORAGE_PATH}}),
        );
        server.mock(|when, then| {
            when.method(GET).path(STORAGE_PATH);
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Storage/RAID.1");
            then.status(200).json_body(json!({
                "Id": "RAID.1",
                "Name": "PERC H755",
                "Status": {"Health": "OK"},
                "Drives": [{"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Drives/0"}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Storage/RAID.1/Drives/0");
            then.status(200).json_body(json!({
                "Id": "0",
                "Model": "ST4000NM",
                "MediaType": "HDD",
                "Protocol": "SAS",
                "CapacityBytes": 4_000_787_030_016_u64,
                "Status": {"Health": "OK"}
            }));
        });
    }

    fn args(view: StorageView, export: ExportArgs) -> StorageArgs {
        StorageArgs {
            connection: ConnectionArgs {
                host: "127.0.0.1".into(),
                username: "root".into(),
                password: Some("secret".into()),
                port: 443,
                verify_ssl: false,
            },
            view,
            export,
        }
    }

    #[tokio::test]
    async fn drives_view_exports_located_drives() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_storage(&server);
        let dir = tempfile::tempdir()?;
        let json_path = dir.path().join("drives.json");

        let ctx = mock_context(&server)?;
        let storage = args(
            StorageView {
                drives: true,
                ..StorageView::default()
            },
            ExportArgs {
                export_json: Some(json_path.clone()),
                export_csv: None,
            },
        );
        handle_storage(&ctx, &storage, OutputFormat::Text).await?;

        let exported: Value = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
        assert_eq!(exported[0]["controller"], "PERC H755");
        assert_eq!(exported[0]["controller_id"], "RAID.1");
        assert_eq!(exported[0]["id"], "0");
        assert_eq!(exported[0]["capacity_gb"], 3726.02);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_drive_id_is_a_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_storage(&server);

        let ctx = mock_context(&server)?;
        let storage = args(
            StorageView {
                drive_id: Some("99".into()),
                ..StorageView::default()
            },
            ExportArgs::default(),
        );
        let result = handle_storage(&ctx, &storage, OutputFormat::Text).await;
        assert!(matches!(result, Err(CliError::Failure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn empty_volume_list_is_a_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_storage(&server);

        let ctx = mock_context(&server)?;
        let storage = args(
            StorageView {
                volumes: true,
                ..StorageView::default()
            },
            ExportArgs::default(),
        );
        let result = handle_storage(&ctx, &storage, OutputFormat::Json).await;
        assert!(matches!(result, Err(CliError::Failure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn inventory_csv_export_has_one_row_per_drive() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_storage(&server);
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("inventory.csv");

        let ctx = mock_context(&server)?;
        let storage = args(
            StorageView {
                get_inventory: true,
                ..StorageView::default()
            },
            ExportArgs {
                export_json: None,
                export_csv: Some(csv_path.clone()),
            },
        );
        handle_storage(&ctx, &storage, OutputFormat::Text).await?;

        let text = fs::read_to_string(&csv_path)?;
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap_or_default().split(',').collect();
        assert!(header.contains(&"controller_id"));
        assert!(header.contains(&"status_Health"));
        assert_eq!(lines.count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn system_without_storage_link_fails() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_system(&server, json!({"Id": "1"}));

        let ctx = mock_context(&server)?;
        let storage = args(
            StorageView {
                summary: true,
                ..StorageView::default()
            },
            ExportArgs::default(),
        );
        let result = handle_storage(&ctx, &storage, OutputFormat::Text).await;
        let Err(CliError::Failure(err)) = result else {
            panic!("expected failure");
        };
        assert!(format!("{err:#}").contains(SYSTEM_PATH));
        Ok(())
    }
}
