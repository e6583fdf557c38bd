use crate::azure::WebApps;
use crate::error::DeployError;

/// Reported when the service answers a successful sync with 200 instead of 204
pub const BENIGN_SYNC_ERROR: &str = "Operation returned an invalid status 'OK'";

/// Re-sync a Function App's triggers after a deploy.
///
/// Exactly [`BENIGN_SYNC_ERROR`] is swallowed; any other error message fails the sync.
pub async fn sync_function_app_triggers(
    web: &dyn WebApps,
    resource_group: &str,
    function_app: &str,
) -> Result<(), DeployError> {
    eprintln!("Syncing triggers...");

    match web.sync_function_triggers(resource_group, function_app).await {
        Ok(()) => {}
        Err(e) if e.message == BENIGN_SYNC_ERROR => {
            tracing::warn!(function_app, "ignoring benign trigger sync status");
        }
        Err(e) => return Err(DeployError::TriggerSyncFailed(e.message)),
    }

    eprintln!("Triggers synced successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct SyncResult(Result<(), ApiError>);

    #[async_trait]
    impl WebApps for SyncResult {
        async fn publishing_profile_xml(&self, _: &str, _: &str) -> Result<Vec<Bytes>, ApiError> {
            Ok(Vec::new())
        }

        async fn sync_function_triggers(&self, _: &str, _: &str) -> Result<(), ApiError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_success() {
        let web = SyncResult(Ok(()));
        assert!(sync_function_app_triggers(&web, "rg", "app").await.is_ok());
    }

    #[tokio::test]
    async fn test_benign_message_is_swallowed() {
        let web = SyncResult(Err(ApiError::with_status(200, BENIGN_SYNC_ERROR)));
        assert!(sync_function_app_triggers(&web, "rg", "app").await.is_ok());
    }

    #[tokio::test]
    async fn test_other_messages_propagate_verbatim() {
        for message in [
            "Operation returned an invalid status 'Accepted'",
            "Operation returned an invalid status 'OK' ",
            "(ResourceNotFound) The Resource 'Microsoft.Web/sites/app' was not found.",
        ] {
            let web = SyncResult(Err(ApiError::new(message)));
            match sync_function_app_triggers(&web, "rg", "app").await {
                Err(DeployError::TriggerSyncFailed(m)) => assert_eq!(m, message),
                other => panic!("expected TriggerSyncFailed for {:?}, got {:?}", message, other),
            }
        }
    }
}
