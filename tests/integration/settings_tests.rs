use super::*;
use std::sync::Arc;

use kleinwatch::models::{MonitorSettings, SettingsUpdate};
use kleinwatch::monitor::TaskManager;
use kleinwatch::storage::{MarketStore, MemoryStore};
use kleinwatch::AppError;

fn manager(store: Arc<MemoryStore>) -> TaskManager {
    TaskManager::new(
        store as Arc<dyn MarketStore>,
        Arc::new(ScriptedPriceClient::new()),
        Arc::new(ScriptedTrackingClient::new()),
        Arc::new(CollectingSink::new()),
        fast_tuning(),
    )
}

#[tokio::test]
async fn test_settings_are_loaded_on_start() -> anyhow::Result<()> {
    let mut settings = MonitorSettings::default();
    settings.price.enabled = false;
    let store = Arc::new(MemoryStore::with_settings(settings));
    let mut manager = manager(Arc::clone(&store));

    manager.start_all().await?;

    let status = manager.status();
    assert!(!status.price_active);
    assert!(status.tracking_active);
    assert!(!manager.settings().price.enabled);

    manager.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn test_hot_reload_via_restart() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut manager = manager(Arc::clone(&store));

    manager.start_all().await?;
    assert!(manager.status().price_active);
    assert!(manager.status().tracking_active);

    // Disable tracking, shorten the price interval
    manager
        .restart_with(SettingsUpdate {
            tracking_enabled: Some(false),
            price_interval_minutes: Some(15),
            ..Default::default()
        })
        .await?;

    let status = manager.status();
    assert!(status.price_active);
    assert!(!status.tracking_active);
    assert_eq!(manager.settings().price.interval_minutes, 15);

    // The merged settings were persisted, so a later cold start sees them
    let persisted = store.load_settings().await?;
    assert!(!persisted.tracking.enabled);
    assert_eq!(persisted.price.interval_minutes, 15);
    assert_eq!(persisted.tracking.interval_minutes, 30);

    // Re-enabling brings the loop back
    manager
        .restart_with(SettingsUpdate {
            tracking_enabled: Some(true),
            ..Default::default()
        })
        .await?;
    assert!(manager.status().tracking_active);

    manager.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn test_invalid_interval_is_rejected_before_restart() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut manager = manager(Arc::clone(&store));

    manager.start_all().await?;
    let result = manager
        .restart_with(SettingsUpdate {
            tracking_interval_minutes: Some(0),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    // The running loops were not torn down and nothing was persisted
    assert!(manager.status().price_active);
    assert!(manager.status().tracking_active);
    assert_eq!(store.load_settings().await?, MonitorSettings::default());

    manager.stop_all().await;
    Ok(())
}
