pub mod api_client;
pub mod network_monitor;
pub mod offline_service;
pub mod sync_service;

#[cfg(test)]
pub mod testutil;

pub use api_client::ApiClient;
pub use network_monitor::NetworkMonitor;
pub use offline_service::OfflineService;
pub use sync_service::SyncService;
