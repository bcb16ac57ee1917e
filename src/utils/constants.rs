/// URL base del backend
/// Configurada en tiempo de compilación:
/// - Desarrollo: http://localhost:3000 (por defecto)
/// - Producción: via BACKEND_URL env var
pub const BACKEND_URL: &str = match option_env!("BACKEND_URL") {
    Some(url) => url,
    None => "http://localhost:3000",
};

/// Clave del snapshot completo de gastos en localStorage
pub const SNAPSHOT_KEY: &str = "expenses-snapshot";

/// Clave de la cola de cambios pendientes en localStorage
pub const PENDING_CHANGES_KEY: &str = "pending-changes";

/// Tamaño de página del listado remoto
pub const PAGE_LIMIT: u32 = 10;
