// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio, solo hace requests HTTP.
// El contrato remoto se consume a través del trait ExpensesApi para poder
// sustituir el backend por un doble en los tests.
// ============================================================================

use gloo_net::http::Request;
use serde::Deserialize;

use crate::models::expense::{Category, Expense, ExpenseId, NewExpense};
use crate::utils::constants::BACKEND_URL;

/// Campo de ordenación soportado por el listado remoto
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Amount => "amount",
        }
    }
}

/// Dirección de ordenación
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parámetros del listado paginado
#[derive(Clone, Debug, PartialEq)]
pub struct FetchExpensesParams {
    pub page: u32,
    pub limit: u32,
    pub category: Option<Category>,
    pub sort_by: SortField,
    pub order: SortOrder,
}

/// Página de gastos devuelta por el backend
#[derive(Clone, Debug, PartialEq)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total: usize,
    pub page: u32,
}

/// Contrato remoto de gastos.
///
/// Lo implementa el cliente HTTP real y los dobles de test; el motor de
/// sincronización y el viewmodel son genéricos sobre este trait.
#[allow(async_fn_in_trait)]
pub trait ExpensesApi {
    /// Listar gastos: paginado, filtrable por categoría, ordenable
    async fn fetch_expenses(&self, params: &FetchExpensesParams) -> Result<ExpensePage, String>;

    /// Crear gasto sin identificador; el servidor asigna el id definitivo
    async fn create_expense(&self, draft: &NewExpense) -> Result<Expense, String>;

    /// Actualizar gasto completo por identificador
    async fn update_expense(&self, id: &ExpenseId, draft: &NewExpense) -> Result<Expense, String>;

    /// Borrar gasto por identificador; no devuelve contenido
    async fn delete_expense(&self, id: &ExpenseId) -> Result<(), String>;
}

/// Cliente API - SOLO comunicación HTTP (stateless)
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_url: BACKEND_URL.to_string(),
        }
    }

    fn list_url(&self, params: &FetchExpensesParams) -> String {
        let mut url = format!(
            "{}/api/expenses?page={}&limit={}&sortBy={}&order={}",
            self.base_url,
            params.page,
            params.limit,
            params.sort_by.as_str(),
            params.order.as_str(),
        );
        if let Some(category) = params.category {
            url.push_str("&category=");
            url.push_str(category.as_str());
        }
        url
    }
}

impl ExpensesApi for ApiClient {
    async fn fetch_expenses(&self, params: &FetchExpensesParams) -> Result<ExpensePage, String> {
        let url = self.list_url(params);

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !response.ok() {
            return Err(format!("HTTP {}: {}", response.status(), response.status_text()));
        }

        let page = response
            .json::<PageDto>()
            .await
            .map_err(|e| format!("Parse error: {}", e))?;

        log::info!("📋 Página {} obtenida: {} gastos de {} totales",
                   page.page, page.data.len(), page.total);

        Ok(ExpensePage {
            expenses: page.data.into_iter().map(ExpenseDto::into_expense).collect(),
            total: page.total,
            page: page.page,
        })
    }

    async fn create_expense(&self, draft: &NewExpense) -> Result<Expense, String> {
        let url = format!("{}/api/expenses", self.base_url);

        let response = Request::post(&url)
            .json(draft)
            .map_err(|e| format!("Serialization error: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !response.ok() {
            return Err(format!("HTTP {}: {}", response.status(), response.status_text()));
        }

        let created = response
            .json::<ExpenseDto>()
            .await
            .map_err(|e| format!("Parse error: {}", e))?;

        log::info!("✅ Gasto creado en el backend: {}", created.id);

        Ok(created.into_expense())
    }

    async fn update_expense(&self, id: &ExpenseId, draft: &NewExpense) -> Result<Expense, String> {
        let url = format!("{}/api/expenses/{}", self.base_url, id.raw());

        let response = Request::put(&url)
            .json(draft)
            .map_err(|e| format!("Serialization error: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !response.ok() {
            return Err(format!("HTTP {}: {}", response.status(), response.status_text()));
        }

        response
            .json::<ExpenseDto>()
            .await
            .map(ExpenseDto::into_expense)
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn delete_expense(&self, id: &ExpenseId) -> Result<(), String> {
        let url = format!("{}/api/expenses/{}", self.base_url, id.raw());

        let response = Request::delete(&url)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !response.ok() {
            return Err(format!("HTTP {}: {}", response.status(), response.status_text()));
        }

        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

// Estructuras del wire: el backend habla ids planos de string,
// el dominio habla ExpenseId etiquetado.

#[derive(Deserialize)]
struct ExpenseDto {
    id: String,
    title: String,
    amount: f64,
    date: chrono::NaiveDate,
    category: Category,
    #[serde(default)]
    notes: Option<String>,
}

impl ExpenseDto {
    fn into_expense(self) -> Expense {
        Expense {
            id: ExpenseId::Server(self.id),
            title: self.title,
            amount: self.amount,
            date: self.date,
            category: self.category,
            notes: self.notes,
        }
    }
}

#[derive(Deserialize)]
struct PageDto {
    data: Vec<ExpenseDto>,
    total: usize,
    page: u32,
}
