use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identificador de un gasto.
///
/// Dos subespacios disjuntos: ids asignados por el servidor e ids
/// provisionales generados en el cliente durante el modo offline. Un id
/// provisional vive solo hasta que su `add` pendiente se replica con éxito;
/// en ese momento se sustituye por el id del servidor en el estado y en
/// cualquier cambio encolado posterior.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExpenseId {
    Server(String),
    Provisional(String),
}

impl ExpenseId {
    /// Texto crudo del identificador (para rutas de API y comparaciones)
    pub fn raw(&self) -> &str {
        match self {
            ExpenseId::Server(id) | ExpenseId::Provisional(id) => id,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, ExpenseId::Provisional(_))
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// Categorías permitidas (conjunto fijo)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gasto registrado
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Borrador de gasto sin identificador (lo que envía el formulario)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewExpense {
    /// Validar invariantes del modelo antes de llegar al interceptor.
    /// Un borrador inválido se rechaza aquí y nunca se encola.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("El título no puede estar vacío".to_string());
        }
        if !(self.amount > 0.0) {
            return Err("El importe debe ser mayor que cero".to_string());
        }
        Ok(())
    }

    /// Materializar el borrador con un identificador ya decidido
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            title: self.title,
            amount: self.amount,
            date: self.date,
            category: self.category,
            notes: self.notes,
        }
    }
}

impl From<&Expense> for NewExpense {
    fn from(expense: &Expense) -> Self {
        NewExpense {
            title: expense.title.clone(),
            amount: expense.amount,
            date: expense.date,
            category: expense.category,
            notes: expense.notes.clone(),
        }
    }
}
