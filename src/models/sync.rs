use serde::{Deserialize, Serialize};

use crate::models::expense::{Expense, ExpenseId};

/// Cambio pendiente de replicar contra el backend.
///
/// La cola de cambios es una secuencia FIFO: el orden de encolado es el orden
/// de replay, porque un `update` o `delete` posterior puede apuntar a un
/// registro creado por un `add` anterior de la misma cola.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PendingChange {
    Add { expense: Expense },
    Update { expense: Expense },
    Delete { id: ExpenseId },
}

impl PendingChange {
    /// Identificador al que apunta el cambio
    pub fn target_id(&self) -> &ExpenseId {
        match self {
            PendingChange::Add { expense } | PendingChange::Update { expense } => &expense.id,
            PendingChange::Delete { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PendingChange::Add { .. } => "add",
            PendingChange::Update { .. } => "update",
            PendingChange::Delete { .. } => "delete",
        }
    }

    /// Reescribir el identificador si el cambio apunta a `old`.
    /// Se usa al reconciliar un id provisional con el id del servidor.
    pub fn rewrite_id(&mut self, old: &ExpenseId, new: &ExpenseId) {
        match self {
            PendingChange::Add { expense } | PendingChange::Update { expense } => {
                if &expense.id == old {
                    expense.id = new.clone();
                }
            }
            PendingChange::Delete { id } => {
                if id == old {
                    *id = new.clone();
                }
            }
        }
    }
}
