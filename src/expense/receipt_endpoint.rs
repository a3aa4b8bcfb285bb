//! Defines the endpoint for attaching a receipt to an expense.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Multipart, State, multipart::MultipartRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ExpenseId,
    expense::core::{Expense, get_expense, set_receipt},
    extract::PathParam,
};

/// The name of the form field that holds the receipt file.
const RECEIPT_FIELD: &str = "receipt";

/// The state needed to store receipts.
#[derive(Debug, Clone)]
pub struct ReceiptState {
    /// The directory receipt files are written to.
    pub receipts_dir: PathBuf,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReceiptState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            receipts_dir: state.receipts_dir.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that saves the uploaded receipt for one of the logged in
/// user's expenses and responds with the updated expense.
///
/// The request must be a multipart form with the file in the `receipt`
/// field. An existing receipt is replaced.
pub async fn upload_receipt_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    PathParam(expense_id): PathParam<ExpenseId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Expense>, Error> {
    let mut multipart = multipart.map_err(|rejection| Error::InvalidReceipt(rejection.body_text()))?;

    let previous_receipt = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_expense(expense_id, user_id, &connection)?.receipt
    };

    let (file_name, data) = read_receipt_field(&mut multipart).await?;

    tokio::fs::create_dir_all(&state.receipts_dir)
        .await
        .map_err(|error| Error::IoError(error.to_string()))?;
    let path = state
        .receipts_dir
        .join(format!("{expense_id}-{}", sanitize_file_name(&file_name)));
    tokio::fs::write(&path, &data)
        .await
        .map_err(|error| Error::IoError(error.to_string()))?;
    let path = path.to_string_lossy().into_owned();

    tracing::debug!(
        "Saved {} byte receipt for expense {expense_id} to {path}",
        data.len()
    );

    let expense = record_receipt(
        &state.db_connection,
        expense_id,
        user_id,
        &path,
        previous_receipt.as_deref(),
    )
    .await?;

    if let Some(previous) = previous_receipt.filter(|previous| *previous != path) {
        if let Err(error) = tokio::fs::remove_file(&previous).await {
            tracing::warn!("Could not remove replaced receipt {previous}: {error}");
        }
    }

    Ok(Json(expense))
}

/// Point the expense at the receipt saved to `path`.
///
/// If that fails, the file at `path` is removed unless the expense still
/// refers to it as `previous_receipt`.
async fn record_receipt(
    db_connection: &Mutex<Connection>,
    expense_id: ExpenseId,
    user_id: UserID,
    path: &str,
    previous_receipt: Option<&str>,
) -> Result<Expense, Error> {
    let result = match db_connection.lock() {
        Ok(connection) => set_receipt(expense_id, user_id, path, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    let error = match result {
        Ok(expense) => return Ok(expense),
        Err(error) => error,
    };

    if previous_receipt != Some(path) || error == Error::ExpenseNotFound {
        if let Err(remove_error) = tokio::fs::remove_file(path).await {
            tracing::warn!("Could not remove unused receipt {path}: {remove_error}");
        }
    }

    Err(error)
}

async fn read_receipt_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::InvalidReceipt(error.body_text()))?
    {
        if field.name() != Some(RECEIPT_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| Error::InvalidReceipt("the receipt must be a file".to_owned()))?;
        let data = field.bytes().await.map_err(|error| {
            tracing::error!("Could not read receipt from multipart form field: {error}");
            Error::InvalidReceipt(error.body_text())
        })?;

        if data.is_empty() {
            return Err(Error::InvalidReceipt("the receipt file is empty".to_owned()));
        }

        return Ok((file_name, data.to_vec()));
    }

    Err(Error::MissingField(RECEIPT_FIELD))
}

/// Reduce a client supplied file name to a safe name with no directories.
fn sanitize_file_name(file_name: &str) -> String {
    let base_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let sanitized: String = base_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "receipt".to_owned()
    } else {
        sanitized
    }
}
