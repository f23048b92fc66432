use crate::functions::OperationKind;
use serde_json::{json, Value};

/// Normalizes a function's return value into the row set the built-in
/// permission rules evaluate.
///
/// - `List` results are already a sequence of rows and pass through as-is.
/// - `Delete` results are the deleted identifier; a single `{"id": ...}` row
///   is synthesized so id-based rules can run against it.
/// - Every other kind returns a single row, wrapped in a one-element set.
///
/// There are no error conditions here: a malformed result (say, a `List`
/// function returning a non-array) is wrapped as a single row and handed to
/// the evaluator, where rules get to fail it.
pub fn rows_for_permissions(kind: OperationKind, result: &Value) -> Vec<Value> {
    match kind {
        OperationKind::List => match result.as_array() {
            Some(rows) => rows.clone(),
            None => vec![result.clone()],
        },
        OperationKind::Delete => vec![json!({ "id": result })],
        _ => vec![result.clone()],
    }
}
