//! Bill payload validation
//!
//! The store trusts its input. Callers (HTTP handlers, CLI commands) build
//! bills through [`BillInput`], which checks every field and reports all
//! problems at once.
//!
//! Payloads are read from raw JSON rather than a typed decode, so a field with
//! the wrong type becomes a per-field message instead of failing the request.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Bill;

/// Length of generated bill ids
pub const GENERATED_ID_LEN: usize = 8;

/// Loosely-typed bill fields as supplied by a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub due_day: Option<f64>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
    pub is_recurring: Option<bool>,
    /// JSON keys that were present with the wrong type
    pub mistyped: Vec<&'static str>,
}

impl BillInput {
    /// Read a camelCase JSON payload (`null` counts as an empty object)
    ///
    /// `null` field values count as absent. Fields of the wrong type are left
    /// unset and recorded in [`mistyped`](Self::mistyped).
    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(fields) => fields,
            _ => {
                return Err(Error::Validation(vec![
                    "request body must be a JSON object".to_string(),
                ]))
            }
        };

        let mut input = Self::default();
        input.id = input.read(fields, "id", Value::as_str).map(str::to_string);
        input.name = input.read(fields, "name", Value::as_str).map(str::to_string);
        input.due_day = input.read(fields, "dueDay", Value::as_f64);
        input.amount = input.read(fields, "amount", Value::as_f64);
        input.notes = input.read(fields, "notes", Value::as_str).map(str::to_string);
        input.is_recurring = input.read(fields, "isRecurring", Value::as_bool);
        Ok(input)
    }

    fn read<'a, T>(
        &mut self,
        fields: &'a Map<String, Value>,
        key: &'static str,
        extract: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<T> {
        match fields.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let typed = extract(value);
                if typed.is_none() {
                    self.mistyped.push(key);
                }
                typed
            }
        }
    }

    fn is_mistyped(&self, key: &str) -> bool {
        self.mistyped.iter().any(|k| *k == key)
    }

    /// Per-field validation messages (empty when valid)
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            errors.push("'name' is required".to_string());
        }

        match self.due_day {
            Some(d) if d.is_finite() && (1.0..=31.0).contains(&d) => {}
            _ => errors.push("'dueDay' must be a number between 1 and 31".to_string()),
        }

        match self.amount {
            Some(a) if a.is_finite() && a >= 0.0 => {}
            _ => errors.push("'amount' must be a non-negative number".to_string()),
        }

        if self.is_mistyped("notes") {
            errors.push("'notes' must be a string if provided".to_string());
        }
        if self.is_mistyped("isRecurring") {
            errors.push("'isRecurring' must be a boolean if provided".to_string());
        }
        if self.is_mistyped("id") {
            errors.push("'id' must be a string if provided".to_string());
        }

        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// Overlay the provided fields on an existing bill
    ///
    /// The id is always taken from `existing`. Mistyped fields stay unset so
    /// they still fail validation.
    pub fn merged_over(self, existing: &Bill) -> Self {
        let keep = |key: &str| !self.is_mistyped(key);
        Self {
            id: Some(existing.id.clone()),
            name: self
                .name
                .clone()
                .or_else(|| keep("name").then(|| existing.name.clone())),
            due_day: self
                .due_day
                .or_else(|| keep("dueDay").then(|| f64::from(existing.due_day))),
            amount: self
                .amount
                .or_else(|| keep("amount").then_some(existing.amount)),
            notes: self
                .notes
                .clone()
                .or_else(|| keep("notes").then(|| existing.notes.clone())),
            is_recurring: self
                .is_recurring
                .or_else(|| keep("isRecurring").then_some(existing.is_recurring)),
            mistyped: self.mistyped.into_iter().filter(|key| *key != "id").collect(),
        }
    }

    /// Validate and build a bill, generating an id when none was supplied
    pub fn into_new_bill(self) -> Result<Bill> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(generate_bill_id);
        self.into_bill(id)
    }

    /// Validate and build a bill with the given id
    ///
    /// Trims name and notes, rounds the due day, and applies the
    /// `notes = ""` / `isRecurring = true` defaults.
    pub fn into_bill(self, id: String) -> Result<Bill> {
        self.validate()?;

        // Both present after validate()
        let (Some(name), Some(due_day), Some(amount)) = (self.name, self.due_day, self.amount)
        else {
            return Err(Error::InvalidData("bill input incomplete".into()));
        };

        Ok(Bill {
            id,
            name: name.trim().to_string(),
            due_day: due_day.round() as u32,
            amount,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .unwrap_or_default(),
            is_recurring: self.is_recurring.unwrap_or(true),
        })
    }
}

/// Short random id for bills created without one
pub fn generate_bill_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(GENERATED_ID_LEN);
    id
}
