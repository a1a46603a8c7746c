use serde::Serialize;
use serde_json::Value;

/// Outbound call result, written by the outbound functions as the call goes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallOutcome {
    pub payment_secured: bool,
    pub arrangement_made: bool,
    pub callback_scheduled: bool,
    pub amount_collected: f64,
    pub notes: Vec<String>,
}

impl CallOutcome {
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Inbound call result, derived from function results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionsOutcome {
    pub payment_collected: bool,
    pub arrangement_made: bool,
    pub last_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeUpdate {
    PaymentCollected(f64),
    ArrangementMade,
}

impl CollectionsOutcome {
    /// Applies one finished function call. Error payloads never count.
    pub fn record(&mut self, function: &str, result: &str) -> Option<OutcomeUpdate> {
        let result: Value = serde_json::from_str(result).ok()?;
        if result.get("success").and_then(Value::as_bool) == Some(false) {
            return None;
        }
        match function {
            "process_payment" if result.get("success").and_then(Value::as_bool) == Some(true) => {
                let amount = result.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
                self.payment_collected = true;
                self.last_amount = Some(amount);
                Some(OutcomeUpdate::PaymentCollected(amount))
            }
            "setup_payment_plan" => {
                self.arrangement_made = true;
                Some(OutcomeUpdate::ArrangementMade)
            }
            _ => None,
        }
    }
}
