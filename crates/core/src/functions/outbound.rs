use async_trait::async_trait;
use openai_realtime_types::tools::Tool;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{FunctionContext, NoArgs, amount, parse_args, tool};
use crate::customer::CustomerInfo;
use crate::error::FunctionError;
use crate::outcome::CallOutcome;

#[derive(Debug, Deserialize, JsonSchema)]
struct ConfirmIdentityArgs {
    /// Whether the person on the line is the customer
    confirmed: bool,
    /// Why the identity could not be confirmed
    reason: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CommitmentArgs {
    /// Kind of payment, e.g. full, partial or installment
    payment_type: String,
    /// Amount the customer commits to pay
    amount: f64,
    /// When the payment will be made
    payment_date: String,
    /// How the customer will pay
    #[serde(default = "unspecified")]
    payment_method: String,
}

fn unspecified() -> String {
    "not specified".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CallbackArgs {
    /// Date of the callback
    date: String,
    /// Time of the callback
    time: String,
    /// What to discuss on the callback
    reason: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DisputeArgs {
    /// Why the customer disputes the balance
    dispute_reason: String,
}

/// Outbound collection call functions. Every call updates the [`CallOutcome`].
#[derive(Debug)]
pub struct OutboundFunctions {
    customer: CustomerInfo,
    outcome: CallOutcome,
}

impl OutboundFunctions {
    pub fn new(customer: CustomerInfo) -> Self {
        Self {
            customer,
            outcome: CallOutcome::default(),
        }
    }

    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    fn confirm_speaking_with_customer(&mut self, args: ConfirmIdentityArgs) -> String {
        if args.confirmed {
            self.outcome.note("Identity confirmed");
            "Identity confirmed. Proceeding with collection discussion.".to_string()
        } else {
            let reason = args.reason.unwrap_or_else(|| "no reason given".to_string());
            self.outcome.note(format!("Wrong party: {reason}"));
            "Unable to confirm identity. Call will be terminated.".to_string()
        }
    }

    fn offer_payment_options(&mut self) -> String {
        let owed = self.customer.amount_owed;
        self.outcome.note("Payment options presented");
        format!(
            "Based on your balance of ${owed:.2}, I can offer you several options:\n\
             1. Pay in full today with a 10% discount: ${:.2}\n\
             2. Split into 3 monthly payments of ${:.2}\n\
             3. Split into 6 monthly payments of ${:.2}\n\
             4. Make a partial payment today of any amount you can afford\n\
             5. Discuss a hardship program if you're experiencing financial difficulties\n\
             Which option works best for your current situation?",
            owed * 0.9,
            owed / 3.0,
            owed / 6.0,
        )
    }

    fn process_payment_commitment(
        &mut self,
        args: CommitmentArgs,
    ) -> Result<String, FunctionError> {
        let value = amount("amount", args.amount)?;
        self.outcome.payment_secured = true;
        self.outcome.amount_collected = value;
        self.outcome.note(format!(
            "Payment commitment: {} - ${value:.2} on {} via {}",
            args.payment_type, args.payment_date, args.payment_method
        ));
        let confirmation = chrono::Local::now().format("CONF-%Y%m%d%H%M%S");
        Ok(format!(
            "Perfect! I've recorded your commitment to pay ${value:.2} on {}. \
             You'll receive a confirmation email shortly with all the details. \
             Your confirmation number is: {confirmation}",
            args.payment_date
        ))
    }

    fn schedule_callback(&mut self, args: CallbackArgs) -> String {
        self.outcome.callback_scheduled = true;
        self.outcome.note(format!(
            "Callback scheduled: {} at {} - {}",
            args.date, args.time, args.reason
        ));
        format!(
            "I've scheduled a callback for {} at {}. We'll discuss {} then.",
            args.date, args.time, args.reason
        )
    }

    fn handle_dispute(&mut self, args: DisputeArgs) -> String {
        self.outcome
            .note(format!("Customer disputes: {}", args.dispute_reason));
        "I understand you're disputing this balance. I'll make a note of your concern \
         and have our disputes department review your account. You should receive a response \
         within 5 business days. Is there anything else you'd like me to note about this dispute?"
            .to_string()
    }

    /// `{customer, amount_owed, outcome}`, also written to the log.
    pub fn end_call_summary(&self) -> String {
        let summary = serde_json::json!({
            "customer": self.customer.customer_name,
            "amount_owed": self.customer.amount_owed,
            "outcome": self.outcome,
        });
        tracing::info!(
            "Call summary: {}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string())
        );
        summary.to_string()
    }
}

#[async_trait]
impl FunctionContext for OutboundFunctions {
    fn tools(&self) -> Vec<Tool> {
        vec![
            tool::<ConfirmIdentityArgs>(
                "confirm_speaking_with_customer",
                "Confirm we're speaking with the right person",
            ),
            tool::<NoArgs>(
                "offer_payment_options",
                "Present payment options based on the amount owed",
            ),
            tool::<CommitmentArgs>(
                "process_payment_commitment",
                "Record a payment commitment from the customer",
            ),
            tool::<CallbackArgs>(
                "schedule_callback",
                "Schedule a callback if customer can't commit now",
            ),
            tool::<DisputeArgs>("handle_dispute", "Handle when customer disputes the debt"),
            tool::<NoArgs>("end_call_summary", "Generate a summary of the call outcome"),
        ]
    }

    async fn call(&mut self, name: &str, arguments: &str) -> Result<String, FunctionError> {
        match name {
            "confirm_speaking_with_customer" => {
                Ok(self.confirm_speaking_with_customer(parse_args(name, arguments)?))
            }
            "offer_payment_options" => {
                let _: NoArgs = parse_args(name, arguments)?;
                Ok(self.offer_payment_options())
            }
            "process_payment_commitment" => {
                self.process_payment_commitment(parse_args(name, arguments)?)
            }
            "schedule_callback" => Ok(self.schedule_callback(parse_args(name, arguments)?)),
            "handle_dispute" => Ok(self.handle_dispute(parse_args(name, arguments)?)),
            "end_call_summary" => {
                let _: NoArgs = parse_args(name, arguments)?;
                Ok(self.end_call_summary())
            }
            other => Err(FunctionError::UnknownFunction(other.to_string())),
        }
    }

    fn call_ended(&mut self) -> Option<String> {
        Some(self.end_call_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            phone_number: "+15550100".to_string(),
            customer_name: "Ana Ruiz".to_string(),
            amount_owed: 600.0,
            payment_due_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn identity_confirmation_notes() {
        let mut functions = OutboundFunctions::new(customer());
        let ok = functions
            .call("confirm_speaking_with_customer", r#"{"confirmed":true}"#)
            .await
            .unwrap();
        assert!(ok.starts_with("Identity confirmed."));
        let wrong = functions
            .call(
                "confirm_speaking_with_customer",
                r#"{"confirmed":false,"reason":"spouse answered"}"#,
            )
            .await
            .unwrap();
        assert!(wrong.contains("terminated"));
        assert_eq!(
            functions.outcome().notes,
            vec!["Identity confirmed", "Wrong party: spouse answered"]
        );
    }

    #[tokio::test]
    async fn options_are_computed_from_amount_owed() {
        let mut functions = OutboundFunctions::new(customer());
        let text = functions.call("offer_payment_options", "{}").await.unwrap();
        assert!(text.contains("balance of $600.00"));
        assert!(text.contains("10% discount: $540.00"));
        assert!(text.contains("3 monthly payments of $200.00"));
        assert!(text.contains("6 monthly payments of $100.00"));
        assert_eq!(functions.outcome().notes, vec!["Payment options presented"]);
    }

    #[tokio::test]
    async fn commitment_secures_payment() {
        let mut functions = OutboundFunctions::new(customer());
        let text = functions
            .call(
                "process_payment_commitment",
                r#"{"payment_type":"full","amount":540,"payment_date":"10/25/2026"}"#,
            )
            .await
            .unwrap();
        assert!(text.contains("pay $540.00 on 10/25/2026"));
        let conf = text.rsplit(' ').next().unwrap();
        assert!(conf.starts_with("CONF-"));
        assert_eq!(conf.len(), "CONF-".len() + 14);

        let outcome = functions.outcome();
        assert!(outcome.payment_secured);
        assert_eq!(outcome.amount_collected, 540.0);
        assert_eq!(
            outcome.notes,
            vec!["Payment commitment: full - $540.00 on 10/25/2026 via not specified"]
        );
    }

    #[tokio::test]
    async fn callback_and_dispute() {
        let mut functions = OutboundFunctions::new(customer());
        let text = functions
            .call(
                "schedule_callback",
                r#"{"date":"Monday","time":"10am","reason":"payday"}"#,
            )
            .await
            .unwrap();
        assert_eq!(
            text,
            "I've scheduled a callback for Monday at 10am. We'll discuss payday then."
        );
        let text = functions
            .call("handle_dispute", r#"{"dispute_reason":"already paid"}"#)
            .await
            .unwrap();
        assert!(text.contains("5 business days"));
        assert!(functions.outcome().callback_scheduled);
        assert_eq!(functions.outcome().notes[1], "Customer disputes: already paid");
    }

    #[tokio::test]
    async fn summary_at_call_end() {
        let mut functions = OutboundFunctions::new(customer());
        functions
            .call("schedule_callback", r#"{"date":"Mon","time":"9am","reason":"plan"}"#)
            .await
            .unwrap();
        let summary: Value = serde_json::from_str(&functions.call_ended().unwrap()).unwrap();
        assert_eq!(summary["customer"], "Ana Ruiz");
        assert_eq!(summary["amount_owed"], 600.0);
        assert_eq!(summary["outcome"]["callback_scheduled"], true);
        assert_eq!(summary["outcome"]["payment_secured"], false);
    }

    #[tokio::test]
    async fn negative_commitment_is_rejected() {
        let mut functions = OutboundFunctions::new(customer());
        let err = functions
            .call(
                "process_payment_commitment",
                r#"{"payment_type":"full","amount":-1,"payment_date":"soon"}"#,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_failed");
        assert!(!functions.outcome().payment_secured);
    }
}
