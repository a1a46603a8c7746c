//! Inbound collections: identity check, payment options, mock payments and
//! plans, confirmations and hardship screening.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use openai_realtime_types::tools::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{FunctionContext, amount, parse_args, tool};
use crate::error::FunctionError;
use crate::payments::{assess_hardship, monthly_payment, payment_options};

const ID_TIMESTAMP: &str = "%Y%m%d%H%M%S";
const ISO_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const PLAN_DATE_FORMAT: &str = "%m/%d/%Y";
const PAYMENT_METHODS: [&str; 3] = ["card", "ach", "phone"];

#[derive(Debug, Deserialize, JsonSchema)]
struct VerifyAccountArgs {
    /// Account number or last 4 digits of SSN
    account_number: String,
    /// Date of birth in MM/DD/YYYY format
    date_of_birth: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PaymentOptionsArgs {
    /// Current balance owed
    balance: f64,
    /// Customer's monthly income if provided
    monthly_income: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ProcessPaymentArgs {
    /// Payment amount
    amount: f64,
    /// Payment method: card, ach, or phone
    payment_method: String,
    /// Payment details like card number or account info
    payment_details: HashMap<String, String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PaymentPlanArgs {
    /// Total amount owed
    total_amount: f64,
    /// Number of months for payment plan
    months: i64,
    /// First payment date in MM/DD/YYYY format
    first_payment_date: String,
    /// Whether to set up autopay
    #[serde(default)]
    auto_pay: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ConfirmationArgs {
    /// Customer email address
    email: String,
    /// Customer phone number for SMS
    phone: Option<String>,
    /// Payment or plan details to confirm
    confirmation_details: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct HardshipArgs {
    /// Monthly income
    income: f64,
    /// Monthly expenses
    expenses: f64,
    /// Reason for financial hardship
    hardship_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub success: bool,
    pub transaction_id: String,
    pub amount: f64,
    pub method: String,
    pub processed_at: String,
    pub confirmation_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPlan {
    pub plan_id: String,
    pub total_amount: f64,
    pub months: u32,
    pub monthly_payment: f64,
    pub first_payment_date: String,
    pub auto_pay: bool,
    pub status: String,
    pub created_at: String,
}

/// In-memory transactions and plans for one call. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MockLedger {
    transactions: Vec<Transaction>,
    plans: BTreeMap<String, PaymentPlan>,
}

impl MockLedger {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn plan(&self, plan_id: &str) -> Option<&PaymentPlan> {
        self.plans.get(plan_id)
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    fn next_transaction_id(&self, now: NaiveDateTime) -> String {
        unique_id("TXN", now, |id| {
            self.transactions.iter().any(|t| t.transaction_id == id)
        })
    }

    fn next_plan_id(&self, now: NaiveDateTime) -> String {
        unique_id("PLAN", now, |id| self.plans.contains_key(id))
    }

    fn record_payment(&mut self, amount: f64, method: &str, now: NaiveDateTime) -> Transaction {
        let transaction_id = self.next_transaction_id(now);
        let transaction = Transaction {
            success: true,
            confirmation_number: confirmation_number(&transaction_id),
            transaction_id,
            amount,
            method: method.to_string(),
            processed_at: now.format(ISO_TIMESTAMP).to_string(),
        };
        self.transactions.push(transaction.clone());
        transaction
    }

    fn create_plan(
        &mut self,
        total_amount: f64,
        months: u32,
        first_payment_date: &str,
        auto_pay: bool,
        now: NaiveDateTime,
    ) -> PaymentPlan {
        let plan = PaymentPlan {
            plan_id: self.next_plan_id(now),
            total_amount,
            months,
            monthly_payment: monthly_payment(total_amount, months),
            first_payment_date: first_payment_date.to_string(),
            auto_pay,
            status: "active".to_string(),
            created_at: now.format(ISO_TIMESTAMP).to_string(),
        };
        self.plans.insert(plan.plan_id.clone(), plan.clone());
        plan
    }
}

/// `PREFIX-YYYYmmddHHMMSS`, suffixed `-2`, `-3`, ... while `taken`.
fn unique_id(prefix: &str, now: NaiveDateTime, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{prefix}-{}", now.format(ID_TIMESTAMP));
    let mut id = base.clone();
    let mut n = 1;
    while taken(&id) {
        n += 1;
        id = format!("{base}-{n}");
    }
    id
}

fn confirmation_number(transaction_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    transaction_id.hash(&mut hasher);
    format!("CONF-{:06}", hasher.finish() % 1_000_000)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[derive(Debug, Default)]
pub struct CollectionsFunctions {
    ledger: MockLedger,
}

impl CollectionsFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &MockLedger {
        &self.ledger
    }

    fn verify_account(&self, args: VerifyAccountArgs) -> String {
        tracing::debug!(
            "verifying account {} (dob supplied: {})",
            args.account_number,
            !args.date_of_birth.is_empty()
        );
        json!({
            "verified": true,
            "account_number": args.account_number,
            "balance": 2500.00,
            "past_due": 450.00,
            "days_overdue": 45,
            "last_payment_date": "2024-06-15",
            "minimum_payment": 150.00,
        })
        .to_string()
    }

    fn get_payment_options(&self, args: PaymentOptionsArgs) -> Result<String, FunctionError> {
        let balance = amount("balance", args.balance)?;
        if let Some(income) = args.monthly_income {
            amount("monthly_income", income)?;
        }
        to_json(&payment_options(balance))
    }

    fn process_payment(&mut self, args: ProcessPaymentArgs) -> Result<String, FunctionError> {
        let value = amount("amount", args.amount)?;
        let method = args.payment_method.trim().to_lowercase();
        if !PAYMENT_METHODS.contains(&method.as_str()) {
            return Err(FunctionError::validation(
                "payment_method",
                format!("{} is not one of card, ach, phone", args.payment_method),
            ));
        }
        let detail_keys: Vec<_> = args.payment_details.keys().collect();
        tracing::debug!("payment details supplied: {:?}", detail_keys);
        let transaction = self.ledger.record_payment(value, &method, now());
        to_json(&transaction)
    }

    fn setup_payment_plan(&mut self, args: PaymentPlanArgs) -> Result<String, FunctionError> {
        let total = amount("total_amount", args.total_amount)?;
        let months = u32::try_from(args.months)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or_else(|| FunctionError::validation("months", "must be at least 1"))?;
        NaiveDate::parse_from_str(args.first_payment_date.trim(), PLAN_DATE_FORMAT).map_err(|_| {
            FunctionError::validation(
                "first_payment_date",
                format!("{} is not a MM/DD/YYYY date", args.first_payment_date),
            )
        })?;
        let plan = self.ledger.create_plan(
            total,
            months,
            args.first_payment_date.trim(),
            args.auto_pay,
            now(),
        );
        to_json(&plan)
    }

    fn send_payment_confirmation(&self, args: ConfirmationArgs) -> String {
        if let Some(details) = &args.confirmation_details {
            let details = serde_json::to_string(details).unwrap_or_default();
            tracing::debug!("confirmation details: {}", details);
        }
        json!({
            "email_sent": !args.email.trim().is_empty(),
            "sms_sent": args.phone.as_deref().is_some_and(|p| !p.trim().is_empty()),
            "timestamp": now().format(ISO_TIMESTAMP).to_string(),
        })
        .to_string()
    }

    fn check_eligibility_for_hardship(&self, args: HardshipArgs) -> Result<String, FunctionError> {
        let income = amount("income", args.income)?;
        let expenses = amount("expenses", args.expenses)?;
        to_json(&assess_hardship(income, expenses, &args.hardship_reason))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, FunctionError> {
    serde_json::to_string(value).map_err(|e| FunctionError::Internal(e.to_string()))
}

#[async_trait]
impl FunctionContext for CollectionsFunctions {
    fn tools(&self) -> Vec<Tool> {
        vec![
            tool::<VerifyAccountArgs>(
                "verify_account",
                "Verify customer identity and retrieve account information",
            ),
            tool::<PaymentOptionsArgs>(
                "get_payment_options",
                "Generate payment plan options based on balance and customer situation",
            ),
            tool::<ProcessPaymentArgs>(
                "process_payment",
                "Process a payment or set up a payment arrangement",
            ),
            tool::<PaymentPlanArgs>("setup_payment_plan", "Set up a payment plan arrangement"),
            tool::<ConfirmationArgs>(
                "send_payment_confirmation",
                "Send payment confirmation via email and/or SMS",
            ),
            tool::<HardshipArgs>(
                "check_eligibility_for_hardship",
                "Check if customer qualifies for hardship program",
            ),
        ]
    }

    async fn call(&mut self, name: &str, arguments: &str) -> Result<String, FunctionError> {
        match name {
            "verify_account" => Ok(self.verify_account(parse_args(name, arguments)?)),
            "get_payment_options" => self.get_payment_options(parse_args(name, arguments)?),
            "process_payment" => self.process_payment(parse_args(name, arguments)?),
            "setup_payment_plan" => self.setup_payment_plan(parse_args(name, arguments)?),
            "send_payment_confirmation" => {
                Ok(self.send_payment_confirmation(parse_args(name, arguments)?))
            }
            "check_eligibility_for_hardship" => {
                self.check_eligibility_for_hardship(parse_args(name, arguments)?)
            }
            other => Err(FunctionError::UnknownFunction(other.to_string())),
        }
    }
}
