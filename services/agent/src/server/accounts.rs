//! Demo account book behind `/api/collections/verify`, keyed by the last
//! four SSN digits or the short account number.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: &'static str,
    pub customer_name: &'static str,
    pub balance: f64,
    pub past_due: f64,
    pub days_overdue: u32,
    pub last_payment_date: &'static str,
    pub minimum_payment: f64,
    pub phone_number: &'static str,
    pub email: &'static str,
    pub status: &'static str,
}

const ACCOUNTS: [(&str, Account); 2] = [
    (
        "1234",
        Account {
            account_number: "ACC-001234",
            customer_name: "John Doe",
            balance: 2500.00,
            past_due: 450.00,
            days_overdue: 45,
            last_payment_date: "2024-06-15",
            minimum_payment: 150.00,
            phone_number: "+1234567890",
            email: "john.doe@example.com",
            status: "delinquent",
        },
    ),
    (
        "5678",
        Account {
            account_number: "ACC-005678",
            customer_name: "Jane Smith",
            balance: 1200.00,
            past_due: 200.00,
            days_overdue: 30,
            last_payment_date: "2024-07-01",
            minimum_payment: 75.00,
            phone_number: "+1987654321",
            email: "jane.smith@example.com",
            status: "delinquent",
        },
    ),
];

pub fn lookup(key: &str) -> Option<Account> {
    ACCOUNTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, account)| account.clone())
}

/// SSN digits take precedence over the account number.
pub fn find(last_four_ssn: Option<&str>, account_number: Option<&str>) -> Option<Account> {
    last_four_ssn
        .and_then(lookup)
        .or_else(|| account_number.and_then(lookup))
}
