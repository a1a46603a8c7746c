//! Mock payment arithmetic shared by the collections functions.

use serde::Serialize;

pub const FULL_PAYMENT_DISCOUNT: f64 = 0.10;
pub const SETTLEMENT_RATE: f64 = 0.60;
pub const PLAN_MONTHS: [u32; 3] = [3, 6, 12];

/// Above this expenses-to-income ratio a caller qualifies for hardship.
pub const HARDSHIP_RATIO_THRESHOLD: f64 = 0.8;
const HARDSHIP_KEYWORDS: [&str; 2] = ["medical", "unemployment"];

/// Rounds half away from zero to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentOption {
    FullPayment {
        amount: f64,
        description: String,
        discount: f64,
        final_amount: f64,
    },
    PaymentPlan {
        months: u32,
        monthly_payment: f64,
        total_amount: f64,
        description: String,
    },
    Settlement {
        amount: f64,
        description: String,
        savings: f64,
    },
}

/// Full payment, one plan per entry of [`PLAN_MONTHS`], then settlement.
///
/// Only the monthly payment is rounded; every other figure is the raw product.
pub fn payment_options(balance: f64) -> Vec<PaymentOption> {
    let mut options = Vec::with_capacity(PLAN_MONTHS.len() + 2);
    options.push(PaymentOption::FullPayment {
        amount: balance,
        description: "Pay in full today with 10% discount".to_string(),
        discount: balance * FULL_PAYMENT_DISCOUNT,
        final_amount: balance * (1.0 - FULL_PAYMENT_DISCOUNT),
    });
    for months in PLAN_MONTHS {
        options.push(PaymentOption::PaymentPlan {
            months,
            monthly_payment: monthly_payment(balance, months),
            total_amount: balance,
            description: format!("{months}-month payment plan"),
        });
    }
    options.push(PaymentOption::Settlement {
        amount: balance * SETTLEMENT_RATE,
        description: "One-time settlement offer".to_string(),
        savings: balance * (1.0 - SETTLEMENT_RATE),
    });
    options
}

pub fn monthly_payment(total: f64, months: u32) -> f64 {
    round2(total / f64::from(months))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardshipAssessment {
    pub eligible: bool,
    pub debt_to_income_ratio: f64,
    pub recommended_program: &'static str,
    pub discount_available: f64,
}

pub fn assess_hardship(income: f64, expenses: f64, reason: &str) -> HardshipAssessment {
    let debt_to_income_ratio = if income > 0.0 { expenses / income } else { 1.0 };
    let reason = reason.to_lowercase();
    let eligible = debt_to_income_ratio > HARDSHIP_RATIO_THRESHOLD
        || HARDSHIP_KEYWORDS.iter().any(|k| reason.contains(k));
    HardshipAssessment {
        eligible,
        debt_to_income_ratio,
        recommended_program: if eligible {
            "hardship_payment_plan"
        } else {
            "standard_payment_plan"
        },
        discount_available: if eligible { 0.25 } else { 0.10 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn options_for_2500() {
        let options = payment_options(2500.0);
        assert_eq!(options.len(), 5);

        let PaymentOption::FullPayment { amount, discount, final_amount, .. } = &options[0] else {
            panic!("first option should be full payment");
        };
        assert!(close(*amount, 2500.0));
        assert!(close(*discount, 250.0));
        assert!(close(*final_amount, 2250.0));

        let monthly: Vec<f64> = options[1..4]
            .iter()
            .map(|o| match o {
                PaymentOption::PaymentPlan { monthly_payment, total_amount, .. } => {
                    assert!(close(*total_amount, 2500.0));
                    *monthly_payment
                }
                other => panic!("expected a plan, got {other:?}"),
            })
            .collect();
        assert_eq!(monthly, vec![833.33, 416.67, 208.33]);

        let PaymentOption::Settlement { amount, savings, .. } = &options[4] else {
            panic!("last option should be settlement");
        };
        assert!(close(*amount, 1500.0));
        assert!(close(*savings, 1000.0));
    }

    #[test]
    fn options_serialize_with_type_tag() {
        let json = serde_json::to_value(payment_options(300.0)).unwrap();
        assert_eq!(json[0]["type"], "full_payment");
        assert_eq!(json[1]["type"], "payment_plan");
        assert_eq!(json[1]["months"], 3);
        assert_eq!(json[1]["description"], "3-month payment plan");
        assert_eq!(json[4]["type"], "settlement");
        assert_eq!(json[4]["description"], "One-time settlement offer");
    }

    #[test]
    fn hardship_by_ratio() {
        let high = assess_hardship(1000.0, 900.0, "car repairs");
        assert!(high.eligible);
        assert!(close(high.debt_to_income_ratio, 0.9));
        assert_eq!(high.recommended_program, "hardship_payment_plan");
        assert!(close(high.discount_available, 0.25));

        let low = assess_hardship(1000.0, 800.0, "car repairs");
        assert!(!low.eligible);
        assert_eq!(low.recommended_program, "standard_payment_plan");
        assert!(close(low.discount_available, 0.10));
    }

    #[test]
    fn hardship_by_reason_ignores_case() {
        assert!(assess_hardship(5000.0, 100.0, "Recent MEDICAL bills").eligible);
        assert!(assess_hardship(5000.0, 100.0, "Unemployment since May").eligible);
    }

    #[test]
    fn zero_income_is_guarded() {
        let result = assess_hardship(0.0, 1200.0, "other");
        assert!(close(result.debt_to_income_ratio, 1.0));
        assert!(result.eligible);
    }

    #[test]
    fn rounding_is_to_cents() {
        assert_eq!(round2(833.333_333), 833.33);
        assert_eq!(round2(416.666_666), 416.67);
        assert_eq!(monthly_payment(100.0, 3), 33.33);
    }
}
