use super::fields::{first_present, optional_money};
use super::report::{AccountStatus, AccountsSummary, TradeLine};
use serde_json::Value;

const SUMMARY_KEYS: &[&str] = &["RetailAccountsSummary", "RetailAccountSummary"];

/// Bureau-reported summary values take precedence. A value is recomputed from
/// the parsed tradelines only when its field is absent, never when the bureau
/// reported zero.
pub(crate) fn summarize(report: &Value, accounts: &[TradeLine]) -> AccountsSummary {
    let reported = first_present(report, SUMMARY_KEYS).filter(|block| block.is_object());
    let field = |key: &str| reported.and_then(|block| optional_money(block, key));

    let sum = |select: fn(&TradeLine) -> f64| accounts.iter().map(select).sum::<f64>();
    let active = || {
        accounts
            .iter()
            .filter(|account| account.status == AccountStatus::Active)
    };

    AccountsSummary {
        total_accounts: field("NoOfAccounts")
            .map(|count| count as u32)
            .unwrap_or(accounts.len() as u32),
        active_accounts: field("NoOfActiveAccounts")
            .map(|count| count as u32)
            .unwrap_or_else(|| active().count() as u32),
        total_balance: field("TotalBalanceAmount").unwrap_or_else(|| sum(|a| a.current_balance)),
        total_past_due: field("TotalPastDue").unwrap_or_else(|| sum(|a| a.past_due_amount)),
        total_sanctioned: field("TotalSanctionAmount")
            .unwrap_or_else(|| sum(|a| a.sanction_amount)),
        total_credit_limit: field("TotalCreditLimit").unwrap_or_else(|| sum(|a| a.credit_limit)),
        total_monthly_payment: field("TotalMonthlyPaymentAmount")
            .unwrap_or_else(|| active().map(|a| a.emi_amount).sum()),
    }
}
