use serde::{Deserialize, Serialize};

/// One month of salary as read from a payslip or keyed in by an underwriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySlipRecord {
    pub month: String,
    pub gross: f64,
    pub net: f64,
    #[serde(default)]
    pub basic: f64,
    #[serde(default)]
    pub hra: f64,
    #[serde(default)]
    pub pf: f64,
    #[serde(default)]
    pub tds: f64,
    #[serde(default)]
    pub other_deductions: f64,
    #[serde(default)]
    pub is_manual: bool,
}

impl SalarySlipRecord {
    pub fn total_deductions(&self) -> f64 {
        self.pf + self.tds + self.other_deductions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnualSource {
    Form16,
    Itr,
    Manual,
}

/// Yearly income from a tax document. `year` is the assessment or financial
/// year label exactly as printed, e.g. `"2023-24"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualIncomeRecord {
    pub year: String,
    pub source: AnnualSource,
    pub gross_income: f64,
    #[serde(default)]
    pub taxable_income: f64,
    #[serde(default)]
    pub tax_paid: f64,
    #[serde(default)]
    pub is_manual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeEvidence {
    SalarySlip(SalarySlipRecord),
    Annual(AnnualIncomeRecord),
}

impl IncomeEvidence {
    pub fn is_manual(&self) -> bool {
        match self {
            IncomeEvidence::SalarySlip(record) => record.is_manual,
            IncomeEvidence::Annual(record) => record.is_manual,
        }
    }
}

/// Consistency of monthly gross salary across the supplied slips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityRating {
    High,
    Medium,
    Low,
    NotAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub avg_monthly_gross: f64,
    pub avg_monthly_net: f64,
    pub avg_monthly_deductions: f64,
    pub avg_annual_income: f64,
    pub yoy_growth_pct: Option<f64>,
    pub stability: StabilityRating,
    pub salary_slip_count: usize,
    pub annual_record_count: usize,
    pub manual_record_count: usize,
}
