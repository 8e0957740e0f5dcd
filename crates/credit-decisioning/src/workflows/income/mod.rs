//! Income evidence reconciliation.
//!
//! Extracted and manually keyed records are combined without deduplication;
//! a payslip entered both ways counts twice.

mod domain;

pub use domain::{
    AnnualIncomeRecord, AnnualSource, IncomeEvidence, IncomeSummary, SalarySlipRecord,
    StabilityRating,
};

const HIGH_STABILITY_CV: f64 = 0.05;
const MEDIUM_STABILITY_CV: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default)]
pub struct IncomeAggregator;

impl IncomeAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Combines extracted records (first) with manual ones (after), keeping the
    /// order each list arrived in.
    pub fn aggregate(&self, extracted: &[IncomeEvidence], manual: &[IncomeEvidence]) -> IncomeSummary {
        let combined: Vec<&IncomeEvidence> = extracted.iter().chain(manual).collect();

        let slips: Vec<&SalarySlipRecord> = combined
            .iter()
            .filter_map(|evidence| match evidence {
                IncomeEvidence::SalarySlip(record) => Some(record),
                IncomeEvidence::Annual(_) => None,
            })
            .collect();
        let annual: Vec<&AnnualIncomeRecord> = combined
            .iter()
            .filter_map(|evidence| match evidence {
                IncomeEvidence::Annual(record) => Some(record),
                IncomeEvidence::SalarySlip(_) => None,
            })
            .collect();

        let gross: Vec<f64> = slips.iter().map(|slip| slip.gross).collect();

        IncomeSummary {
            avg_monthly_gross: mean(&gross),
            avg_monthly_net: mean(&slips.iter().map(|slip| slip.net).collect::<Vec<_>>()),
            avg_monthly_deductions: mean(
                &slips
                    .iter()
                    .map(|slip| slip.total_deductions())
                    .collect::<Vec<_>>(),
            ),
            avg_annual_income: mean(
                &annual
                    .iter()
                    .map(|record| record.gross_income)
                    .collect::<Vec<_>>(),
            ),
            yoy_growth_pct: yoy_growth(&annual),
            stability: stability(&gross),
            salary_slip_count: slips.len(),
            annual_record_count: annual.len(),
            manual_record_count: combined.iter().filter(|evidence| evidence.is_manual()).count(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Growth between the lexicographically first and last year labels.
fn yoy_growth(annual: &[&AnnualIncomeRecord]) -> Option<f64> {
    if annual.len() < 2 {
        return None;
    }
    let mut ordered = annual.to_vec();
    ordered.sort_by(|a, b| a.year.cmp(&b.year));

    let oldest = ordered.first()?.gross_income;
    let latest = ordered.last()?.gross_income;
    if oldest == 0.0 {
        return None;
    }
    let growth = (latest - oldest) / oldest * 100.0;
    Some((growth * 100.0).round() / 100.0)
}

/// Coefficient of variation (population standard deviation over mean) of gross salary.
fn stability(gross: &[f64]) -> StabilityRating {
    if gross.len() < 2 {
        return StabilityRating::NotAvailable;
    }
    let average = mean(gross);
    if average <= 0.0 {
        return StabilityRating::NotAvailable;
    }
    let variance = gross
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / gross.len() as f64;
    let cv = variance.sqrt() / average;

    if cv < HIGH_STABILITY_CV {
        StabilityRating::High
    } else if cv < MEDIUM_STABILITY_CV {
        StabilityRating::Medium
    } else {
        StabilityRating::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slip(month: &str, gross: f64, net: f64, is_manual: bool) -> IncomeEvidence {
        IncomeEvidence::SalarySlip(SalarySlipRecord {
            month: month.to_string(),
            gross,
            net,
            basic: gross * 0.5,
            hra: gross * 0.2,
            pf: 1800.0,
            tds: 2000.0,
            other_deductions: 200.0,
            is_manual,
        })
    }

    fn annual(year: &str, gross_income: f64, source: AnnualSource) -> IncomeEvidence {
        IncomeEvidence::Annual(AnnualIncomeRecord {
            year: year.to_string(),
            source,
            gross_income,
            taxable_income: gross_income * 0.8,
            tax_paid: gross_income * 0.1,
            is_manual: source == AnnualSource::Manual,
        })
    }

    #[test]
    fn identical_salaries_are_highly_stable() {
        let summary = IncomeAggregator::new().aggregate(
            &[slip("2024-05", 100000.0, 90000.0, false)],
            &[slip("2024-06", 100000.0, 90000.0, true)],
        );
        assert_eq!(summary.stability, StabilityRating::High);
        assert_eq!(summary.avg_monthly_gross, 100000.0);
        assert_eq!(summary.avg_monthly_deductions, 4000.0);
        assert_eq!(summary.manual_record_count, 1);
    }

    #[test]
    fn volatile_salaries_are_low_stability() {
        let summary = IncomeAggregator::new().aggregate(
            &[
                slip("2024-05", 100000.0, 90000.0, false),
                slip("2024-06", 70000.0, 60000.0, false),
            ],
            &[],
        );
        assert_eq!(summary.stability, StabilityRating::Low);
        assert_eq!(summary.avg_monthly_gross, 85000.0);
        assert_eq!(summary.avg_monthly_net, 75000.0);
    }

    #[test]
    fn moderate_variation_is_medium_stability() {
        let summary = IncomeAggregator::new().aggregate(
            &[
                slip("2024-05", 100000.0, 90000.0, false),
                slip("2024-06", 120000.0, 100000.0, false),
            ],
            &[],
        );
        // mean 110000, std-dev 10000, cv ~9%
        assert_eq!(summary.stability, StabilityRating::Medium);
    }

    #[test]
    fn empty_evidence_yields_zeros() {
        let summary = IncomeAggregator::new().aggregate(&[], &[]);
        assert_eq!(summary.avg_monthly_gross, 0.0);
        assert_eq!(summary.avg_annual_income, 0.0);
        assert_eq!(summary.yoy_growth_pct, None);
        assert_eq!(summary.stability, StabilityRating::NotAvailable);
    }

    #[test]
    fn single_slip_has_no_stability_rating() {
        let summary =
            IncomeAggregator::new().aggregate(&[slip("2024-06", 100000.0, 90000.0, false)], &[]);
        assert_eq!(summary.stability, StabilityRating::NotAvailable);
    }

    #[test]
    fn yoy_growth_compares_oldest_and_latest_year_labels() {
        let summary = IncomeAggregator::new().aggregate(
            &[
                annual("2023-24", 1320000.0, AnnualSource::Itr),
                annual("2021-22", 1000000.0, AnnualSource::Form16),
            ],
            &[annual("2022-23", 1100000.0, AnnualSource::Manual)],
        );
        assert_eq!(summary.yoy_growth_pct, Some(32.0));
        assert_eq!(summary.annual_record_count, 3);
        assert_eq!(summary.avg_annual_income, 1140000.0);
    }

    #[test]
    fn yoy_growth_unavailable_when_oldest_is_zero() {
        let summary = IncomeAggregator::new().aggregate(
            &[
                annual("2022-23", 0.0, AnnualSource::Itr),
                annual("2023-24", 500000.0, AnnualSource::Itr),
            ],
            &[],
        );
        assert_eq!(summary.yoy_growth_pct, None);
    }

    #[test]
    fn duplicates_across_sources_are_counted_twice() {
        let record = slip("2024-06", 100000.0, 90000.0, false);
        let summary = IncomeAggregator::new().aggregate(&[record.clone()], &[record]);
        assert_eq!(summary.salary_slip_count, 2);
    }

    #[test]
    fn evidence_deserializes_with_kind_tag() {
        let evidence: IncomeEvidence = serde_json::from_value(serde_json::json!({
            "kind": "annual",
            "year": "2023-24",
            "source": "form16",
            "gross_income": 900000.0
        }))
        .expect("deserializes");
        assert!(matches!(evidence, IncomeEvidence::Annual(ref record) if record.source == AnnualSource::Form16));
        assert!(!evidence.is_manual());
    }
}
