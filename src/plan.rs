//! Yearly sales plans: one plan per user and year, twelve monthly records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::numeric::total_add;
use crate::pricing::reconciler::percentage_of;

/// Planned and actual figures for one month.
///
/// Actuals come from the backend and are never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPlanDetail {
    pub month: u32,
    #[serde(default)]
    pub sales_plan: Decimal,
    #[serde(default)]
    pub clients_plan: u32,
    #[serde(default)]
    pub sales_count_plan: u32,
    #[serde(default)]
    pub actual_sales: Decimal,
    #[serde(default)]
    pub actual_clients: u32,
    #[serde(default)]
    pub actual_sales_count: u32,
}

impl SalesPlanDetail {
    pub fn empty(month: u32) -> Self {
        Self {
            month,
            sales_plan: Decimal::ZERO,
            clients_plan: 0,
            sales_count_plan: 0,
            actual_sales: Decimal::ZERO,
            actual_clients: 0,
            actual_sales_count: 0,
        }
    }

    pub fn sales_percentage(&self) -> Decimal {
        percentage_of(self.actual_sales, self.sales_plan)
    }

    pub fn clients_percentage(&self) -> Decimal {
        percentage_of(
            Decimal::from(self.actual_clients),
            Decimal::from(self.clients_plan),
        )
    }

    pub fn sales_count_percentage(&self) -> Decimal {
        percentage_of(
            Decimal::from(self.actual_sales_count),
            Decimal::from(self.sales_count_plan),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub user: u64,
    pub year: i32,
    #[serde(default)]
    pub details: Vec<SalesPlanDetail>,
}

/// Month record as sent on create/update.
#[derive(Debug, Serialize)]
pub struct PlanDetailPayload {
    pub month: u32,
    pub sales_plan: String,
    pub clients_plan: u32,
    pub sales_count_plan: u32,
}

#[derive(Debug, Serialize)]
pub struct PlanPayload {
    pub user: u64,
    pub year: i32,
    pub details: Vec<PlanDetailPayload>,
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(OrderError::InvalidMonth(month))
    }
}

impl YearlyPlan {
    /// A fresh plan with twelve zeroed months.
    pub fn new(user: u64, year: i32) -> Self {
        Self {
            id: None,
            user,
            year,
            details: (1..=12).map(SalesPlanDetail::empty).collect(),
        }
    }

    pub fn month(&self, month: u32) -> Result<&SalesPlanDetail> {
        check_month(month)?;
        self.details
            .iter()
            .find(|d| d.month == month)
            .ok_or_else(|| OrderError::InvalidPlan {
                year: self.year,
                reason: format!("month {month} is missing"),
            })
    }

    /// Sets the planned figures of one month, adding the month if the
    /// backend returned a partial plan.
    pub fn set_month(
        &mut self,
        month: u32,
        sales_plan: Decimal,
        clients_plan: u32,
        sales_count_plan: u32,
    ) -> Result<()> {
        check_month(month)?;
        let index = match self.details.iter().position(|d| d.month == month) {
            Some(index) => index,
            None => {
                self.details.push(SalesPlanDetail::empty(month));
                self.details.sort_by_key(|d| d.month);
                self.details
                    .iter()
                    .position(|d| d.month == month)
                    .unwrap_or_default()
            }
        };

        let detail = &mut self.details[index];
        detail.sales_plan = sales_plan;
        detail.clients_plan = clients_plan;
        detail.sales_count_plan = sales_count_plan;
        Ok(())
    }

    /// Requires each month 1-12 exactly once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; 12];
        for detail in &self.details {
            check_month(detail.month).map_err(|_| OrderError::InvalidPlan {
                year: self.year,
                reason: format!("month {} is out of range", detail.month),
            })?;
            let slot = &mut seen[(detail.month - 1) as usize];
            if *slot {
                return Err(OrderError::InvalidPlan {
                    year: self.year,
                    reason: format!("month {} appears twice", detail.month),
                });
            }
            *slot = true;
        }

        if let Some(missing) = seen.iter().position(|present| !present) {
            return Err(OrderError::InvalidPlan {
                year: self.year,
                reason: format!("month {} is missing", missing + 1),
            });
        }
        Ok(())
    }

    /// Year totals, carried in a detail with month 0.
    pub fn totals(&self) -> SalesPlanDetail {
        self.details
            .iter()
            .fold(SalesPlanDetail::empty(0), |mut acc, d| {
                acc.sales_plan = total_add(acc.sales_plan, d.sales_plan);
                acc.clients_plan = acc.clients_plan.saturating_add(d.clients_plan);
                acc.sales_count_plan = acc.sales_count_plan.saturating_add(d.sales_count_plan);
                acc.actual_sales = total_add(acc.actual_sales, d.actual_sales);
                acc.actual_clients = acc.actual_clients.saturating_add(d.actual_clients);
                acc.actual_sales_count =
                    acc.actual_sales_count.saturating_add(d.actual_sales_count);
                acc
            })
    }

    pub fn payload(&self) -> Result<PlanPayload> {
        self.validate()?;
        let mut details: Vec<PlanDetailPayload> = self
            .details
            .iter()
            .map(|d| PlanDetailPayload {
                month: d.month,
                sales_plan: crate::numeric::money_string(d.sales_plan),
                clients_plan: d.clients_plan,
                sales_count_plan: d.sales_count_plan,
            })
            .collect();
        details.sort_by_key(|d| d.month);

        Ok(PlanPayload {
            user: self.user,
            year: self.year,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn new_plan_has_twelve_months() {
        let plan = YearlyPlan::new(3, 2026);

        assert_eq!(plan.details.len(), 12);
        assert!(plan.validate().is_ok());
        assert_eq!(plan.month(12).unwrap().sales_plan, Decimal::ZERO);
    }

    #[test]
    fn totals_of_oversized_months_saturate() {
        let huge = crate::numeric::parse_number("70000000000000000000000000000", Decimal::ZERO);
        let mut plan = YearlyPlan::new(3, 2026);
        plan.set_month(1, huge, u32::MAX, 1).unwrap();
        plan.set_month(2, huge, 5, 2).unwrap();

        let totals = plan.totals();

        assert_eq!(totals.month, 0);
        assert_eq!(totals.sales_plan, Decimal::ZERO);
        assert_eq!(totals.clients_plan, u32::MAX);
        assert_eq!(totals.sales_count_plan, 3);
    }

    #[test]
    fn set_month_updates_only_planned_figures() {
        let mut plan = YearlyPlan::new(3, 2026);
        plan.details[2].actual_sales = dec!(900);

        plan.set_month(3, dec!(1200), 10, 25).unwrap();

        let march = plan.month(3).unwrap();
        assert_eq!(march.sales_plan, dec!(1200));
        assert_eq!(march.clients_plan, 10);
        assert_eq!(march.sales_count_plan, 25);
        assert_eq!(march.actual_sales, dec!(900));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let mut plan = YearlyPlan::new(3, 2026);

        assert!(matches!(
            plan.set_month(13, dec!(1), 1, 1),
            Err(OrderError::InvalidMonth(13))
        ));
        assert!(matches!(plan.month(0), Err(OrderError::InvalidMonth(0))));
    }

    #[test]
    fn partial_plan_gains_missing_month_in_order() {
        let mut plan = YearlyPlan {
            id: Some(9),
            user: 3,
            year: 2026,
            details: vec![SalesPlanDetail::empty(1), SalesPlanDetail::empty(5)],
        };

        plan.set_month(3, dec!(10), 1, 1).unwrap();

        let months: Vec<u32> = plan.details.iter().map(|d| d.month).collect();
        assert_eq!(months, vec![1, 3, 5]);
        assert_eq!(plan.month(3).unwrap().sales_plan, dec!(10));
    }

    #[test]
    fn validation_reports_duplicates_and_gaps() {
        let mut plan = YearlyPlan::new(3, 2026);
        plan.details[4].month = 4;
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("month 4 appears twice"));

        let mut plan = YearlyPlan::new(3, 2026);
        plan.details.pop();
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("month 12 is missing"));
    }

    #[test]
    fn percentages_are_zero_without_a_plan() {
        let mut detail = SalesPlanDetail::empty(1);
        detail.actual_sales = dec!(500);
        assert_eq!(detail.sales_percentage(), Decimal::ZERO);

        detail.sales_plan = dec!(1000);
        detail.clients_plan = 4;
        detail.actual_clients = 5;
        assert_eq!(detail.sales_percentage(), dec!(50));
        assert_eq!(detail.clients_percentage(), dec!(125));
    }

    #[test]
    fn totals_sum_every_month() {
        let mut plan = YearlyPlan::new(3, 2026);
        plan.set_month(1, dec!(100), 1, 2).unwrap();
        plan.set_month(2, dec!(250.5), 3, 4).unwrap();
        plan.details[0].actual_sales = dec!(50);

        let totals = plan.totals();
        assert_eq!(totals.sales_plan, dec!(350.5));
        assert_eq!(totals.clients_plan, 4);
        assert_eq!(totals.sales_count_plan, 6);
        assert_eq!(totals.actual_sales, dec!(50));
    }

    #[test]
    fn payload_omits_actuals() {
        let mut plan = YearlyPlan::new(3, 2026);
        plan.set_month(1, dec!(100), 1, 2).unwrap();
        plan.details[0].actual_sales = dec!(80);

        let value = serde_json::to_value(plan.payload().unwrap()).unwrap();
        let january = &value["details"][0];

        assert_eq!(value["user"], 3);
        assert_eq!(value["year"], 2026);
        assert_eq!(january["sales_plan"], "100.00");
        assert!(january.get("actual_sales").is_none());
        assert_eq!(value["details"].as_array().unwrap().len(), 12);
    }
}
