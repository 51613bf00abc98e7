//! Payroll and company invoice calculation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::InvoiceError;
use super::types::{
    CompanyInvoiceSummary, CompanyTotals, ExtraLine, MemberFees, MonthlyTotals, UserInvoiceSummary,
};
use crate::period::Period;

/// VAT rate applied on both tiers.
pub const VAT_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Invoice calculation engine.
pub struct InvoiceService;

impl InvoiceService {
    /// Computes a member's monthly payroll.
    ///
    /// Fractions of a won are truncated toward zero at each step. The second
    /// VAT tier only applies when the month has extras.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Overflow` if an amount leaves the `i64` range.
    pub fn calculate_user_invoice(
        user_id: i64,
        period: Period,
        fees: MemberFees,
        totals: MonthlyTotals,
        extra: Vec<ExtraLine>,
    ) -> Result<UserInvoiceSummary, InvoiceError> {
        let total_revenue = totals
            .revenue
            .checked_add(totals.cancel_fee)
            .ok_or(InvoiceError::Overflow)?;
        let total_contract_fee =
            truncate(Decimal::from(total_revenue) * fees.contract_fee / Decimal::ONE_HUNDRED)?;
        let net_revenue = total_revenue - total_contract_fee;
        let first_vat = truncate(Decimal::from(net_revenue) * VAT_RATE)?;
        let first_income = net_revenue
            .checked_add(first_vat)
            .and_then(|v| v.checked_sub(fees.plate_fee))
            .ok_or(InvoiceError::Overflow)?;

        let (second_vat, second_income, income) = if extra.is_empty() {
            (0, 0, first_income)
        } else {
            let with_extra = first_income
                .checked_add(sum_extra(&extra)?)
                .ok_or(InvoiceError::Overflow)?;
            let second_vat = truncate(Decimal::from(with_extra) * VAT_RATE)?;
            let second_income = with_extra
                .checked_add(second_vat)
                .ok_or(InvoiceError::Overflow)?;
            (second_vat, second_income, second_income)
        };

        Ok(UserInvoiceSummary {
            user_id,
            year: period.year,
            month: period.month,
            contract_fee: fees.contract_fee,
            plate_fee: fees.plate_fee,
            transaction_count: totals.transaction_count,
            canceled_transaction_count: totals.canceled_transaction_count,
            revenue: totals.revenue,
            cancel_fee: totals.cancel_fee,
            total_revenue,
            total_contract_fee,
            first_vat,
            first_income,
            extra,
            second_vat,
            second_income,
            income,
        })
    }

    /// Computes the company's monthly summary.
    ///
    /// `income` is only produced when both the rental and the maintenance fee
    /// are supplied.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Overflow` if an amount leaves the `i64` range.
    pub fn calculate_company_invoice(
        period: Period,
        totals: CompanyTotals,
        extra: Vec<ExtraLine>,
        rental_fee: Option<i64>,
        maintenance_fee: Option<i64>,
    ) -> Result<CompanyInvoiceSummary, InvoiceError> {
        let income = match (rental_fee, maintenance_fee) {
            (Some(rental), Some(maintenance)) => {
                let gross = totals.revenue.checked_add(totals.plate_fee);
                let costs = totals
                    .employee_salary
                    .checked_add(rental)
                    .and_then(|v| v.checked_add(maintenance));
                let extra_price = sum_extra(&extra)?;
                let income = gross
                    .zip(costs)
                    .and_then(|(gross, costs)| gross.checked_sub(costs))
                    .and_then(|v| v.checked_add(extra_price))
                    .ok_or(InvoiceError::Overflow)?;
                Some(income)
            }
            _ => None,
        };

        Ok(CompanyInvoiceSummary {
            year: period.year,
            month: period.month,
            revenue: totals.revenue,
            plate_fee: totals.plate_fee,
            employee_salary: totals.employee_salary,
            extra,
            rental_fee,
            maintenance_fee,
            income,
        })
    }

    /// Checks the fee terms stored on a member.
    ///
    /// # Errors
    ///
    /// Returns the first fee that is out of bounds.
    pub fn validate_fees(
        plate_fee: Option<i64>,
        contract_fee: Option<Decimal>,
    ) -> Result<(), InvoiceError> {
        if plate_fee.is_some_and(|fee| fee < 0) {
            return Err(InvoiceError::NegativePlateFee);
        }
        if contract_fee.is_some_and(|fee| fee < Decimal::ZERO || fee > Decimal::ONE_HUNDRED) {
            return Err(InvoiceError::InvalidContractFee);
        }
        Ok(())
    }
}

fn sum_extra(extra: &[ExtraLine]) -> Result<i64, InvoiceError> {
    extra
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.price))
        .ok_or(InvoiceError::Overflow)
}

fn truncate(value: Decimal) -> Result<i64, InvoiceError> {
    value.trunc().to_i64().ok_or(InvoiceError::Overflow)
}
