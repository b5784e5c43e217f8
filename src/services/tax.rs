use bigdecimal::BigDecimal;

use crate::database::models::TaxBracket;
use crate::services::round_centavos;

/// Monthly withholding tax on taxable income (gross less the employee
/// shares of SSS, PhilHealth, and Pag-IBIG).
///
/// `tax(x) = base_tax + percentage% * max(0, x - excess_over)`, rounded
/// half-up to centavos. Incomes above the top bracket use the top bracket's
/// formula; incomes below the lowest bracket owe nothing. Expects the
/// slice sorted by `min_salary`.
pub fn compute_monthly_tax(brackets: &[TaxBracket], taxable_income: &BigDecimal) -> BigDecimal {
    let zero = BigDecimal::from(0);

    let Some(first) = brackets.first() else {
        log::warn!("No active withholding tax brackets seeded, withholding zero");
        return zero;
    };
    if taxable_income < &first.min_salary {
        return zero;
    }

    let bracket = brackets
        .iter()
        .find(|b| taxable_income >= &b.min_salary && taxable_income <= &b.max_salary)
        .unwrap_or_else(|| {
            let top = brackets.last().unwrap();
            if taxable_income > &top.max_salary {
                log::warn!(
                    "Taxable income {} above the top bracket, using top bracket",
                    taxable_income
                );
            }
            top
        });

    let excess = (taxable_income - &bracket.excess_over).max(zero);
    let hundred = BigDecimal::from(100);
    let tax = &bracket.base_tax + excess * &bracket.percentage / hundred;

    round_centavos(&tax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::statutory::test_fixtures::tax_table_2025;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn income_in_exempt_bracket_owes_nothing() {
        let table = tax_table_2025();
        assert_eq!(compute_monthly_tax(&table, &dec("15000")), dec("0.00"));
        assert_eq!(compute_monthly_tax(&table, &dec("20833")), dec("0.00"));
    }

    #[test]
    fn second_bracket_taxes_the_excess_only() {
        let table = tax_table_2025();
        // 25,000 taxable: 15% of (25,000 - 20,833).
        assert_eq!(compute_monthly_tax(&table, &dec("25000")), dec("625.05"));
    }

    #[test]
    fn continuity_at_bracket_boundaries() {
        let table = tax_table_2025();
        // Evaluate each boundary with the bracket below (at its ceiling) and
        // the bracket above (at its floor); they must agree within a centavo.
        let centavo = dec("0.01");
        for pair in table.windows(2) {
            let below = &pair[0];
            let above = &pair[1];

            let hundred = BigDecimal::from(100);
            let zero = BigDecimal::from(0);
            let at_ceiling = round_centavos(
                &(&below.base_tax
                    + (&below.max_salary - &below.excess_over).max(zero.clone())
                        * &below.percentage
                        / &hundred),
            );
            let at_floor = round_centavos(
                &(&above.base_tax
                    + (&above.min_salary - &above.excess_over).max(zero)
                        * &above.percentage
                        / &hundred),
            );

            let gap = (&at_floor - &at_ceiling).abs();
            assert!(
                gap <= centavo,
                "discontinuity of {} between brackets ending {} and starting {}",
                gap,
                below.max_salary,
                above.min_salary
            );
        }
    }

    #[test]
    fn income_above_top_bracket_uses_top_formula() {
        let table = tax_table_2025();
        // 1,000,000: 183,541.80 + 35% of (1,000,000 - 666,667).
        assert_eq!(
            compute_monthly_tax(&table, &dec("1000000")),
            dec("300208.35")
        );
    }

    #[test]
    fn empty_table_withholds_zero() {
        assert_eq!(compute_monthly_tax(&[], &dec("50000")), dec("0"));
    }
}
