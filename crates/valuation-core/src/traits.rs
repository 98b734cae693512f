use crate::types::{
    BalanceSheet, CashFlowStatement, Currency, IncomeStatement, Provenance, ValidityPolicy,
};

/// Structural interface over the three statement types. The merge and
/// gap-filling engines walk fields generically by name instead of
/// special-casing each record shape.
pub trait Statement: Clone + Default + PartialEq {
    /// Numeric field names, in declaration order.
    const FIELD_NAMES: &'static [&'static str];
    /// Divisor applied to each field when a quarterly value is derived
    /// from a yearly statement. Flow quantities quarter to 1/4; balance
    /// sheets are point-in-time and keep their values.
    const YEARLY_DIVISOR: f64;

    fn get(&self, field: &str) -> Currency;
    fn set(&mut self, field: &str, value: Currency);

    fn estimate(&self) -> bool;
    fn set_estimate(&mut self, estimate: bool);
    fn source(&self) -> Option<Provenance>;
    fn set_source(&mut self, source: Option<Provenance>);

    /// Whether the statement carries enough reported data to be used as-is.
    /// Invalid statements are treated as absent and become gap-fill
    /// candidates.
    fn is_valid(&self, policy: &ValidityPolicy) -> bool;

    /// All-zero financial fields is the canonical empty sentinel,
    /// regardless of provenance metadata.
    fn is_empty(&self) -> bool {
        Self::FIELD_NAMES.iter().all(|f| self.get(f) == 0.0)
    }

    fn is_empty_or_invalid(&self, policy: &ValidityPolicy) -> bool {
        self.is_empty() || !self.is_valid(policy)
    }
}

impl Statement for IncomeStatement {
    const FIELD_NAMES: &'static [&'static str] = &[
        "total_revenue",
        "net_income",
        "income_before_tax",
        "interest_income",
        "interest_expense",
    ];
    const YEARLY_DIVISOR: f64 = 4.0;

    fn get(&self, field: &str) -> Currency {
        match field {
            "total_revenue" => self.total_revenue,
            "net_income" => self.net_income,
            "income_before_tax" => self.income_before_tax,
            "interest_income" => self.interest_income,
            "interest_expense" => self.interest_expense,
            _ => 0.0,
        }
    }

    fn set(&mut self, field: &str, value: Currency) {
        match field {
            "total_revenue" => self.total_revenue = value,
            "net_income" => self.net_income = value,
            "income_before_tax" => self.income_before_tax = value,
            "interest_income" => self.interest_income = value,
            "interest_expense" => self.interest_expense = value,
            _ => {}
        }
    }

    fn estimate(&self) -> bool {
        self.estimate
    }

    fn set_estimate(&mut self, estimate: bool) {
        self.estimate = estimate;
    }

    fn source(&self) -> Option<Provenance> {
        self.source
    }

    fn set_source(&mut self, source: Option<Provenance>) {
        self.source = source;
    }

    fn is_valid(&self, _policy: &ValidityPolicy) -> bool {
        self.total_revenue != 0.0 && self.net_income != 0.0 && self.income_before_tax != 0.0
    }
}

impl Statement for BalanceSheet {
    const FIELD_NAMES: &'static [&'static str] = &[
        "assets",
        "current_assets",
        "liabilities",
        "current_liabilities",
        "retained_earnings",
        "cash",
    ];
    const YEARLY_DIVISOR: f64 = 1.0;

    fn get(&self, field: &str) -> Currency {
        match field {
            "assets" => self.assets,
            "current_assets" => self.current_assets,
            "liabilities" => self.liabilities,
            "current_liabilities" => self.current_liabilities,
            "retained_earnings" => self.retained_earnings,
            "cash" => self.cash,
            _ => 0.0,
        }
    }

    fn set(&mut self, field: &str, value: Currency) {
        match field {
            "assets" => self.assets = value,
            "current_assets" => self.current_assets = value,
            "liabilities" => self.liabilities = value,
            "current_liabilities" => self.current_liabilities = value,
            "retained_earnings" => self.retained_earnings = value,
            "cash" => self.cash = value,
            _ => {}
        }
    }

    fn estimate(&self) -> bool {
        self.estimate
    }

    fn set_estimate(&mut self, estimate: bool) {
        self.estimate = estimate;
    }

    fn source(&self) -> Option<Provenance> {
        self.source
    }

    fn set_source(&mut self, source: Option<Provenance>) {
        self.source = source;
    }

    fn is_valid(&self, policy: &ValidityPolicy) -> bool {
        if self.assets == 0.0
            || self.current_assets == 0.0
            || self.liabilities == 0.0
            || self.cash == 0.0
        {
            return false;
        }
        if policy.require_current_liabilities && self.current_liabilities == 0.0 {
            return false;
        }
        if policy.require_retained_earnings && self.retained_earnings == 0.0 {
            return false;
        }
        true
    }
}

impl Statement for CashFlowStatement {
    const FIELD_NAMES: &'static [&'static str] =
        &["dividends_paid", "cash_from_operations", "capex"];
    const YEARLY_DIVISOR: f64 = 4.0;

    fn get(&self, field: &str) -> Currency {
        match field {
            "dividends_paid" => self.dividends_paid,
            "cash_from_operations" => self.cash_from_operations,
            "capex" => self.capex,
            _ => 0.0,
        }
    }

    fn set(&mut self, field: &str, value: Currency) {
        match field {
            "dividends_paid" => self.dividends_paid = value,
            "cash_from_operations" => self.cash_from_operations = value,
            "capex" => self.capex = value,
            _ => {}
        }
    }

    fn estimate(&self) -> bool {
        self.estimate
    }

    fn set_estimate(&mut self, estimate: bool) {
        self.estimate = estimate;
    }

    fn source(&self) -> Option<Provenance> {
        self.source
    }

    fn set_source(&mut self, source: Option<Provenance>) {
        self.source = source;
    }

    fn is_valid(&self, _policy: &ValidityPolicy) -> bool {
        // Dividends may legitimately be zero.
        self.cash_from_operations != 0.0 && self.capex != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel_ignores_metadata() {
        let mut statement = IncomeStatement::default();
        statement.estimate = true;
        statement.source = Some(Provenance::Trend);
        assert!(statement.is_empty());

        statement.total_revenue = 1.0;
        assert!(!statement.is_empty());
    }

    #[test]
    fn test_balance_sheet_validity_policy() {
        let sheet = BalanceSheet {
            assets: 100.0,
            current_assets: 40.0,
            liabilities: 60.0,
            current_liabilities: 20.0,
            retained_earnings: 0.0,
            cash: 10.0,
            ..Default::default()
        };

        // Zero retained earnings is fine under the default policy.
        assert!(sheet.is_valid(&ValidityPolicy::default()));

        let strict = ValidityPolicy {
            require_retained_earnings: true,
            ..Default::default()
        };
        assert!(!sheet.is_valid(&strict));

        let lenient = ValidityPolicy {
            require_current_liabilities: false,
            ..Default::default()
        };
        let mut no_cl = sheet.clone();
        no_cl.current_liabilities = 0.0;
        assert!(!no_cl.is_valid(&ValidityPolicy::default()));
        assert!(no_cl.is_valid(&lenient));
    }

    #[test]
    fn test_field_roundtrip_by_name() {
        let mut sheet = BalanceSheet::default();
        for (i, field) in BalanceSheet::FIELD_NAMES.iter().enumerate() {
            sheet.set(field, (i + 1) as f64);
        }
        assert_eq!(sheet.assets, 1.0);
        assert_eq!(sheet.cash, 6.0);
        assert_eq!(sheet.get("retained_earnings"), 5.0);
    }
}
