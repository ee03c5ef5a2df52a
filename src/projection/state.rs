//! Cohort state tracking during a projection

use chrono::NaiveDate;

/// State of the card book at a point in time during projection
#[derive(Debug, Clone)]
pub struct CohortState {
    /// Month offset from simulation start (0-indexed)
    pub month_index: u32,

    /// Calendar year of the current month
    pub year: i32,

    /// Calendar month (1-12)
    pub month: u32,

    /// Active cards at the end of the prior month (0 before the first month)
    pub prior_active_cards: f64,

    /// Cards issued so far in the current calendar year
    pub ytd_new_cards: f64,
}

impl CohortState {
    /// Initialize state at the calendar month containing `start`
    pub fn starting_at(start: NaiveDate) -> Self {
        use chrono::Datelike;

        Self {
            month_index: 0,
            year: start.year(),
            month: start.month(),
            prior_active_cards: 0.0,
            ytd_new_cards: 0.0,
        }
    }

    /// True for the first simulated month
    pub fn is_first_month(&self) -> bool {
        self.month_index == 0
    }

    /// True when the current month opens a calendar year after the first one
    pub fn starts_new_year(&self) -> bool {
        self.month == 1 && !self.is_first_month()
    }

    /// Last calendar day of the current month
    pub fn period_end(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Close the current month and move to the next one
    pub fn advance_month(&mut self, active_cards: f64) {
        self.prior_active_cards = active_cards;
        self.month_index += 1;

        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_year() {
        let mut state = CohortState::starting_at(NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
        assert_eq!((state.year, state.month), (2025, 11));
        assert!(state.is_first_month());

        state.advance_month(10.0);
        state.advance_month(20.0);

        assert_eq!((state.year, state.month), (2026, 1));
        assert_eq!(state.month_index, 2);
        assert_eq!(state.prior_active_cards, 20.0);
        assert!(state.starts_new_year());
    }

    #[test]
    fn test_period_end() {
        let mut state = CohortState::starting_at(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(state.period_end(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        for _ in 0..10 {
            state.advance_month(0.0);
        }
        assert_eq!(state.period_end(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_january_start_is_not_a_reset() {
        let state = CohortState::starting_at(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!state.starts_new_year());
    }
}
