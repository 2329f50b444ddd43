use std::ops::RangeInclusive;

use serde::Serialize;

/// Upper bound applied to every age when a form is normalised.
pub const MAX_AGE: u32 = 130;

/// Calendar years a form may start a projection in.
pub const START_YEARS: RangeInclusive<i32> = 1900..=9999;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub current_age: u32,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str, current_age: u32) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            current_age,
        }
    }
}

/// Household inputs for one projection run. Rates are percentages (`6.75`
/// means 6.75% a year).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdParams {
    pub primary: Person,
    pub partner: Option<Person>,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub annual_savings: f64,
    pub annual_savings_increase: f64,
    pub pre_retirement_return: f64,
    pub post_retirement_return: f64,
    pub current_expenses: f64,
    pub inflation_rate: f64,
    pub life_expectancy: u32,
    pub start_year: i32,
}

impl HouseholdParams {
    pub fn projection_len(&self) -> usize {
        if self.life_expectancy < self.primary.current_age {
            0
        } else {
            (self.life_expectancy - self.primary.current_age) as usize + 1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRecord {
    pub year: i32,
    pub age1: u32,
    pub age2: Option<u32>,
    pub beginning_balance: f64,
    pub contribution: f64,
    pub withdrawal: f64,
    /// Fraction, not percent.
    pub growth_rate: f64,
    pub investment_return: f64,
    pub ending_balance: f64,
    pub cost_of_living: f64,
    pub passive_income: f64,
    pub withdrawal_rate: f64,
    pub total_principal: f64,
    pub total_growth: f64,
    pub is_retired: bool,
}
