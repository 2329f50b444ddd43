use super::types::{HouseholdParams, ProjectionRecord};

/// Running values carried from one simulated year to the next.
#[derive(Debug, Clone, Copy)]
struct YearState {
    beginning_balance: f64,
    annual_savings: f64,
    annual_expenses: f64,
    cumulative_principal: f64,
}

impl YearState {
    fn opening(params: &HouseholdParams) -> Self {
        Self {
            beginning_balance: params.current_savings,
            annual_savings: params.annual_savings,
            annual_expenses: params.current_expenses,
            cumulative_principal: params.current_savings,
        }
    }
}

/// Runs the year-by-year projection from the primary person's current age
/// through `life_expectancy` inclusive. An inverted range yields no records.
pub fn project(params: &HouseholdParams) -> Vec<ProjectionRecord> {
    let start_age = params.primary.current_age;
    if params.life_expectancy < start_age {
        return Vec::new();
    }

    let mut records = Vec::with_capacity(params.projection_len());
    records.extend(
        (start_age..=params.life_expectancy).scan(YearState::opening(params), |state, age1| {
            let (record, next) = simulate_year(params, *state, age1);
            *state = next;
            Some(record)
        }),
    );
    records
}

fn simulate_year(
    params: &HouseholdParams,
    state: YearState,
    age1: u32,
) -> (ProjectionRecord, YearState) {
    let years_elapsed = age1 - params.primary.current_age;
    let is_retired = age1 >= params.retirement_age;
    let growth_rate = if is_retired {
        params.post_retirement_return
    } else {
        params.pre_retirement_return
    } / 100.0;

    let contribution = if is_retired { 0.0 } else { state.annual_savings };
    let withdrawal = if is_retired { state.annual_expenses } else { 0.0 };

    // Flows land before growth is applied for the year.
    let invested = state.beginning_balance + contribution - withdrawal;
    let investment_return = invested * growth_rate;
    let ending_balance = invested + investment_return;

    let cumulative_principal = state.cumulative_principal + contribution;
    let (total_principal, total_growth) = split_principal(cumulative_principal, ending_balance);

    let record = ProjectionRecord {
        year: params.start_year.saturating_add_unsigned(years_elapsed),
        age1,
        age2: params
            .partner
            .as_ref()
            .map(|partner| partner.current_age.saturating_add(years_elapsed)),
        beginning_balance: state.beginning_balance,
        contribution,
        withdrawal,
        growth_rate,
        investment_return,
        ending_balance,
        cost_of_living: state.annual_expenses,
        passive_income: state.beginning_balance * growth_rate,
        withdrawal_rate: withdrawal_rate(is_retired, withdrawal, state.beginning_balance),
        total_principal,
        total_growth,
        is_retired,
    };

    let next = YearState {
        beginning_balance: ending_balance,
        annual_savings: state.annual_savings * (1.0 + params.annual_savings_increase / 100.0),
        annual_expenses: state.annual_expenses * (1.0 + params.inflation_rate / 100.0),
        cumulative_principal,
    };

    (record, next)
}

/// Display split of the ending balance. Growth saturates at zero once
/// withdrawals have eaten into contributed principal.
fn split_principal(cumulative_principal: f64, ending_balance: f64) -> (f64, f64) {
    let principal = cumulative_principal.min(ending_balance);
    (principal, (ending_balance - principal).max(0.0))
}

fn withdrawal_rate(is_retired: bool, withdrawal: f64, beginning_balance: f64) -> f64 {
    if is_retired && beginning_balance > 0.0 {
        withdrawal / beginning_balance
    } else {
        0.0
    }
}
