use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use super::types::{HouseholdParams, MAX_AGE, Person, START_YEARS};

/// A numeric form value that never fails to deserialize. Numbers, numeric
/// strings, blanks and nulls are all accepted; anything that is not a finite
/// number is remembered as unparsed and later read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LenientNumber {
    value: Option<f64>,
}

impl LenientNumber {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.is_finite().then_some(value),
        }
    }

    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn value(self) -> Option<f64> {
        self.value
    }

    pub fn or_zero(self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

impl From<f64> for LenientNumber {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

struct LenientNumberVisitor;

impl<'de> Visitor<'de> for LenientNumberVisitor {
    type Value = LenientNumber;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string, or nothing")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(LenientNumber::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(LenientNumber::new(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(LenientNumber::new(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(LenientNumber::parse(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(LenientNumber::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(LenientNumber::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(LenientNumber::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(LenientNumber::default())
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(LenientNumber::default())
    }
}

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientNumberVisitor)
    }
}

/// The calculator form as submitted. Every field is optional; see
/// [`HouseholdForm::into_params`] for how gaps are filled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseholdForm {
    pub first_name1: Option<String>,
    pub last_name1: Option<String>,
    pub current_age1: Option<LenientNumber>,

    pub first_name2: Option<String>,
    pub last_name2: Option<String>,
    pub current_age2: Option<LenientNumber>,

    pub retirement_age: Option<LenientNumber>,
    pub current_savings: Option<LenientNumber>,
    pub annual_savings: Option<LenientNumber>,
    pub annual_savings_increase: Option<LenientNumber>,
    pub pre_retirement_return: Option<LenientNumber>,
    pub post_retirement_return: Option<LenientNumber>,
    pub current_expenses: Option<LenientNumber>,
    pub inflation_rate: Option<LenientNumber>,
    pub life_expectancy: Option<LenientNumber>,

    pub start_year: Option<LenientNumber>,
}

fn number(field: Option<LenientNumber>) -> f64 {
    field.map(LenientNumber::or_zero).unwrap_or(0.0)
}

fn age(field: Option<LenientNumber>) -> u32 {
    number(field).trunc().clamp(0.0, MAX_AGE as f64) as u32
}

fn text(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

fn is_supplied(field: Option<LenientNumber>) -> bool {
    field.and_then(LenientNumber::value).is_some()
}

impl HouseholdForm {
    /// Normalises the form. Unparseable numbers become zero, ages are clamped
    /// to `0..=MAX_AGE` and start years to `START_YEARS`. `default_start_year`
    /// is used when the form names no start year. Person 2 exists when it has
    /// a first name or an age.
    pub fn into_params(self, default_start_year: i32) -> HouseholdParams {
        let primary = Person::new(
            text(&self.first_name1),
            text(&self.last_name1),
            age(self.current_age1),
        );

        let partner = (!text(&self.first_name2).is_empty() || is_supplied(self.current_age2))
            .then(|| {
                Person::new(
                    text(&self.first_name2),
                    text(&self.last_name2),
                    age(self.current_age2),
                )
            });

        let start_year = self
            .start_year
            .and_then(LenientNumber::value)
            .map(|year| {
                let (first, last) = (*START_YEARS.start(), *START_YEARS.end());
                year.trunc().clamp(f64::from(first), f64::from(last)) as i32
            })
            .unwrap_or(default_start_year);

        HouseholdParams {
            primary,
            partner,
            retirement_age: age(self.retirement_age),
            current_savings: number(self.current_savings),
            annual_savings: number(self.annual_savings),
            annual_savings_increase: number(self.annual_savings_increase),
            pre_retirement_return: number(self.pre_retirement_return),
            post_retirement_return: number(self.post_retirement_return),
            current_expenses: number(self.current_expenses),
            inflation_rate: number(self.inflation_rate),
            life_expectancy: age(self.life_expectancy),
            start_year,
        }
    }
}
