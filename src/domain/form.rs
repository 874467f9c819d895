//! Raw input buffers for the prediction form and their validation.
//!
//! Every field is held as the text the user typed; numbers and choices are
//! only interpreted when the form is validated, so a half-typed value such as
//! `"0."` is never lost.

use std::{collections::BTreeMap, fmt, str::FromStr};

use thiserror::Error;

use super::entities::{ProductForm, DEFAULT_FRUITS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Fruit,
    Form,
    YieldFactor,
    CupEqSize,
    CupEqPrice,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Fruit,
        Field::Form,
        Field::YieldFactor,
        Field::CupEqSize,
        Field::CupEqPrice,
    ];

    /// Wire name, matching the request payload.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Fruit => "fruit",
            Field::Form => "form",
            Field::YieldFactor => "yield_factor",
            Field::CupEqSize => "cup_eq_size",
            Field::CupEqPrice => "cup_eq_price",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Fruit => "Fruit",
            Field::Form => "Form",
            Field::YieldFactor => "Yield Factor",
            Field::CupEqSize => "Cup Eq. Size",
            Field::CupEqPrice => "Cup Eq. Price",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().replace('-', "_").to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| UnknownField(raw.to_string()))
    }
}

/// Current contents of the input form, one raw buffer per field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormValues {
    pub fruit: String,
    pub form: String,
    pub yield_factor: String,
    pub cup_eq_size: String,
    pub cup_eq_price: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            fruit: "Apples".to_string(),
            form: ProductForm::Fresh.name().to_string(),
            yield_factor: String::new(),
            cup_eq_size: String::new(),
            cup_eq_price: String::new(),
        }
    }
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Fruit => &self.fruit,
            Field::Form => &self.form,
            Field::YieldFactor => &self.yield_factor,
            Field::CupEqSize => &self.cup_eq_size,
            Field::CupEqPrice => &self.cup_eq_price,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Fruit => &mut self.fruit,
            Field::Form => &mut self.form,
            Field::YieldFactor => &mut self.yield_factor,
            Field::CupEqSize => &mut self.cup_eq_size,
            Field::CupEqPrice => &mut self.cup_eq_price,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Required field left empty.
    Missing,
    /// Text that does not parse as a finite number.
    NotANumber,
    /// Value ≤ 0 where > 0 is required.
    NotPositive,
    /// Value < 0 where ≥ 0 is required.
    Negative,
    /// Enumerated field left unset.
    NotSelected,
    /// Enumerated field holding a value outside its choices.
    Unrecognized,
}

impl Violation {
    pub fn message(&self) -> &'static str {
        match self {
            Violation::Missing => "Required",
            Violation::NotANumber => "Must be a number",
            Violation::NotPositive => "Must be > 0",
            Violation::Negative => "Must be ≥ 0",
            Violation::NotSelected => "Select a value",
            Violation::Unrecognized => "Not one of the available choices",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{}: {}", .field.label(), .kind.message())]
pub struct ValidationError {
    pub field: Field,
    pub kind: Violation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldStatus {
    Valid,
    Invalid(Violation),
}

/// Per-field outcome of [`FormModel::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    statuses: BTreeMap<Field, FieldStatus>,
}

impl ValidationReport {
    fn from_checks(checks: [(Field, Option<Violation>); 5]) -> Self {
        let statuses = checks
            .into_iter()
            .map(|(field, violation)| {
                let status = violation.map_or(FieldStatus::Valid, FieldStatus::Invalid);
                (field, status)
            })
            .collect();
        Self { statuses }
    }

    pub fn is_valid(&self) -> bool {
        self.statuses
            .values()
            .all(|status| *status == FieldStatus::Valid)
    }

    pub fn status(&self, field: Field) -> FieldStatus {
        self.statuses
            .get(&field)
            .copied()
            .unwrap_or(FieldStatus::Valid)
    }

    pub fn violation(&self, field: Field) -> Option<Violation> {
        match self.status(field) {
            FieldStatus::Valid => None,
            FieldStatus::Invalid(kind) => Some(kind),
        }
    }

    /// Violations in field order.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.statuses
            .iter()
            .filter_map(|(field, status)| match status {
                FieldStatus::Valid => None,
                FieldStatus::Invalid(kind) => Some(ValidationError {
                    field: *field,
                    kind: *kind,
                }),
            })
            .collect()
    }
}

/// A form that passed validation. Only [`FormModel::validated`] creates one.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidForm {
    fruit: String,
    form: ProductForm,
    yield_factor: f64,
    cup_eq_size: f64,
    cup_eq_price: f64,
}

impl ValidForm {
    pub fn fruit(&self) -> &str {
        &self.fruit
    }

    pub fn form(&self) -> ProductForm {
        self.form
    }

    pub fn yield_factor(&self) -> f64 {
        self.yield_factor
    }

    pub fn cup_eq_size(&self) -> f64 {
        self.cup_eq_size
    }

    pub fn cup_eq_price(&self) -> f64 {
        self.cup_eq_price
    }
}

#[derive(Clone, Debug)]
pub struct FormModel {
    values: FormValues,
    catalog: Vec<String>,
}

impl Default for FormModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FormModel {
    pub fn new() -> Self {
        Self::with_values(FormValues::default())
    }

    pub fn with_values(values: FormValues) -> Self {
        Self {
            values,
            catalog: DEFAULT_FRUITS.iter().map(|fruit| fruit.to_string()).collect(),
        }
    }

    /// Replaces the accepted fruits, e.g. with the list served by `/fruits`.
    /// An empty catalog accepts any non-empty fruit name.
    pub fn with_catalog<I, S>(mut self, fruits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog = fruits.into_iter().map(Into::into).collect();
        self
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn set_field(&mut self, field: Field, raw: impl Into<String>) {
        *self.values.slot_mut(field) = raw.into();
    }

    pub fn reset(&mut self, defaults: FormValues) {
        self.values = defaults;
    }

    pub fn validate(&self) -> ValidationReport {
        match self.validated() {
            Ok(_) => ValidationReport::from_checks(Field::ALL.map(|field| (field, None))),
            Err(report) => report,
        }
    }

    pub fn validated(&self) -> Result<ValidForm, ValidationReport> {
        let fruit = self.check_fruit(&self.values.fruit);
        let form = check_choice(&self.values.form);
        let yield_factor = check_positive(&self.values.yield_factor);
        let cup_eq_size = check_positive(&self.values.cup_eq_size);
        let cup_eq_price = check_non_negative(&self.values.cup_eq_price);

        let report = ValidationReport::from_checks([
            (Field::Fruit, fruit.as_ref().err().copied()),
            (Field::Form, form.as_ref().err().copied()),
            (Field::YieldFactor, yield_factor.as_ref().err().copied()),
            (Field::CupEqSize, cup_eq_size.as_ref().err().copied()),
            (Field::CupEqPrice, cup_eq_price.as_ref().err().copied()),
        ]);

        match (fruit, form, yield_factor, cup_eq_size, cup_eq_price) {
            (Ok(fruit), Ok(form), Ok(yield_factor), Ok(cup_eq_size), Ok(cup_eq_price)) => {
                Ok(ValidForm {
                    fruit,
                    form,
                    yield_factor,
                    cup_eq_size,
                    cup_eq_price,
                })
            }
            _ => Err(report),
        }
    }

    fn check_fruit(&self, raw: &str) -> Result<String, Violation> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Violation::NotSelected);
        }
        if self.catalog.is_empty() {
            return Ok(trimmed.to_string());
        }
        self.catalog
            .iter()
            .find(|known| known.eq_ignore_ascii_case(trimmed))
            .cloned()
            .ok_or(Violation::Unrecognized)
    }
}

fn check_choice(raw: &str) -> Result<ProductForm, Violation> {
    if raw.trim().is_empty() {
        return Err(Violation::NotSelected);
    }
    raw.parse().map_err(|_| Violation::Unrecognized)
}

fn parse_number(raw: &str) -> Result<f64, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Violation::Missing);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Violation::NotANumber),
    }
}

fn check_positive(raw: &str) -> Result<f64, Violation> {
    let value = parse_number(raw)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Violation::NotPositive)
    }
}

fn check_non_negative(raw: &str) -> Result<f64, Violation> {
    let value = parse_number(raw)?;
    if value < 0.0 {
        Err(Violation::Negative)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled(yield_factor: &str, cup_eq_size: &str, cup_eq_price: &str) -> FormModel {
        let mut model = FormModel::new();
        model.set_field(Field::YieldFactor, yield_factor);
        model.set_field(Field::CupEqSize, cup_eq_size);
        model.set_field(Field::CupEqPrice, cup_eq_price);
        model
    }

    #[test]
    fn defaults_need_numeric_fields() {
        let report = FormModel::new().validate();
        assert!(!report.is_valid());
        assert_eq!(report.status(Field::Fruit), FieldStatus::Valid);
        assert_eq!(report.status(Field::Form), FieldStatus::Valid);
        assert_eq!(report.violation(Field::YieldFactor), Some(Violation::Missing));
        assert_eq!(report.violation(Field::CupEqSize), Some(Violation::Missing));
        assert_eq!(report.violation(Field::CupEqPrice), Some(Violation::Missing));
        assert_eq!(report.errors().len(), 3);
    }

    #[test]
    fn complete_form_is_valid() {
        let model = filled("0.85", "1.5", "2.5");
        assert!(model.validate().is_valid());

        let valid = model.validated().unwrap();
        assert_eq!(valid.fruit(), "Apples");
        assert_eq!(valid.form(), ProductForm::Fresh);
        assert_eq!(valid.yield_factor(), 0.85);
        assert_eq!(valid.cup_eq_size(), 1.5);
        assert_eq!(valid.cup_eq_price(), 2.5);
    }

    #[test]
    fn zero_price_is_valid_but_zero_size_is_not() {
        let report = filled("1", "0", "0").validate();
        assert_eq!(report.status(Field::CupEqPrice), FieldStatus::Valid);
        assert_eq!(report.violation(Field::CupEqSize), Some(Violation::NotPositive));
    }

    #[test]
    fn partial_input_is_kept_verbatim() {
        let mut model = FormModel::new();
        model.set_field(Field::YieldFactor, "0.");
        assert_eq!(model.values().yield_factor, "0.");
        model.set_field(Field::CupEqSize, "1.5x");
        assert_eq!(model.values().cup_eq_size, "1.5x");
        assert_eq!(
            model.validate().violation(Field::CupEqSize),
            Some(Violation::NotANumber)
        );
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let report = filled("inf", "NaN", "1").validate();
        assert_eq!(report.violation(Field::YieldFactor), Some(Violation::NotANumber));
        assert_eq!(report.violation(Field::CupEqSize), Some(Violation::NotANumber));
    }

    #[test]
    fn empty_choices_are_not_selected() {
        let mut model = filled("1", "1", "1");
        model.set_field(Field::Fruit, "");
        model.set_field(Field::Form, "  ");
        let report = model.validate();
        assert_eq!(report.violation(Field::Fruit), Some(Violation::NotSelected));
        assert_eq!(report.violation(Field::Form), Some(Violation::NotSelected));
    }

    #[test]
    fn fruit_matches_catalog_case_insensitively() {
        let mut model = filled("1", "1", "1");
        model.set_field(Field::Fruit, " blueberries ");
        assert_eq!(model.validated().unwrap().fruit(), "Blueberries");

        model.set_field(Field::Fruit, "Durian");
        assert_eq!(
            model.validate().violation(Field::Fruit),
            Some(Violation::Unrecognized)
        );
    }

    #[test]
    fn empty_catalog_accepts_any_fruit() {
        let mut model = filled("1", "1", "1").with_catalog(Vec::<String>::new());
        model.set_field(Field::Fruit, "Durian");
        assert_eq!(model.validated().unwrap().fruit(), "Durian");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut model = filled("1", "2", "3");
        model.set_field(Field::Form, "Juice");
        model.reset(FormValues::default());
        assert_eq!(model.values(), &FormValues::default());
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>(), Ok(field));
        }
        assert_eq!("cup-eq-price".parse::<Field>(), Ok(Field::CupEqPrice));
        assert!("price".parse::<Field>().is_err());
    }

    #[test]
    fn validation_error_reads_like_form_hint() {
        let error = ValidationError {
            field: Field::YieldFactor,
            kind: Violation::NotPositive,
        };
        assert_eq!(error.to_string(), "Yield Factor: Must be > 0");
    }

    proptest! {
        #[test]
        fn non_positive_yield_factor_is_rejected(value in -1.0e6f64..=0.0) {
            let report = filled(&value.to_string(), "1", "1").validate();
            prop_assert_eq!(report.violation(Field::YieldFactor), Some(Violation::NotPositive));
            prop_assert!(!report.is_valid());
        }

        #[test]
        fn negative_price_is_rejected(value in -1.0e6f64..-1.0e-9) {
            let report = filled("1", "1", &value.to_string()).validate();
            prop_assert_eq!(report.violation(Field::CupEqPrice), Some(Violation::Negative));
            prop_assert!(!report.is_valid());
        }

        #[test]
        fn positive_inputs_validate(
            yield_factor in 1.0e-6f64..1.0e6,
            size in 1.0e-6f64..1.0e6,
            price in 0.0f64..1.0e6,
        ) {
            let model = filled(&yield_factor.to_string(), &size.to_string(), &price.to_string());
            let valid = model.validated();
            prop_assert!(valid.is_ok());
            let valid = valid.unwrap();
            prop_assert_eq!(valid.yield_factor(), yield_factor);
            prop_assert_eq!(valid.cup_eq_price(), price);
        }
    }
}
