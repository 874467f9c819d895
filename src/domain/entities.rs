use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

/// Fruits offered by the input form until a catalog is fetched from the service.
pub const DEFAULT_FRUITS: &[&str] = &[
    "Apples",
    "Bananas",
    "Blueberries",
    "Mangoes",
    "Oranges",
    "Pineapple",
    "Strawberries",
    "Watermelon",
];

/// Product form of the fruit (not to be confused with the input form).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProductForm {
    #[default]
    Fresh,
    Frozen,
    Dried,
    Juice,
}

impl ProductForm {
    pub const ALL: [ProductForm; 4] = [
        ProductForm::Fresh,
        ProductForm::Frozen,
        ProductForm::Dried,
        ProductForm::Juice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProductForm::Fresh => "Fresh",
            ProductForm::Frozen => "Frozen",
            ProductForm::Dried => "Dried",
            ProductForm::Juice => "Juice",
        }
    }
}

impl fmt::Display for ProductForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown product form '{0}', expected one of Fresh, Frozen, Dried, Juice")]
pub struct UnknownProductForm(pub String);

impl FromStr for ProductForm {
    type Err = UnknownProductForm;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        ProductForm::ALL
            .into_iter()
            .find(|form| form.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownProductForm(trimmed.to_string()))
    }
}

/// Wire payload for `POST /predict`.
///
/// The `form_*` flags are a one-hot encoding of [`ProductForm`]; build this
/// through [`crate::domain::encode`] so exactly one flag is set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub fruit: String,
    #[serde(rename = "form_Dried")]
    pub form_dried: bool,
    #[serde(rename = "form_Fresh")]
    pub form_fresh: bool,
    #[serde(rename = "form_Frozen")]
    pub form_frozen: bool,
    #[serde(rename = "form_Juice")]
    pub form_juice: bool,
    pub yield_factor: f64,
    pub cup_eq_size: f64,
    pub cup_eq_price: f64,
}

impl PredictionRequest {
    /// Returns the product form encoded by the flags, or `None` unless exactly one is set.
    pub fn selected_form(&self) -> Option<ProductForm> {
        let flags = [
            (ProductForm::Fresh, self.form_fresh),
            (ProductForm::Frozen, self.form_frozen),
            (ProductForm::Dried, self.form_dried),
            (ProductForm::Juice, self.form_juice),
        ];
        let mut selected = flags.iter().filter(|(_, set)| *set).map(|(form, _)| *form);
        match (selected.next(), selected.next()) {
            (Some(form), None) => Some(form),
            _ => None,
        }
    }
}

/// Estimates reported by the prediction service, one per model.
///
/// Values are in the service's reporting scale and are not range-checked.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "RandomForest")]
    pub random_forest: f64,
    #[serde(rename = "DecisionTree")]
    pub decision_tree: f64,
    #[serde(rename = "LinearRegression", skip_serializing_if = "Option::is_none")]
    pub linear_regression: Option<f64>,
    /// Any additional models the service reports, keyed by their wire name.
    #[serde(flatten)]
    pub other_models: BTreeMap<String, f64>,
    /// Catalog name the service matched the requested fruit to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_fruit: Option<String>,
}

impl PredictionResult {
    pub fn new(random_forest: f64, decision_tree: f64) -> Self {
        Self {
            random_forest,
            decision_tree,
            linear_regression: None,
            other_models: BTreeMap::new(),
            matched_fruit: None,
        }
    }

    pub fn with_linear_regression(mut self, value: f64) -> Self {
        self.linear_regression = Some(value);
        self
    }

    pub fn with_matched_fruit(mut self, fruit: impl Into<String>) -> Self {
        self.matched_fruit = Some(fruit.into());
        self
    }

    /// All reported estimates in display order: tree models first, then
    /// linear regression, then anything else by name.
    pub fn estimates(&self) -> Vec<ModelEstimate> {
        let mut estimates = vec![
            ModelEstimate::known("DecisionTree", self.decision_tree),
            ModelEstimate::known("RandomForest", self.random_forest),
        ];
        if let Some(value) = self.linear_regression {
            estimates.push(ModelEstimate::known("LinearRegression", value));
        }
        estimates.extend(
            self.other_models
                .iter()
                .map(|(model, value)| ModelEstimate::known(model, *value)),
        );
        estimates
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelEstimate {
    /// Wire name, e.g. `RandomForest`.
    pub model: String,
    pub label: String,
    pub description: Option<&'static str>,
    pub value: f64,
}

impl ModelEstimate {
    fn known(model: &str, value: f64) -> Self {
        let (label, description) = match model {
            "DecisionTree" => ("Decision Tree".to_string(), Some("Interpretable tree model")),
            "RandomForest" => ("Random Forest".to_string(), Some("Ensemble tree estimator")),
            "LinearRegression" => (
                "Linear Regression".to_string(),
                Some("Linear baseline estimator"),
            ),
            other => (other.to_string(), None),
        };
        Self {
            model: model.to_string(),
            label,
            description,
            value,
        }
    }
}

/// Metadata returned by the service root endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    pub message: String,
    pub models: Vec<String>,
    pub fruits_endpoint: Option<String>,
}
