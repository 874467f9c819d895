use super::entities::{PredictionRequest, ProductForm};
use super::form::ValidForm;

/// Maps a validated form onto the feature layout the prediction service expects.
///
/// The product form becomes a one-hot set of `form_*` flags; everything else is
/// copied as-is. No rounding or unit conversion happens here.
pub fn encode(form: &ValidForm) -> PredictionRequest {
    let selected = form.form();
    PredictionRequest {
        fruit: form.fruit().to_string(),
        form_dried: selected == ProductForm::Dried,
        form_fresh: selected == ProductForm::Fresh,
        form_frozen: selected == ProductForm::Frozen,
        form_juice: selected == ProductForm::Juice,
        yield_factor: form.yield_factor(),
        cup_eq_size: form.cup_eq_size(),
        cup_eq_price: form.cup_eq_price(),
    }
}

impl From<&ValidForm> for PredictionRequest {
    fn from(form: &ValidForm) -> Self {
        encode(form)
    }
}
