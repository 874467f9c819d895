pub const APP_NAME: &str = "Fruit Price Predictor";
pub const APP_SLUG: &str = "fruit-price-predictor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// `User-Agent` sent to the prediction service.
pub fn user_agent() -> String {
    format!(
        "{}/{}",
        APP_SLUG,
        version_label().trim_start_matches(|ch| ch == 'v' || ch == 'V')
    )
}
