use crate::format::coerce_ml;
use crate::models::{Settings, SettingsForm};

impl Settings {
    /// Builds settings from a submitted form. Numeric fields that do not
    /// parse fall back to their defaults rather than failing the save.
    pub fn from_form(form: &SettingsForm) -> Self {
        let defaults = Settings::default();
        let timezone = form.timezone.trim();

        Settings {
            daily_goal: coerce_ml(&form.daily_goal, defaults.daily_goal),
            default_drink_amount: coerce_ml(&form.default_drink_amount, defaults.default_drink_amount),
            notifications: form.notifications.is_some(),
            reminder_interval: coerce_ml(&form.reminder_interval, defaults.reminder_interval),
            timezone: if timezone.is_empty() {
                defaults.timezone
            } else {
                timezone.to_string()
            },
        }
    }
}
