use storefront_core::{App, WebhookEventSyncType};

pub const WEBHOOK_TAX_CODES_CACHE_KEY: &str = "webhook_tax_codes";
pub const DEFAULT_TAX_CODE: &str = "UNMAPPED";
pub const DEFAULT_TAX_DESCRIPTION: &str = "Unmapped Product/Product Type";

const TAX_EVENTS: [WebhookEventSyncType; 3] = [
    WebhookEventSyncType::CheckoutCalculateTaxes,
    WebhookEventSyncType::OrderCalculateTaxes,
    WebhookEventSyncType::FetchTaxCodes,
];

/// The tax app in use: the most recently installed active app that answers
/// every tax event.
pub fn current_tax_app(apps: &[App]) -> Option<&App> {
    apps.iter()
        .filter(|app| TAX_EVENTS.iter().all(|event| app.handles_event(*event)))
        .max_by_key(|app| app.id)
}

pub fn meta_code_key(app: &App) -> String {
    format!("{}.code", app.identifier)
}

pub fn meta_description_key(app: &App) -> String {
    format!("{}.description", app.identifier)
}

#[cfg(test)]
mod tests {
    use storefront_core::Webhook;
    use uuid::Uuid;

    use super::*;

    fn app(id: i64, events: &[WebhookEventSyncType]) -> App {
        App {
            id,
            identifier: format!("tax.app{id}"),
            name: format!("Tax app {id}"),
            is_active: true,
            webhooks: vec![Webhook {
                id: Uuid::new_v4(),
                app_id: id,
                name: "taxes".to_string(),
                target_url: "https://tax.example.com".to_string(),
                secret_key: None,
                is_active: true,
                events: events.iter().map(|event| event.as_str().to_string()).collect(),
            }],
        }
    }

    #[test]
    fn picks_highest_pk_among_complete_tax_apps() {
        let apps = vec![
            app(1, &TAX_EVENTS),
            app(5, &TAX_EVENTS),
            app(9, &TAX_EVENTS[..2]),
        ];

        assert_eq!(current_tax_app(&apps).map(|app| app.id), Some(5));
    }

    #[test]
    fn inactive_apps_are_ignored() {
        let mut newest = app(4, &TAX_EVENTS);
        newest.is_active = false;
        let apps = vec![app(2, &TAX_EVENTS), newest];

        assert_eq!(current_tax_app(&apps).map(|app| app.id), Some(2));
        assert!(current_tax_app(&[]).is_none());
    }

    #[test]
    fn metadata_keys_use_identifier() {
        let app = app(3, &TAX_EVENTS);
        assert_eq!(meta_code_key(&app), "tax.app3.code");
        assert_eq!(meta_description_key(&app), "tax.app3.description");
    }
}
