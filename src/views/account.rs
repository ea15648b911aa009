//! Sign-in, registration, customer account and wishlist

use super::components::{empty_state, input, link, product_grid};
use super::{Page, ViewContext};
use crate::html;
use crate::html::Html;
use crate::store::FormId;

pub fn login(ctx: &ViewContext) -> Page {
    if let Some(user) = &ctx.state.user {
        return Page::new(html!(
            "<h1>Anmelden</h1><p>Du bist bereits als {} angemeldet.</p>{}",
            user.email,
            link("/account", "Zu meinem Konto")
        ));
    }

    let feedback = ctx.state.feedback(FormId::Login);
    let next = ctx.location.query("next").unwrap_or("/account");

    Page::new(html!(
        "<div class=\"auth\"><h1>Anmelden</h1>\
         <form data-action=\"login\" data-next=\"{}\">{}{}\
         <button type=\"submit\" class=\"btn btn-primary\">Anmelden</button></form>\
         <p>Noch kein Konto? {}</p></div>",
        next,
        input(feedback, "email", "E-Mail", "email", "", true),
        input(feedback, "password", "Passwort", "password", "", true),
        link("/register", "Jetzt registrieren")
    ))
}

pub fn register(ctx: &ViewContext) -> Page {
    let feedback = ctx.state.feedback(FormId::Register);
    let newsletter_checked = feedback.is_some_and(|f| f.value("newsletter") == "on");

    Page::new(html!(
        "<div class=\"auth\"><h1>Registrieren</h1><form data-action=\"register\">{}{}{}{}{}\
         <label><input type=\"checkbox\" name=\"newsletter\"{}> Newsletter abonnieren</label>\
         <button type=\"submit\" class=\"btn btn-primary\">Konto erstellen</button></form>\
         <p>Bereits registriert? {}</p></div>",
        input(feedback, "first_name", "Vorname", "text", "", true),
        input(feedback, "last_name", "Nachname", "text", "", true),
        input(feedback, "email", "E-Mail", "email", "", true),
        input(feedback, "password", "Passwort (mindestens 8 Zeichen)", "password", "", true),
        input(feedback, "password_confirm", "Passwort wiederholen", "password", "", true),
        Html::when(newsletter_checked, || Html::trusted(" checked")),
        link("/login", "Anmelden")
    ))
}

const ACCOUNT_TABS: &[(&str, &str)] = &[("orders", "Bestellungen"), ("profile", "Profil")];

pub fn account(ctx: &ViewContext) -> Page {
    let Some(user) = &ctx.state.user else {
        return Page::new(html!(
            "<h1>Mein Konto</h1><p>Bitte melde dich an, um dein Konto zu sehen.</p>{}",
            link("/login?next=/account", "Anmelden")
        ));
    };

    let tab = ctx
        .location
        .query("tab")
        .filter(|t| ACCOUNT_TABS.iter().any(|(id, _)| id == t))
        .unwrap_or("orders");

    let tabs: Html = ACCOUNT_TABS
        .iter()
        .map(|(id, label)| {
            html!(
                "<button class=\"tab{}\" data-action=\"show-tab\" data-tab=\"{}\">{}</button>",
                Html::when(*id == tab, || Html::trusted(" active")),
                id,
                label
            )
        })
        .collect();

    let panel = if tab == "profile" {
        html!(
            "<dl><dt>Name</dt><dd>{}</dd><dt>E-Mail</dt><dd>{}</dd>\
             <dt>Newsletter</dt><dd>{}</dd></dl>",
            user.full_name(),
            user.email,
            if user.newsletter_subscribed { "abonniert" } else { "nicht abonniert" }
        )
    } else if ctx.state.orders.is_empty() {
        empty_state("Du hast noch keine Bestellungen.", "/products", "Jetzt stöbern")
    } else {
        let rows: Html = ctx
            .state
            .orders
            .iter()
            .map(|order| {
                html!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    link(&format!("/order-confirmation/{}", order.order_number), &order.order_number),
                    order.created_at.format("%d.%m.%Y").to_string(),
                    order.item_count(),
                    order.total,
                    order.status
                )
            })
            .collect();
        html!(
            "<table class=\"orders\"><thead><tr><th>Bestellung</th><th>Datum</th>\
             <th>Artikel</th><th>Summe</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    Page::new(html!(
        "<h1>Mein Konto</h1><p>Willkommen zurück, {}!</p>\
         <div class=\"tabs\">{}</div><div class=\"tab-panel\">{}</div>\
         <button class=\"btn\" data-action=\"logout\">Abmelden</button>",
        user.first_name,
        tabs,
        panel
    ))
}

pub fn wishlist(ctx: &ViewContext) -> Page {
    let products: Vec<_> = ctx
        .state
        .wishlist
        .iter()
        .filter_map(|id| ctx.catalog.find(*id))
        .collect();

    if products.is_empty() {
        return Page::new(html!(
            "<h1>Wunschliste</h1>{}",
            empty_state("Deine Wunschliste ist leer.", "/products", "Produkte entdecken")
        ));
    }

    Page::new(html!(
        "<h1>Wunschliste</h1><p>{} Artikel gemerkt</p>{}",
        products.len(),
        product_grid(products, ctx.state)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::User;
    use crate::catalog::Catalog;
    use crate::config::ShopConfig;
    use crate::router::{Location, Params};
    use crate::store::{AppState, FormFeedback};
    use chrono::Utc;

    fn render_with(path: &str, state: &AppState, f: impl Fn(&ViewContext) -> Page) -> String {
        let location = Location::parse(path);
        let params = Params::new();
        let catalog = Catalog::builtin();
        let shop = ShopConfig::default();
        f(&ViewContext {
            location: &location,
            params: &params,
            state,
            catalog: &catalog,
            shop: &shop,
            now: Utc::now(),
        })
        .body
        .into_string()
    }

    fn user() -> User {
        User {
            id: 1,
            email: "a@b.de".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            is_active: true,
            is_admin: false,
            newsletter_subscribed: true,
        }
    }

    #[test]
    fn test_login_form_shows_errors() {
        let mut feedback = FormFeedback::default();
        feedback.values.insert("email".to_string(), "ana".to_string());
        feedback
            .errors
            .insert("email".to_string(), "Bitte geben Sie eine gültige E-Mail-Adresse ein.".to_string());
        let state = AppState {
            form: Some((FormId::Login, feedback)),
            ..Default::default()
        };

        let body = render_with("/login", &state, login);
        assert!(body.contains("gültige E-Mail-Adresse"));
        assert!(body.contains("value=\"ana\""));
        assert!(body.contains("data-next=\"/account\""));
    }

    #[test]
    fn test_account_requires_sign_in() {
        let body = render_with("/account", &AppState::default(), account);
        assert!(body.contains("Bitte melde dich an"));

        let state = AppState {
            user: Some(user()),
            token: Some("t".to_string()),
            ..Default::default()
        };
        let body = render_with("/account?tab=profile", &state, account);
        assert!(body.contains("Ana Lopez"));
        assert!(body.contains("abonniert"));
    }

    #[test]
    fn test_wishlist_lists_known_products() {
        let state = AppState {
            wishlist: vec![7, 999],
            ..Default::default()
        };
        let body = render_with("/wishlist", &state, wishlist);
        assert!(body.contains("1 Artikel gemerkt"));
        assert!(body.contains("TIBET"));
    }
}
