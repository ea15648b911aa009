//! Cart, checkout and order confirmation

use super::components::{empty_state, input, link, radio_group, textarea};
use super::{Page, ViewContext};
use crate::html;
use crate::html::Html;
use crate::store::{FormId, OrderTotals, PAYMENT_METHODS};

fn quantity_select(id: u32, quantity: u32) -> Html {
    let max = quantity.max(10);
    let options: Html = (1..=max)
        .map(|n| {
            html!(
                "<option value=\"{}\"{}>{}</option>",
                n,
                Html::when(n == quantity, || Html::trusted(" selected")),
                n
            )
        })
        .collect();
    html!(
        "<select class=\"quantity\" data-change=\"update-quantity\" data-id=\"{}\" aria-label=\"Menge\">{}</select>",
        id,
        options
    )
}

fn totals_table(totals: &OrderTotals) -> Html {
    let shipping = if totals.shipping.is_zero() {
        Html::trusted("kostenlos")
    } else {
        html!("{}", totals.shipping)
    };
    html!(
        "<table class=\"totals\"><tr><td>Zwischensumme</td><td>{}</td></tr>\
         <tr><td>Versand</td><td>{}</td></tr>\
         <tr class=\"total\"><td>Gesamt (inkl. MwSt.)</td><td>{}</td></tr></table>",
        totals.subtotal,
        shipping,
        totals.total
    )
}

pub fn cart(ctx: &ViewContext) -> Page {
    let state = ctx.state;
    if state.cart.is_empty() {
        return Page::new(html!(
            "<h1>Warenkorb</h1>{}",
            empty_state("Dein Warenkorb ist leer.", "/products", "Weiter einkaufen")
        ));
    }

    let policy = ctx.shop.shipping_policy();
    let totals = OrderTotals::compute(&state.cart, &policy);

    let rows: Html = state
        .cart
        .iter()
        .map(|item| {
            html!(
                "<tr class=\"cart-item\"><td><img src=\"{}\" alt=\"{}\" width=\"64\"></td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><button class=\"link\" data-action=\"remove-from-cart\" data-id=\"{}\">Entfernen</button></td></tr>",
                item.image,
                item.name,
                link(&format!("/product/{}", item.id), &item.name),
                item.price,
                quantity_select(item.id, item.quantity),
                item.line_total(),
                item.id
            )
        })
        .collect();

    let free_shipping = match policy.missing_for_free_shipping(totals.subtotal) {
        Some(missing) => html!(
            "<p class=\"free-shipping\">Noch {} bis zum kostenlosen Versand.</p>",
            missing
        ),
        None => Html::trusted("<p class=\"free-shipping\">Deine Bestellung wird kostenlos versendet.</p>"),
    };

    Page::new(html!(
        "<h1>Warenkorb</h1><table class=\"cart\"><thead><tr><th></th><th>Artikel</th>\
         <th>Preis</th><th>Menge</th><th>Summe</th><th></th></tr></thead><tbody>{}</tbody></table>\
         {}{}<div class=\"cart-actions\">\
         <button class=\"btn\" data-action=\"clear-cart\">Warenkorb leeren</button> \
         {} <a href=\"/checkout\" data-link class=\"btn btn-primary\">Zur Kasse</a></div>",
        rows,
        free_shipping,
        totals_table(&totals),
        link("/products", "Weiter einkaufen")
    ))
}

pub fn checkout(ctx: &ViewContext) -> Page {
    let state = ctx.state;
    if state.cart.is_empty() {
        return Page::new(html!(
            "<h1>Kasse</h1>{}",
            empty_state(
                "Dein Warenkorb ist leer. Füge zuerst Artikel hinzu.",
                "/products",
                "Zu den Produkten"
            )
        ));
    }

    let totals = OrderTotals::compute(&state.cart, &ctx.shop.shipping_policy());
    let feedback = state.feedback(FormId::Checkout);
    let user = state.user.as_ref();
    let first_name = user.map(|u| u.first_name.as_str()).unwrap_or("");
    let last_name = user.map(|u| u.last_name.as_str()).unwrap_or("");
    let email = user.map(|u| u.email.as_str()).unwrap_or("");

    let summary: Html = state
        .cart
        .iter()
        .map(|item| {
            html!(
                "<li>{} &times; {} <span>{}</span></li>",
                item.quantity,
                item.name,
                item.line_total()
            )
        })
        .collect();

    let guest_hint = Html::when(user.is_none(), || {
        html!(
            "<p class=\"hint\">Du bestellst als Gast. {}</p>",
            link("/login", "Bereits Kundin? Jetzt anmelden")
        )
    });

    Page::new(html!(
        "<h1>Kasse</h1>{}<div class=\"checkout\">\
         <form class=\"checkout-form\" data-action=\"checkout\">\
         <h2>Lieferadresse</h2>{}{}{}{}{}{}{}{}{}\
         {}{}<button type=\"submit\" class=\"btn btn-primary\">Zahlungspflichtig bestellen</button></form>\
         <aside class=\"order-summary\"><h2>Deine Bestellung</h2><ul>{}</ul>{}</aside></div>",
        guest_hint,
        input(feedback, "first_name", "Vorname", "text", first_name, true),
        input(feedback, "last_name", "Nachname", "text", last_name, true),
        input(feedback, "email", "E-Mail", "email", email, true),
        input(feedback, "phone", "Telefon", "tel", "", false),
        input(feedback, "street", "Straße und Hausnummer", "text", "", true),
        input(feedback, "postal_code", "PLZ", "text", "", true),
        input(feedback, "city", "Ort", "text", "", true),
        input(feedback, "country", "Land", "text", "Deutschland", true),
        Html::trusted("<h2>Zahlungsart</h2>"),
        radio_group(feedback, "payment_method", "Zahlungsart", PAYMENT_METHODS),
        textarea(feedback, "notes", "Anmerkungen zur Bestellung", false),
        summary,
        totals_table(&totals)
    ))
}

pub fn order_confirmation(ctx: &ViewContext) -> Option<Page> {
    let order = ctx.state.order(ctx.param("number")?)?;

    let lines: Html = order
        .lines
        .iter()
        .map(|line| {
            html!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                line.name,
                line.quantity,
                line.price.times(line.quantity)
            )
        })
        .collect();

    Some(Page::new(html!(
        "<div class=\"order-confirmation\"><h1>Vielen Dank für deine Bestellung!</h1>\
         <p>Bestellnummer: <strong>{}</strong></p><p>Bestellt am {} &middot; Status: {}</p>\
         <table><thead><tr><th>Artikel</th><th>Menge</th><th>Summe</th></tr></thead>\
         <tbody>{}</tbody></table><p class=\"total\">Gesamt: {}</p>\
         <p>Du erhältst in Kürze eine Bestätigung per E-Mail.</p>{}</div>",
        order.order_number,
        order.created_at.format("%d.%m.%Y").to_string(),
        order.status,
        lines,
        order.total,
        link("/products", "Weiter einkaufen")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::ShopConfig;
    use crate::money::Money;
    use crate::router::{Location, Params};
    use crate::store::{AppState, CartItem, OrderLine, OrderSummary};
    use chrono::Utc;

    fn with_ctx<T>(path: &str, params: Params, state: &AppState, f: impl Fn(&ViewContext) -> T) -> T {
        let location = Location::parse(path);
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
    }

    fn state_with_cart(cents: i64, quantity: u32) -> AppState {
        AppState {
            cart: vec![CartItem {
                id: 7,
                name: "TIBET - Armband".to_string(),
                price: Money::from_cents(cents),
                image: "/images/products/tibet.jpg".to_string(),
                quantity,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_cart_totals_and_shipping() {
        let page = with_ctx("/cart", Params::new(), &state_with_cart(3290, 1), cart);
        let body = page.body.as_str();
        assert!(body.contains("32,90 €"));
        assert!(body.contains("4,90 €"));
        assert!(body.contains("37,80 €"));
        assert!(body.contains("Noch 17,10 €"));

        let page = with_ctx("/cart", Params::new(), &state_with_cart(3290, 2), cart);
        assert!(page.body.as_str().contains("kostenlos"));
    }

    #[test]
    fn test_empty_cart_and_checkout() {
        let state = AppState::default();
        assert!(with_ctx("/cart", Params::new(), &state, cart)
            .body
            .as_str()
            .contains("leer"));
        assert!(!with_ctx("/checkout", Params::new(), &state, checkout)
            .body
            .as_str()
            .contains("data-action=\"checkout\""));

        let page = with_ctx("/checkout", Params::new(), &state_with_cart(3290, 1), checkout);
        assert!(page.body.as_str().contains("data-action=\"checkout\""));
        assert!(page.body.as_str().contains("value=\"paypal\""));
    }

    #[test]
    fn test_order_confirmation_lookup() {
        let state = AppState {
            orders: vec![OrderSummary {
                order_number: "CP-00001".to_string(),
                status: "pending".to_string(),
                total: Money::from_cents(3780),
                created_at: Utc::now(),
                lines: vec![OrderLine {
                    product_id: 7,
                    name: "TIBET".to_string(),
                    quantity: 1,
                    price: Money::from_cents(3290),
                }],
            }],
            ..Default::default()
        };

        let params: Params = [("number".to_string(), "CP-00001".to_string())].into();
        let page = with_ctx("/order-confirmation/CP-00001", params, &state, order_confirmation);
        assert!(page.unwrap().body.as_str().contains("37,80 €"));

        let params: Params = [("number".to_string(), "CP-99999".to_string())].into();
        assert!(with_ctx("/order-confirmation/CP-99999", params, &state, order_confirmation).is_none());
    }
}
