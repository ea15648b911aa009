//! Markup shared by several views

use crate::catalog::Product;
use crate::html;
use crate::html::{Html, Render};
use crate::store::{AppState, FormFeedback};

/// In-app link handled by the router instead of a page load
pub fn link<T: Render + ?Sized>(href: &str, label: &T) -> Html {
    html!("<a href=\"{}\" data-link>{}</a>", href, label)
}

pub fn section_title(title: &str) -> Html {
    html!("<h2 class=\"section-title\">{}</h2>", title)
}

/// Current price, with the struck-through original on sale items
pub fn price_tag(product: &Product) -> Html {
    match product.compare_at_price.filter(|_| product.is_sale) {
        Some(original) => html!(
            "<span class=\"price sale\">{}</span> <span class=\"price-original\"><s>{}</s></span>",
            product.price,
            original
        ),
        None => html!("<span class=\"price\">{}</span>", product.price),
    }
}

fn badges(product: &Product) -> Html {
    let mut out = Html::new();
    if product.is_new_arrival {
        out.push(&html!("<span class=\"badge new\">{}</span>", "Neu"));
    }
    if product.is_sale {
        out.push(&html!("<span class=\"badge sale\">{}</span>", "Sale"));
    }
    if product.is_bestseller {
        out.push(&html!("<span class=\"badge bestseller\">{}</span>", "Bestseller"));
    }
    if product.is_handmade {
        out.push(&html!("<span class=\"badge handmade\">{}</span>", "Handgemacht"));
    }
    out
}

pub fn wishlist_button(product: &Product, state: &AppState) -> Html {
    let (class, label) = if state.in_wishlist(product.id) {
        ("wishlist-btn active", "Von der Wunschliste entfernen")
    } else {
        ("wishlist-btn", "Auf die Wunschliste")
    };
    html!(
        "<button class=\"{}\" data-action=\"toggle-wishlist\" data-id=\"{}\" aria-label=\"{}\">&#9829;</button>",
        class,
        product.id,
        label
    )
}

pub fn add_to_cart_button(product: &Product) -> Html {
    if product.in_stock() {
        html!(
            "<button class=\"btn btn-primary\" data-action=\"add-to-cart\" data-id=\"{}\" data-quantity=\"1\">In den Warenkorb</button>",
            product.id
        )
    } else {
        Html::trusted("<button class=\"btn\" disabled>Ausverkauft</button>")
    }
}

pub fn product_card(product: &Product, state: &AppState) -> Html {
    let href = format!("/product/{}", product.id);
    html!(
        "<article class=\"product-card\">\
         <a href=\"{}\" data-link><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></a>\
         <div class=\"badges\">{}</div>{}\
         <h3>{}</h3><p class=\"product-price\">{}</p>{}</article>",
        href,
        product.image,
        product.name,
        badges(product),
        wishlist_button(product, state),
        link(&href, &product.name),
        price_tag(product),
        add_to_cart_button(product)
    )
}

pub fn product_grid<'a>(products: impl IntoIterator<Item = &'a Product>, state: &AppState) -> Html {
    let cards: Html = products
        .into_iter()
        .map(|p| product_card(p, state))
        .collect();
    if cards.is_empty() {
        Html::trusted("<p class=\"empty\">Keine Produkte gefunden.</p>")
    } else {
        html!("<div class=\"product-grid\">{}</div>", cards)
    }
}

pub fn stars(rating: u8) -> Html {
    let rating = rating.min(5) as usize;
    html!(
        "<span class=\"stars\" aria-label=\"{} von 5 Sternen\">{}{}</span>",
        rating,
        "★".repeat(rating),
        "☆".repeat(5 - rating)
    )
}

/// Placeholder with a call to action for empty lists
pub fn empty_state(message: &str, href: &str, label: &str) -> Html {
    html!(
        "<div class=\"empty-state\"><p>{}</p>{}</div>",
        message,
        link(href, label)
    )
}

fn field_error(feedback: Option<&FormFeedback>, name: &str) -> (&'static str, Html) {
    match feedback.and_then(|f| f.error(name)) {
        Some(message) => (
            "form-group error",
            html!("<span class=\"error-message\">{}</span>", message),
        ),
        None => ("form-group", Html::new()),
    }
}

/// Labelled input showing the last submitted value and its error
pub fn input(
    feedback: Option<&FormFeedback>,
    name: &str,
    label: &str,
    kind: &str,
    default: &str,
    required: bool,
) -> Html {
    let (class, error) = field_error(feedback, name);
    let value = match (kind, feedback) {
        ("password", _) => "",
        (_, Some(f)) if f.values.contains_key(name) => f.value(name),
        _ => default,
    };
    html!(
        "<div class=\"{}\"><label for=\"{}\">{}{}</label>\
         <input type=\"{}\" id=\"{}\" name=\"{}\" value=\"{}\"{}>{}</div>",
        class,
        name,
        label,
        Html::when(required, || Html::trusted(" *")),
        kind,
        name,
        name,
        value,
        Html::when(required, || Html::trusted(" required")),
        error
    )
}

pub fn textarea(feedback: Option<&FormFeedback>, name: &str, label: &str, required: bool) -> Html {
    let (class, error) = field_error(feedback, name);
    html!(
        "<div class=\"{}\"><label for=\"{}\">{}{}</label>\
         <textarea id=\"{}\" name=\"{}\" rows=\"5\"{}>{}</textarea>{}</div>",
        class,
        name,
        label,
        Html::when(required, || Html::trusted(" *")),
        name,
        name,
        Html::when(required, || Html::trusted(" required")),
        feedback.map(|f| f.value(name)).unwrap_or(""),
        error
    )
}

/// Radio group over `(value, label)` options
pub fn radio_group(
    feedback: Option<&FormFeedback>,
    name: &str,
    legend: &str,
    options: &[(&str, &str)],
) -> Html {
    let (class, error) = field_error(feedback, name);
    let selected = feedback.map(|f| f.value(name)).unwrap_or("");
    let radios: Html = options
        .iter()
        .map(|(value, label)| {
            html!(
                "<label><input type=\"radio\" name=\"{}\" value=\"{}\"{}> {}</label>",
                name,
                value,
                Html::when(*value == selected, || Html::trusted(" checked")),
                label
            )
        })
        .collect();
    html!(
        "<fieldset class=\"{}\"><legend>{}</legend>{}{}</fieldset>",
        class,
        legend,
        radios,
        error
    )
}
