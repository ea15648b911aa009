//! Header, footer and toast regions

use super::components::link;
use super::ViewContext;
use crate::html;
use crate::html::Html;
use crate::store::Language;

pub fn header(ctx: &ViewContext) -> Html {
    let state = ctx.state;

    let categories: Html = ctx
        .catalog
        .categories()
        .iter()
        .map(|c| html!("<li>{}</li>", link(&format!("/category/{}", c.slug), &c.name)))
        .collect();

    let account = match &state.user {
        Some(user) => html!(
            "{}{} <button class=\"link\" data-action=\"logout\">Abmelden</button>",
            link("/account", &format!("Hallo, {}", user.first_name)),
            Html::when(user.is_admin, || html!(" {}", link("/admin", "Admin")))
        ),
        None => link("/login", "Anmelden"),
    };

    let other_language = match state.language {
        Language::De => Language::En,
        Language::En => Language::De,
    };

    html!(
        "<div class=\"header-top\">{}\
         <form class=\"search-form\" data-action=\"search\">\
         <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Suche...\" aria-label=\"Suche\">\
         <button type=\"submit\">Suchen</button></form>\
         <div class=\"header-actions\">{} \
         <a href=\"/wishlist\" data-link class=\"wishlist-link\">Wunschliste <span class=\"count\">{}</span></a> \
         <a href=\"/cart\" data-link class=\"cart-link\">Warenkorb <span class=\"cart-count\">{}</span></a> \
         <button class=\"lang\" data-action=\"set-language\" data-lang=\"{}\">{}</button></div></div>\
         <nav class=\"main-nav\"><ul><li>{}</li>{}<li>{}</li><li>{}</li></ul></nav>",
        html!("<a href=\"/\" data-link class=\"logo\">{}</a>", ctx.shop.name),
        state.search_query,
        account,
        state.wishlist.len(),
        state.cart_count(),
        other_language.code(),
        other_language.code().to_uppercase(),
        link("/products", "Alle Produkte"),
        categories,
        link("/blog", "Blog"),
        link("/about", "Über uns")
    )
}

pub fn footer(ctx: &ViewContext) -> Html {
    let legal: Html = [
        ("/impressum", "Impressum"),
        ("/datenschutz", "Datenschutz"),
        ("/agb", "AGB"),
        ("/widerruf", "Widerruf"),
        ("/versand", "Versand & Zahlung"),
        ("/contact", "Kontakt"),
    ]
    .iter()
    .map(|(href, label)| html!("<li>{}</li>", link(href, label)))
    .collect();

    html!(
        "<div class=\"newsletter\"><h3>Newsletter</h3>\
         <p>Neuigkeiten, Styling-Tipps und exklusive Angebote.</p>\
         <form data-action=\"subscribe-newsletter\">\
         <input type=\"email\" name=\"email\" placeholder=\"Deine E-Mail-Adresse\" required>\
         <button type=\"submit\">Anmelden</button></form></div>\
         <ul class=\"legal\">{}</ul>\
         <p class=\"copyright\">&copy; {} {}</p>",
        legal,
        ctx.now.format("%Y").to_string(),
        ctx.shop.name
    )
}

pub fn toast(ctx: &ViewContext) -> Html {
    match ctx.state.active_toast(ctx.now) {
        Some(toast) => html!(
            "<div class=\"toast toast-{}\" role=\"status\">{}\
             <button class=\"toast-close\" data-action=\"dismiss-toast\" aria-label=\"Schließen\">&times;</button></div>",
            toast.kind.as_str(),
            toast.message
        ),
        None => Html::new(),
    }
}
