//! Catalog views: home, listings, product detail and search

use super::components::{
    add_to_cart_button, input, link, price_tag, product_grid, section_title, stars, textarea,
    wishlist_button,
};
use super::{Page, ViewContext};
use crate::catalog::{Product, ProductFilter};
use crate::html;
use crate::html::Html;
use crate::store::FormId;

pub fn home(ctx: &ViewContext) -> Page {
    let catalog = ctx.catalog;

    let categories: Html = catalog
        .categories()
        .iter()
        .map(|c| {
            html!(
                "<a class=\"category-tile\" href=\"/category/{}\" data-link><h3>{}</h3><p>{}</p></a>",
                c.slug,
                c.name,
                c.description
            )
        })
        .collect();

    Page::new(html!(
        "<section class=\"hero\"><h1>Boho Schmuck &amp; Mode</h1>\
         <p>Handverlesene Schmuckstücke und Mode mit Seele, direkt aus Ibiza.</p>{}</section>\
         <section>{}{}</section><section>{}{}</section><section>{}{}</section>\
         <section>{}<div class=\"category-grid\">{}</div></section>",
        link("/products", "Jetzt entdecken"),
        section_title("Unsere Lieblinge"),
        product_grid(catalog.featured().into_iter().take(3), ctx.state),
        section_title("Bestseller"),
        product_grid(catalog.bestsellers(), ctx.state),
        section_title("Neu eingetroffen"),
        product_grid(catalog.new_arrivals(), ctx.state),
        section_title("Kategorien"),
        categories
    ))
}

const SORT_OPTIONS: &[(&str, &str)] = &[
    ("featured", "Empfohlen"),
    ("price-asc", "Preis aufsteigend"),
    ("price-desc", "Preis absteigend"),
    ("name", "Name"),
    ("newest", "Neuheiten"),
];

fn sort_products(products: &mut [&Product], sort: &str) {
    match sort {
        "price-asc" => products.sort_by_key(|p| p.price),
        "price-desc" => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
        "name" => products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        "newest" => products.sort_by_key(|p| !p.is_new_arrival),
        _ => products.sort_by_key(|p| !p.is_featured),
    }
}

fn sort_select(selected: &str) -> Html {
    let options: Html = SORT_OPTIONS
        .iter()
        .map(|(value, label)| {
            html!(
                "<option value=\"{}\"{}>{}</option>",
                value,
                Html::when(*value == selected, || Html::trusted(" selected")),
                label
            )
        })
        .collect();
    html!(
        "<label>Sortieren <select name=\"sort\" data-change=\"sort\">{}</select></label>",
        options
    )
}

fn category_select(ctx: &ViewContext, selected: Option<&str>) -> Html {
    let options: Html = ctx
        .catalog
        .categories()
        .iter()
        .map(|c| {
            html!(
                "<option value=\"{}\"{}>{}</option>",
                c.slug,
                Html::when(selected == Some(c.slug.as_str()), || Html::trusted(" selected")),
                c.name
            )
        })
        .collect();
    html!(
        "<label>Kategorie <select name=\"category\" data-change=\"select-category\">\
         <option value=\"\">Alle Kategorien</option>{}</select></label>",
        options
    )
}

pub fn products(ctx: &ViewContext) -> Page {
    let selected = ctx
        .location
        .query("category")
        .or(ctx.state.selected_category.as_deref());
    let sort = ctx.location.query("sort").unwrap_or("featured");

    let filter = ProductFilter {
        category: selected.map(str::to_string),
        ..Default::default()
    };
    let mut products = ctx.catalog.filter(&filter);
    sort_products(&mut products, sort);

    Page::new(html!(
        "<h1>Alle Produkte</h1><div class=\"filters\">{}{}</div>\
         <p class=\"result-count\">{} Produkte</p>{}",
        category_select(ctx, selected),
        sort_select(sort),
        products.len(),
        product_grid(products, ctx.state)
    ))
}

pub fn category(ctx: &ViewContext) -> Option<Page> {
    let slug = ctx.param("slug")?;
    let category = ctx.catalog.category(slug)?;
    let sort = ctx.location.query("sort").unwrap_or("featured");

    let mut products = ctx.catalog.filter(&ProductFilter::category(slug));
    sort_products(&mut products, sort);

    Some(Page::titled(
        category.name.clone(),
        html!(
            "<h1>{}</h1><p class=\"category-description\">{}</p>\
             <div class=\"filters\">{}</div>{}",
            category.name,
            category.description,
            sort_select(sort),
            product_grid(products, ctx.state)
        ),
    ))
}

const PRODUCT_TABS: &[(&str, &str)] = &[
    ("description", "Beschreibung"),
    ("details", "Material & Pflege"),
    ("reviews", "Bewertungen"),
];

fn reviews_tab(ctx: &ViewContext, product: &Product) -> Html {
    let reviews = ctx.state.reviews.get(&product.id);

    let list: Html = reviews
        .into_iter()
        .flatten()
        .map(|r| {
            html!(
                "<article class=\"review\">{} <strong>{}</strong>{}<p>{}</p>\
                 <p class=\"review-meta\">{} am {}</p></article>",
                stars(r.rating),
                r.title.as_deref().unwrap_or(""),
                Html::when(r.is_verified_purchase, || Html::trusted(
                    " <span class=\"verified\">Verifizierter Kauf</span>"
                )),
                r.comment.as_deref().unwrap_or(""),
                r.reviewer_name.as_deref().unwrap_or("Anonym"),
                r.created_at.format("%d.%m.%Y").to_string()
            )
        })
        .collect();

    // Backend stats cover every approved review, the loaded list only the first page
    let figures = match ctx.state.review_stats.get(&product.id) {
        Some(stats) if stats.total_reviews > 0 => {
            Some((stats.average_rating, stats.total_reviews as usize))
        }
        _ => reviews.filter(|r| !r.is_empty()).map(|reviews| {
            let sum = reviews.iter().map(|r| r.rating as f64).sum::<f64>();
            (sum / reviews.len() as f64, reviews.len())
        }),
    };

    let summary = match figures {
        Some((average, count)) => html!(
            "<p class=\"rating-summary\">{} {} von 5 ({} Bewertungen)</p>",
            stars(average.round() as u8),
            format!("{:.1}", average).replace('.', ","),
            count
        ),
        None => Html::trusted("<p>Noch keine Bewertungen. Schreib die erste!</p>"),
    };

    let feedback = ctx.state.feedback(FormId::Review);
    let reviewer = ctx.state.user.as_ref().map(|u| u.full_name()).unwrap_or_default();

    html!(
        "{}{}<form class=\"review-form\" data-action=\"submit-review\" data-product=\"{}\">\
         <h3>Bewertung schreiben</h3>\
         <select name=\"rating\"><option value=\"5\">5 Sterne</option><option value=\"4\">4 Sterne</option>\
         <option value=\"3\">3 Sterne</option><option value=\"2\">2 Sterne</option>\
         <option value=\"1\">1 Stern</option></select>{}{}{}{}\
         <button type=\"submit\" class=\"btn\">Bewertung absenden</button></form>",
        summary,
        list,
        product.id,
        input(feedback, "title", "Titel", "text", "", false),
        textarea(feedback, "comment", "Deine Bewertung", false),
        input(feedback, "reviewer_name", "Name", "text", &reviewer, false),
        Html::when(
            feedback.and_then(|f| f.error("rating")).is_some(),
            || Html::trusted("<span class=\"error-message\">Bitte wähle 1 bis 5 Sterne.</span>")
        )
    )
}

pub fn product(ctx: &ViewContext) -> Option<Page> {
    let product = ctx.catalog.lookup(ctx.param("id")?)?;
    let tab = ctx
        .location
        .query("tab")
        .filter(|t| PRODUCT_TABS.iter().any(|(id, _)| id == t))
        .unwrap_or("description");

    let tabs: Html = PRODUCT_TABS
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

    let panel = match tab {
        "details" => html!(
            "<dl><dt>Material</dt><dd>{}</dd><dt>Pflege</dt><dd>{}</dd></dl>",
            product.material.as_deref().unwrap_or("Keine Angabe"),
            product.care_instructions.as_deref().unwrap_or("Keine Angabe")
        ),
        "reviews" => reviews_tab(ctx, product),
        _ => html!("<p>{}</p>", product.description),
    };

    let stock = match product.inventory_quantity {
        0 => Html::trusted("<p class=\"stock out\">Derzeit nicht vorrätig</p>"),
        1..=3 => html!(
            "<p class=\"stock low\">Nur noch {} verfügbar</p>",
            product.inventory_quantity
        ),
        _ => Html::trusted("<p class=\"stock\">Auf Lager, Lieferzeit 2-4 Werktage</p>"),
    };

    let breadcrumb = match product
        .category
        .as_deref()
        .and_then(|slug| ctx.catalog.category(slug))
    {
        Some(c) => html!(
            "{} / {} / ",
            link("/", "Start"),
            link(&format!("/category/{}", c.slug), &c.name)
        ),
        None => html!("{} / ", link("/", "Start")),
    };

    let related = ctx.catalog.related(product, 4);

    Some(Page::titled(
        product.name.clone(),
        html!(
            "<nav class=\"breadcrumb\">{}{}</nav>\
             <div class=\"product-detail\"><img src=\"{}\" alt=\"{}\">\
             <div class=\"product-info\"><h1>{}</h1><p class=\"product-price\">{}</p>\
             <p class=\"short-description\">{}</p>{}\
             <div class=\"product-actions\">{}{}</div></div></div>\
             <div class=\"tabs\">{}</div><div class=\"tab-panel\">{}</div>{}",
            breadcrumb,
            product.name,
            product.image,
            product.name,
            product.name,
            price_tag(product),
            product.short_description,
            stock,
            add_to_cart_button(product),
            wishlist_button(product, ctx.state),
            tabs,
            panel,
            Html::when(!related.is_empty(), || html!(
                "<section>{}{}</section>",
                section_title("Das könnte dir auch gefallen"),
                product_grid(related.iter().copied(), ctx.state)
            ))
        ),
    ))
}

pub fn search(ctx: &ViewContext) -> Page {
    let query = ctx
        .location
        .query("q")
        .unwrap_or(ctx.state.search_query.as_str())
        .trim();

    if query.is_empty() {
        let history: Html = ctx
            .state
            .search_history
            .iter()
            .map(|q| {
                html!(
                    "<li>{}</li>",
                    link(&format!("/search?q={}", urlencoding::encode(q)), q)
                )
            })
            .collect();

        return Page::new(html!(
            "<h1>Suche</h1><p>Wonach suchst du?</p>{}",
            Html::when(!history.is_empty(), || html!(
                "<h2>Zuletzt gesucht</h2><ul class=\"search-history\">{}</ul>",
                history
            ))
        ));
    }

    let results = ctx.catalog.filter(&ProductFilter::search(query));
    Page::new(html!(
        "<h1>Suchergebnisse für &bdquo;{}&ldquo;</h1><p class=\"result-count\">{} Treffer</p>{}",
        query,
        results.len(),
        product_grid(results, ctx.state)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::ShopConfig;
    use crate::backend::ReviewStats;
    use crate::router::{Location, Params};
    use crate::store::AppState;
    use chrono::Utc;

    fn render<T>(path: &str, params: &[(&str, &str)], state: &AppState, f: impl Fn(&ViewContext) -> T) -> T {
        let location = Location::parse(path);
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let catalog = Catalog::builtin();
        let shop = ShopConfig::default();
        let ctx = ViewContext {
            location: &location,
            params: &params,
            state,
            catalog: &catalog,
            shop: &shop,
            now: Utc::now(),
        };
        f(&ctx)
    }

    #[test]
    fn test_products_sorted_by_price() {
        let page = render("/products?sort=price-asc", &[], &AppState::default(), products);
        let body = page.body.as_str();
        let cheap = body.find("9,90 €").unwrap();
        let expensive = body.find("105,00 €").unwrap();
        assert!(cheap < expensive);
        assert!(body.contains("8 Produkte"));
    }

    #[test]
    fn test_category_filter_and_unknown_category() {
        let page = render("/category/ketten", &[("slug", "ketten")], &AppState::default(), category)
            .unwrap();
        assert_eq!(page.title.as_deref(), Some("Ketten"));
        assert!(page.body.as_str().contains("KORSIKA"));
        assert!(!page.body.as_str().contains("TIBET"));

        assert!(render("/category/schuhe", &[("slug", "schuhe")], &AppState::default(), category)
            .is_none());
    }

    #[test]
    fn test_product_by_slug_and_tabs() {
        let page = render(
            "/product/korsika-boho-kette-buddha?tab=details",
            &[("id", "korsika-boho-kette-buddha")],
            &AppState::default(),
            product,
        )
        .unwrap();
        let body = page.body.as_str();
        assert!(body.contains("tab active\" data-action=\"show-tab\" data-tab=\"details\""));
        assert!(body.contains("<dt>Material</dt>"));
    }

    #[test]
    fn test_review_summary_prefers_backend_stats() {
        let id = Catalog::builtin().products()[0].id;
        let path = format!("/product/{}?tab=reviews", id);
        let key = id.to_string();

        let empty = render(&path, &[("id", key.as_str())], &AppState::default(), product).unwrap();
        assert!(empty.body.as_str().contains("Noch keine Bewertungen"));

        let mut state = AppState::default();
        state.review_stats.insert(
            id,
            ReviewStats {
                average_rating: 4.5,
                total_reviews: 12,
                rating_distribution: Default::default(),
            },
        );
        let page = render(&path, &[("id", key.as_str())], &state, product).unwrap();
        assert!(page.body.as_str().contains("4,5 von 5 (12 Bewertungen)"));
    }

    #[test]
    fn test_search_results_and_history() {
        let page = render("/search?q=kette", &[], &AppState::default(), search);
        assert!(page.body.as_str().contains("KORSIKA"));

        let state = AppState {
            search_history: vec!["armband".to_string()],
            ..Default::default()
        };
        let page = render("/search", &[], &state, search);
        assert!(page.body.as_str().contains("/search?q=armband"));
    }
}
