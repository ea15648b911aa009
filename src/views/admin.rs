//! Admin dashboard

use super::components::link;
use super::{Page, ViewContext};
use crate::backend::dto::AdminStats;
use crate::backend::{AdminAnalytics, AdminCustomerList, AdminOrder, AnalyticsRange, ORDER_STATUSES};
use crate::html;
use crate::html::Html;
use crate::money::Money;

fn trend(current: f64, previous: f64) -> Html {
    if previous <= 0.0 {
        return Html::new();
    }
    let change = (current - previous) / previous * 100.0;
    let class = if change >= 0.0 { "up" } else { "down" };
    html!(
        " <span class=\"trend {}\">{}%</span>",
        class,
        format!("{:+.1}", change).replace('.', ",")
    )
}

fn stats_panel(stats: &AdminStats) -> Html {
    let overview = &stats.overview;
    let trends = &stats.trends;

    let cards = html!(
        "<div class=\"stat-cards\">\
         <div class=\"stat\"><h3>Umsatz</h3><p>{}</p></div>\
         <div class=\"stat\"><h3>Bestellungen</h3><p>{}</p></div>\
         <div class=\"stat\"><h3>Produkte</h3><p>{}</p></div>\
         <div class=\"stat\"><h3>Kunden</h3><p>{}</p></div></div>\
         <div class=\"trends\"><p>Bestellungen diese Woche: {}{}</p>\
         <p>Umsatz diesen Monat: {}{}</p></div>",
        Money::from_euros(overview.total_revenue),
        overview.total_orders,
        overview.total_products,
        overview.total_customers,
        trends.orders_this_week,
        trend(trends.orders_this_week as f64, trends.orders_last_week as f64),
        Money::from_euros(trends.revenue_this_month),
        trend(trends.revenue_this_month, trends.revenue_last_month)
    );

    let recent = if stats.recent_orders.is_empty() {
        Html::trusted("<p>Keine aktuellen Bestellungen.</p>")
    } else {
        let rows: Html = stats
            .recent_orders
            .iter()
            .map(|o| {
                html!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    o.order_number,
                    o.customer_name,
                    Money::from_euros(o.total),
                    o.status
                )
            })
            .collect();
        html!(
            "<table class=\"recent-orders\"><thead><tr><th>Bestellung</th><th>Kunde</th>\
             <th>Summe</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    html!("{}<h2>Letzte Bestellungen</h2>{}", cards, recent)
}

const ADMIN_TABS: &[(&str, &str)] = &[
    ("overview", "Übersicht"),
    ("orders", "Bestellungen"),
    ("customers", "Kunden"),
    ("analytics", "Analysen"),
    ("products", "Produkte"),
];

fn orders_panel(orders: &[AdminOrder]) -> Html {
    if orders.is_empty() {
        return Html::trusted("<p>Keine Bestellungen gefunden.</p>");
    }

    let rows: Html = orders
        .iter()
        .map(|order| {
            let options: Html = ORDER_STATUSES
                .iter()
                .map(|status| {
                    html!(
                        "<option value=\"{}\"{}>{}</option>",
                        status,
                        Html::when(*status == order.status, || Html::trusted(" selected")),
                        status
                    )
                })
                .collect();
            html!(
                "<tr><td>{}</td><td>{}<br><small>{}</small></td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><select data-change=\"update-order-status\" data-order=\"{}\">{}</select></td></tr>",
                order.order_number,
                order.customer_name,
                order.customer_email,
                order
                    .created_at
                    .map(|at| at.format("%d.%m.%Y").to_string())
                    .unwrap_or_default(),
                order.items_count,
                Money::from_euros(order.total_amount),
                order.id,
                options
            )
        })
        .collect();

    html!(
        "<table class=\"admin-orders\"><thead><tr><th>Bestellung</th><th>Kunde</th><th>Datum</th>\
         <th>Artikel</th><th>Summe</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

fn customers_panel(list: &AdminCustomerList) -> Html {
    if list.customers.is_empty() {
        return Html::trusted("<p>Keine Kunden gefunden.</p>");
    }

    let rows: Html = list
        .customers
        .iter()
        .map(|customer| {
            html!(
                "<tr><td>{} {}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                customer.first_name,
                customer.last_name,
                customer.email,
                customer
                    .created_at
                    .map(|at| at.format("%d.%m.%Y").to_string())
                    .unwrap_or_default(),
                if customer.is_active { "aktiv" } else { "inaktiv" },
                if customer.newsletter_subscribed { "ja" } else { "nein" }
            )
        })
        .collect();

    html!(
        "<p>{} Kunden insgesamt</p><table class=\"admin-customers\"><thead><tr><th>Name</th>\
         <th>E-Mail</th><th>Registriert</th><th>Status</th><th>Newsletter</th></tr></thead>\
         <tbody>{}</tbody></table>",
        list.total,
        rows
    )
}

fn change(percentage: f64) -> Html {
    let class = if percentage >= 0.0 { "up" } else { "down" };
    html!(
        " <span class=\"trend {}\">{}%</span>",
        class,
        format!("{:+.1}", percentage).replace('.', ",")
    )
}

fn analytics_panel(range: AnalyticsRange, analytics: &AdminAnalytics) -> Html {
    let ranges: Html = AnalyticsRange::ALL
        .iter()
        .map(|r| {
            html!(
                "<a href=\"/admin?tab=analytics&range={}\" data-link class=\"range{}\">{}</a>",
                r.as_str(),
                Html::when(*r == range, || Html::trusted(" active")),
                r.label()
            )
        })
        .collect();

    let figures = html!(
        "<div class=\"stat-cards\">\
         <div class=\"stat\"><h3>Umsatz</h3><p>{}{}</p></div>\
         <div class=\"stat\"><h3>Bestellungen</h3><p>{}{}</p></div>\
         <div class=\"stat\"><h3>Neue Kunden</h3><p>{}{}</p></div>\
         <div class=\"stat\"><h3>Conversion</h3><p>{}%{}</p></div></div>",
        Money::from_euros(analytics.revenue.total),
        change(analytics.revenue.change_percentage),
        analytics.orders.total.round() as u64,
        change(analytics.orders.change_percentage),
        analytics.customers.total.round() as u64,
        change(analytics.customers.change_percentage),
        format!("{:.1}", analytics.conversion_rate.rate).replace('.', ","),
        change(analytics.conversion_rate.change_percentage)
    );

    let top: Html = analytics
        .top_products
        .iter()
        .map(|p| {
            html!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                p.name,
                p.sales,
                Money::from_euros(p.revenue)
            )
        })
        .collect();

    let categories: Html = analytics
        .sales_by_category
        .iter()
        .map(|c| {
            html!(
                "<li>{}: {}%</li>",
                c.category,
                format!("{:.0}", c.percentage)
            )
        })
        .collect();

    html!(
        "<div class=\"ranges\">{}</div>{}<h2>Top-Produkte</h2>\
         <table class=\"top-products\"><thead><tr><th>Produkt</th><th>Verkäufe</th>\
         <th>Umsatz</th></tr></thead><tbody>{}</tbody></table>\
         <h2>Umsatz nach Kategorie</h2><ul class=\"categories\">{}</ul>",
        ranges,
        figures,
        top,
        categories
    )
}

fn products_panel(ctx: &ViewContext) -> Html {
    let rows: Html = ctx
        .catalog
        .products()
        .iter()
        .map(|product| {
            html!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><button class=\"btn\" \
                 data-action=\"toggle-featured\" data-id=\"{}\">{}</button></td></tr>",
                product.name,
                product.price,
                product.inventory_quantity,
                product.id,
                if product.is_featured { "Hervorgehoben ✓" } else { "Hervorheben" }
            )
        })
        .collect();

    html!(
        "<table class=\"admin-products\"><thead><tr><th>Produkt</th><th>Preis</th>\
         <th>Bestand</th><th>Hervorgehoben</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn dashboard(ctx: &ViewContext) -> Page {
    let state = ctx.state;

    if !state.is_authenticated() {
        return Page::new(html!(
            "<h1>Admin Dashboard</h1><p>Bitte melde dich mit einem Administrator-Konto an.</p>{}",
            link("/login?next=/admin", "Anmelden")
        ));
    }
    if !state.is_admin() {
        return Page::new(Html::trusted(
            "<h1>Admin Dashboard</h1>\
             <p class=\"error\">Zugriff verweigert. Dieses Konto hat keine Administratorrechte.</p>",
        ));
    }

    let tab = ctx
        .location
        .query("tab")
        .filter(|t| ADMIN_TABS.iter().any(|(id, _)| id == t))
        .unwrap_or("overview");

    let tabs: Html = ADMIN_TABS
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
        "orders" => orders_panel(&state.admin_orders),
        "customers" => match &state.admin_customers {
            Some(list) => customers_panel(list),
            None => Html::trusted("<p>Kunden konnten nicht geladen werden.</p>"),
        },
        "analytics" => {
            let requested = ctx
                .location
                .query("range")
                .and_then(AnalyticsRange::parse)
                .unwrap_or_default();
            match &state.admin_analytics {
                Some((range, analytics)) if *range == requested => analytics_panel(*range, analytics),
                _ => Html::trusted("<p>Analysen konnten nicht geladen werden.</p>"),
            }
        }
        "products" => products_panel(ctx),
        _ => match &state.admin_stats {
            Some(stats) => stats_panel(stats),
            None => Html::trusted("<p>Statistiken konnten nicht geladen werden.</p>"),
        },
    };

    Page::new(html!(
        "<h1>Admin Dashboard</h1><div class=\"tabs\">{}</div><div class=\"tab-panel\">{}</div>",
        tabs,
        panel
    ))
}
