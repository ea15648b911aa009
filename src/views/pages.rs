//! Content pages: about, contact, blog, legal texts and newsletter

use super::components::{input, link, textarea};
use super::{Page, ViewContext};
use crate::html;
use crate::html::Html;
use crate::store::FormId;

struct BlogPost {
    slug: &'static str,
    title: &'static str,
    category: &'static str,
    date: &'static str,
    image: &'static str,
    excerpt: &'static str,
    paragraphs: &'static [&'static str],
}

const BLOG_POSTS: &[BlogPost] = &[
    BlogPost {
        slug: "boho-styling-tipps",
        title: "Boho Styling Tipps",
        category: "Styling",
        date: "12.03.2024",
        image: "/images/blog/boho-styling.jpg",
        excerpt: "So kombinierst du Boho-Schmuck und luftige Kleider zu einem entspannten Look.",
        paragraphs: &[
            "Der Boho-Look lebt von Lagen: kombiniere eine lange Kette mit einer kurzen, \
             und trage mehrere zarte Armbänder zusammen.",
            "Zu schlichten Kleidern darf der Schmuck auffallen. Zu gemusterten Kimonos \
             wirken feine Anhänger am schönsten.",
        ],
    },
    BlogPost {
        slug: "schmuck-pflege",
        title: "Schmuck Pflege",
        category: "Pflege",
        date: "28.02.2024",
        image: "/images/blog/schmuck-pflege.jpg",
        excerpt: "Mit ein paar einfachen Handgriffen bleibt dein Lieblingsschmuck lange schön.",
        paragraphs: &[
            "Lege Schmuck vor dem Duschen, Schwimmen und Sport ab und bewahre ihn trocken auf.",
            "Silber reinigst du mit einem weichen Tuch. Perlen und Steine mögen keine \
             aggressiven Reinigungsmittel.",
        ],
    },
    BlogPost {
        slug: "boho-trends-2024",
        title: "Boho Trends 2024",
        category: "Trends",
        date: "15.01.2024",
        image: "/images/blog/boho-trends-2024.jpg",
        excerpt: "Erdtöne, Fransen und spirituelle Symbole prägen die Boho-Saison.",
        paragraphs: &[
            "In diesem Jahr sehen wir viele Erdtöne, Häkeldetails und Fransen.",
            "Bei Schmuck sind Buddha-, Kreuz- und Madonnen-Anhänger gefragter denn je.",
        ],
    },
    BlogPost {
        slug: "handgefertigt",
        title: "Handgefertigt",
        category: "Inspiration",
        date: "02.12.2023",
        image: "/images/blog/handgefertigt-schmuck.jpg",
        excerpt: "Warum jedes unserer handgemachten Stücke ein Unikat ist.",
        paragraphs: &[
            "Viele unserer Armbänder und Ketten werden von Hand auf Ibiza gefertigt.",
            "Kleine Unterschiede in Farbe und Form machen jedes Stück einzigartig.",
        ],
    },
];

fn paragraphs(texts: &[&str]) -> Html {
    texts.iter().map(|p| html!("<p>{}</p>", p)).collect()
}

fn legal_page(title: &str, sections: &[(&str, &[&str])]) -> Page {
    let body: Html = sections
        .iter()
        .map(|(heading, texts)| html!("<h2>{}</h2>{}", heading, paragraphs(texts)))
        .collect();
    Page::new(html!("<article class=\"legal\"><h1>{}</h1>{}</article>", title, body))
}

pub fn about(ctx: &ViewContext) -> Page {
    Page::new(html!(
        "<article class=\"about\"><h1>Über uns</h1>{}<p>{}</p></article>",
        paragraphs(&[
            "Casa Petrada steht für handverlesenen Boho-Schmuck und Mode mit Seele.",
            "Unsere Stücke entstehen in kleinen Manufakturen und bei Kunsthandwerkern auf Ibiza, \
             viele davon in Handarbeit.",
            "Wir glauben an Schmuck, der Geschichten erzählt, und an Mode, die sich gut anfühlt.",
        ]),
        link("/contact", &format!("Schreib uns an {}", ctx.shop.contact_email))
    ))
}

pub fn contact(ctx: &ViewContext) -> Page {
    let feedback = ctx.state.feedback(FormId::Contact);
    let user = ctx.state.user.as_ref();

    let sent: Html = ctx
        .state
        .contact_submissions
        .last()
        .map(|s| {
            html!(
                "<p class=\"hint\">Deine letzte Nachricht &bdquo;{}&ldquo; vom {} ist bei uns eingegangen.</p>",
                s.form.subject,
                s.submitted_at.format("%d.%m.%Y").to_string()
            )
        })
        .unwrap_or_default();

    Page::new(html!(
        "<h1>Kontakt</h1><p>Fragen zu Produkten oder deiner Bestellung? Schreib uns an {}.</p>{}\
         <form class=\"contact-form\" data-action=\"contact\">{}{}{}{}{}\
         <button type=\"submit\" class=\"btn btn-primary\">Nachricht senden</button></form>",
        ctx.shop.contact_email,
        sent,
        input(feedback, "first_name", "Vorname", "text", user.map(|u| u.first_name.as_str()).unwrap_or(""), true),
        input(feedback, "last_name", "Nachname", "text", user.map(|u| u.last_name.as_str()).unwrap_or(""), true),
        input(feedback, "email", "E-Mail", "email", user.map(|u| u.email.as_str()).unwrap_or(""), true),
        input(feedback, "subject", "Betreff", "text", "", true),
        textarea(feedback, "message", "Nachricht", true)
    ))
}

pub fn blog(_ctx: &ViewContext) -> Page {
    let posts: Html = BLOG_POSTS
        .iter()
        .map(|post| {
            let href = format!("/blog/{}", post.slug);
            html!(
                "<article class=\"blog-card\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\">\
                 <span class=\"category\">{}</span><h2>{}</h2><p class=\"date\">{}</p><p>{}</p>{}</article>",
                post.image,
                post.title,
                post.category,
                link(&href, post.title),
                post.date,
                post.excerpt,
                link(&href, "Weiterlesen")
            )
        })
        .collect();

    Page::new(html!("<h1>Blog</h1><div class=\"blog-grid\">{}</div>", posts))
}

pub fn blog_post(ctx: &ViewContext) -> Option<Page> {
    let slug = ctx.param("slug")?;
    let post = BLOG_POSTS.iter().find(|p| p.slug == slug)?;

    Some(Page::titled(
        post.title,
        html!(
            "<article class=\"blog-post\"><span class=\"category\">{}</span><h1>{}</h1>\
             <p class=\"date\">{}</p><img src=\"{}\" alt=\"{}\">{}</article>{}",
            post.category,
            post.title,
            post.date,
            post.image,
            post.title,
            paragraphs(post.paragraphs),
            link("/blog", "Zurück zum Blog")
        ),
    ))
}

pub fn impressum(ctx: &ViewContext) -> Page {
    let contact = format!("E-Mail: {}", ctx.shop.contact_email);
    legal_page(
        "Impressum",
        &[
            ("Angaben gemäß § 5 TMG", &["Casa Petrada, Inhaberin: Petra Schmidt", "Musterstraße 12, 20095 Hamburg"]),
            ("Kontakt", &[contact.as_str()]),
            ("Umsatzsteuer-ID", &["Umsatzsteuer-Identifikationsnummer gemäß § 27a UStG: DE123456789"]),
            (
                "Streitschlichtung",
                &["Wir sind nicht bereit oder verpflichtet, an Streitbeilegungsverfahren vor einer \
                   Verbraucherschlichtungsstelle teilzunehmen."],
            ),
        ],
    )
}

pub fn datenschutz(_ctx: &ViewContext) -> Page {
    legal_page(
        "Datenschutzerklärung",
        &[
            (
                "Verantwortliche Stelle",
                &["Verantwortlich für die Datenverarbeitung auf dieser Website ist Casa Petrada."],
            ),
            (
                "Lokale Speicherung",
                &["Warenkorb, Wunschliste und Anmeldestatus werden lokal in deinem Browser \
                   gespeichert und nicht für Tracking verwendet."],
            ),
            (
                "Bestellungen und Kontakt",
                &["Daten aus Bestellungen und Kontaktanfragen verarbeiten wir ausschließlich zur \
                   Abwicklung deiner Anfrage."],
            ),
            (
                "Deine Rechte",
                &["Du hast jederzeit das Recht auf Auskunft, Berichtigung und Löschung deiner Daten."],
            ),
        ],
    )
}

pub fn agb(_ctx: &ViewContext) -> Page {
    legal_page(
        "Allgemeine Geschäftsbedingungen",
        &[
            ("Geltungsbereich", &["Diese AGB gelten für alle Bestellungen über unseren Online-Shop."]),
            (
                "Vertragsschluss",
                &["Mit Absenden der Bestellung gibst du ein verbindliches Angebot ab. \
                   Der Vertrag kommt mit unserer Auftragsbestätigung zustande."],
            ),
            ("Preise", &["Alle Preise verstehen sich inklusive der gesetzlichen Mehrwertsteuer."]),
            (
                "Eigentumsvorbehalt",
                &["Die Ware bleibt bis zur vollständigen Bezahlung unser Eigentum."],
            ),
        ],
    )
}

pub fn widerruf(_ctx: &ViewContext) -> Page {
    legal_page(
        "Widerrufsbelehrung",
        &[
            (
                "Widerrufsrecht",
                &["Du hast das Recht, binnen vierzehn Tagen ohne Angabe von Gründen diesen Vertrag \
                   zu widerrufen."],
            ),
            (
                "Folgen des Widerrufs",
                &["Wir erstatten dir alle Zahlungen einschließlich der Lieferkosten unverzüglich, \
                   spätestens binnen vierzehn Tagen."],
            ),
        ],
    )
}

pub fn versand(ctx: &ViewContext) -> Page {
    let policy = ctx.shop.shipping_policy();
    let shipping = format!(
        "Innerhalb Deutschlands versenden wir für {}, ab einem Bestellwert von {} versandkostenfrei.",
        policy.flat_rate, policy.free_from
    );
    legal_page(
        "Versand & Zahlung",
        &[
            ("Versandkosten", &[shipping.as_str()]),
            ("Lieferzeit", &["Die Lieferzeit beträgt 2-4 Werktage."]),
            ("Zahlungsarten", &["PayPal, Klarna, Kreditkarte und Vorkasse."]),
        ],
    )
}

pub fn newsletter_unsubscribe(ctx: &ViewContext) -> Page {
    let feedback = ctx.state.feedback(FormId::Unsubscribe);
    let email = ctx.location.query("email").unwrap_or("");

    Page::new(html!(
        "<h1>Newsletter abmelden</h1>\
         <p>Schade, dass du gehst! Gib deine E-Mail-Adresse ein, um dich abzumelden.</p>\
         <form data-action=\"unsubscribe-newsletter\">{}\
         <button type=\"submit\" class=\"btn\">Abmelden</button></form>",
        input(feedback, "email", "E-Mail", "email", email, true)
    ))
}

pub fn not_found(ctx: &ViewContext) -> Page {
    Page::new(html!(
        "<div class=\"not-found\"><h1>404</h1><p>Die Seite &bdquo;{}&ldquo; wurde leider nicht gefunden.</p>{}</div>",
        ctx.location.path,
        link("/", "Zur Startseite")
    ))
}
