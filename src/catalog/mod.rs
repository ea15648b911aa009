//! Product Catalog
//!
//! The built-in catalog mirrors the shop's seed assortment and is used until
//! the backend product list has been loaded into the store.

pub mod types;

pub use types::{Category, Product, ProductId};

use crate::money::Money;

/// Filter for product listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    pub new_arrival: Option<bool>,
}

impl ProductFilter {
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            category: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Default::default()
        }
    }

    fn accepts(&self, product: &Product) -> bool {
        if let Some(slug) = &self.category {
            if product.category.as_deref() != Some(slug.as_str()) {
                return false;
            }
        }
        if let Some(query) = &self.search {
            if !product.matches_query(query) {
                return false;
            }
        }
        let flag_ok = |wanted: Option<bool>, actual: bool| wanted.map_or(true, |w| w == actual);

        flag_ok(self.featured, product.is_featured)
            && flag_ok(self.bestseller, product.is_bestseller)
            && flag_ok(self.new_arrival, product.is_new_arrival)
    }
}

/// An ordered collection of products and categories
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let mut categories = categories;
        categories.sort_by_key(|c| c.sort_order);
        Self {
            products,
            categories,
        }
    }

    /// The compiled-in assortment
    pub fn builtin() -> Self {
        Self::new(builtin_products(), builtin_categories())
    }

    /// Catalog from backend products, keeping the built-in category list
    pub fn with_products(products: Vec<Product>) -> Self {
        Self::new(products, builtin_categories())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up by numeric id
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up by a route parameter: numeric id or slug
    pub fn lookup(&self, key: &str) -> Option<&Product> {
        match key.parse::<ProductId>() {
            Ok(id) => self.find(id),
            Err(_) => self.products.iter().find(|p| p.slug == key),
        }
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.accepts(p)).collect()
    }

    pub fn featured(&self) -> Vec<&Product> {
        self.filter(&ProductFilter {
            featured: Some(true),
            ..Default::default()
        })
    }

    pub fn bestsellers(&self) -> Vec<&Product> {
        self.filter(&ProductFilter {
            bestseller: Some(true),
            ..Default::default()
        })
    }

    pub fn new_arrivals(&self) -> Vec<&Product> {
        self.filter(&ProductFilter {
            new_arrival: Some(true),
            ..Default::default()
        })
    }

    /// Other products of the same category
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.id != product.id && p.category == product.category)
            .take(limit)
            .collect()
    }
}

fn builtin_categories() -> Vec<Category> {
    vec![
        Category::new("Armbänder", "armbaender", "Handgefertigte Boho-Armbänder in verschiedenen Stilen", 1),
        Category::new("Ketten", "ketten", "Elegante Ketten und Halsketten im Boho-Style", 2),
        Category::new("Fußkettchen", "fussketchen", "Zarte Fußkettchen für den perfekten Boho-Look", 3),
        Category::new("Modeschmuck", "modeschmuck", "Trendiger Modeschmuck für jeden Anlass", 4),
        Category::new("Kleider", "kleider", "Luftige Boho-Kleider für den Sommer", 5),
        Category::new("Oberteile", "oberteile", "Stylische Oberteile im Boho-Design", 6),
        Category::new("Taschen", "taschen", "Praktische und schöne Taschen", 7),
    ]
}

fn builtin_products() -> Vec<Product> {
    vec![
        Product::new(
            1,
            "Maxi Kleid schwarz SICILIA mit Volants und broderie anglaise",
            "maxi-kleid-schwarz-sicilia",
            Money::from_cents(14900),
        )
        .category("kleider")
        .describe(
            "Romantisches schwarzes Maxikleid mit Volants",
            "Elegantes schwarzes Maxikleid mit romantischen Volants und broderie anglaise Details.",
        )
        .material("Baumwolle, Spitze", "Handwäsche empfohlen, nicht bleichen, liegend trocknen")
        .stock(5)
        .on_sale(Money::from_cents(17900))
        .flags(true, true, false, true),
        Product::new(
            2,
            "KORSIKA - Boho Kette mit Buddha Anhänger",
            "korsika-boho-kette-buddha",
            Money::from_cents(4990),
        )
        .category("ketten")
        .describe(
            "Spirituelle Kette mit Buddha-Anhänger",
            "Spirituelle Boho-Kette mit handgearbeitetem Buddha-Anhänger.",
        )
        .material(
            "Halbedelsteine, Messing versilbert",
            "Mit weichem Tuch reinigen, nicht mit Wasser in Berührung bringen",
        )
        .stock(10)
        .flags(true, true, false, true),
        Product::new(
            3,
            "Kimono GOBI mit Fransen und Print",
            "kimono-gobi-fransen-print",
            Money::from_cents(5490),
        )
        .category("oberteile")
        .describe(
            "Luftiger Kimono mit Fransen",
            "Luftiger Kimono im Boho-Style mit verspielten Fransen.",
        )
        .material("Viskose", "Maschinenwäsche 30°C, nicht schleudern")
        .stock(8)
        .flags(false, true, false, false),
        Product::new(
            4,
            "Boho Kleid in weiß mit Stickerei in schwarz von Piti Cuiti",
            "boho-kleid-weiss-stickerei-piti-cuiti",
            Money::from_cents(10500),
        )
        .category("kleider")
        .describe(
            "Weißes Kleid mit schwarzer Stickerei",
            "Traumhaftes weißes Kleid mit kontrastierenden schwarzen Stickereien.",
        )
        .material("Baumwolle, handgestickte Details", "Schonwäsche 30°C, nicht bleichen")
        .stock(3)
        .flags(true, false, true, true),
        Product::new(
            5,
            "MARIA Lange Boho Kette mit einem großen Kreuzanhänger",
            "maria-lange-boho-kette-kreuz",
            Money::from_cents(6990),
        )
        .category("ketten")
        .describe(
            "Lange Kette mit Kreuzanhänger",
            "Statement-Kette mit imposantem Kreuzanhänger für besondere Anlässe.",
        )
        .material("Messing, Halbedelsteine", "Trocken lagern, mit weichem Tuch reinigen")
        .stock(7)
        .flags(false, false, false, true),
        Product::new(
            6,
            "Boho Schmuck Anhänger FLÜGEL SILVERSHINY der Firma SchauTime",
            "boho-anhaenger-fluegel-silvershiny",
            Money::from_cents(990),
        )
        .category("modeschmuck")
        .describe("Silberner Flügel-Anhänger", "Zarter Flügel-Anhänger in silbernem Finish.")
        .material("Versilbert", "Nicht mit Wasser in Berührung bringen")
        .stock(15),
        Product::new(
            7,
            "TIBET - Armband aus Dzi Beads",
            "tibet-armband-dzi-beads",
            Money::from_cents(3290),
        )
        .category("armbaender")
        .describe(
            "Armband mit Dzi-Perlen",
            "Authentisches Armband mit traditionellen Dzi-Perlen aus Tibet.",
        )
        .material("Dzi-Perlen, Naturstein", "Schonend behandeln, nicht fallen lassen")
        .stock(12)
        .flags(false, false, false, true),
        Product::new(
            8,
            "LOURDES - kurze Kette mit Madonna Anhänger",
            "lourdes-kurze-kette-madonna",
            Money::from_cents(5990),
        )
        .category("ketten")
        .describe(
            "Kurze Kette mit Madonna-Anhänger",
            "Spirituelle Kette mit Madonna-Anhänger, perfekt für den Alltag.",
        )
        .material("Messing, Emaille", "Mit weichem Tuch pflegen")
        .stock(9)
        .flags(false, false, false, true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 8);
        assert_eq!(catalog.categories().first().map(|c| c.slug.as_str()), Some("armbaender"));
        assert_eq!(catalog.find(2).map(|p| p.price), Some(Money::from_cents(4990)));
    }

    #[test]
    fn test_lookup_by_id_or_slug() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("7").map(|p| p.id), Some(7));
        assert_eq!(catalog.lookup("tibet-armband-dzi-beads").map(|p| p.id), Some(7));
        assert!(catalog.lookup("abc").is_none());
        assert!(catalog.lookup("999").is_none());
    }

    #[test]
    fn test_filters() {
        let catalog = Catalog::builtin();

        let ketten = catalog.filter(&ProductFilter::category("ketten"));
        assert_eq!(ketten.len(), 3);

        let hits = catalog.filter(&ProductFilter::search("kleid"));
        assert!(hits.iter().all(|p| p.name.to_lowercase().contains("kleid")
            || p.description.to_lowercase().contains("kleid")
            || p.short_description.to_lowercase().contains("kleid")));
        assert!(!hits.is_empty());

        assert_eq!(catalog.featured().len(), 3);
        assert_eq!(catalog.new_arrivals().len(), 1);
    }

    #[test]
    fn test_related_excludes_self() {
        let catalog = Catalog::builtin();
        let korsika = catalog.find(2).unwrap();
        let related = catalog.related(korsika, 4);
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|p| p.id != 2));
    }
}
