//! Product catalog types and the built-in sample inventory.
//!
//! Live deployments serve products from the hosted search index; the sample
//! catalog below keeps the storefront browsable (and the CLI seeder fed)
//! when no index is configured.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use renewly_core::ProductId;

/// Cosmetic condition grading for refurbished units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionGrade {
    Excellent,
    Good,
    Fair,
}

/// A refurbished laptop as stored in the products index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Per-unit serial label printed on the chassis.
    pub unit_id: String,
    pub title: String,
    pub brand: String,
    pub specs: String,
    /// Selling price in rupees.
    pub price: Decimal,
    /// Original MRP, when known, for strike-through display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Decimal>,
    pub image: String,
    pub ram: String,
    pub storage: String,
    pub condition_grade: ConditionGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_notes: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub included: Vec<String>,
}

impl Product {
    /// Whether any units are on hand.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// The in-process catalog used when the search index is not configured.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build the catalog from a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The built-in sample inventory.
    #[must_use]
    pub fn sample() -> Self {
        Self::new(sample_products())
    }

    /// All products.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Case-insensitive substring match over title, brand, and specs.
    ///
    /// A deliberately simple stand-in for the hosted index; good enough for
    /// demos and tests, not ranked.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|product| {
                product.title.to_lowercase().contains(&needle)
                    || product.brand.to_lowercase().contains(&needle)
                    || product.specs.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

fn rupees(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

/// Sample refurbished inventory, mirroring what the live index carries.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("p1"),
            unit_id: "RN-DL5520-EX-0001".to_owned(),
            title: "Dell Latitude 5520 · i5 11th Gen · 16GB · 512GB SSD".to_owned(),
            brand: "Dell".to_owned(),
            specs: "i5-1145G7 · Intel Iris Xe".to_owned(),
            price: rupees(42_999),
            mrp: Some(rupees(54_999)),
            image: "/products/p1/1.png".to_owned(),
            ram: "16GB".to_owned(),
            storage: "512GB".to_owned(),
            condition_grade: ConditionGrade::Excellent,
            condition_notes: Some("Minor mark on lid, screen flawless".to_owned()),
            stock: 7,
            included: vec!["65W charger".to_owned(), "12-month warranty".to_owned()],
        },
        Product {
            id: ProductId::new("p2"),
            unit_id: "RN-TPX1C9-GD-0002".to_owned(),
            title: "Lenovo ThinkPad X1 Carbon Gen 9 · i7 · 16GB · 1TB SSD".to_owned(),
            brand: "Lenovo".to_owned(),
            specs: "i7-1165G7 · 14\" FHD+".to_owned(),
            price: rupees(72_499),
            mrp: Some(rupees(1_09_000)),
            image: "/products/p2/1.png".to_owned(),
            ram: "16GB".to_owned(),
            storage: "1TB".to_owned(),
            condition_grade: ConditionGrade::Good,
            condition_notes: Some("Light keyboard shine".to_owned()),
            stock: 3,
            included: vec!["USB-C charger".to_owned(), "12-month warranty".to_owned()],
        },
        Product {
            id: ProductId::new("p3"),
            unit_id: "RN-HPEB840-EX-0003".to_owned(),
            title: "HP EliteBook 840 G8 · i5 · 8GB · 256GB SSD".to_owned(),
            brand: "HP".to_owned(),
            specs: "i5-1135G7 · 14\" FHD".to_owned(),
            price: rupees(35_999),
            mrp: Some(rupees(47_500)),
            image: "/products/p3/1.png".to_owned(),
            ram: "8GB".to_owned(),
            storage: "256GB".to_owned(),
            condition_grade: ConditionGrade::Excellent,
            condition_notes: None,
            stock: 12,
            included: vec!["65W charger".to_owned(), "6-month warranty".to_owned()],
        },
        Product {
            id: ProductId::new("p4"),
            unit_id: "RN-MBA-M1-GD-0004".to_owned(),
            title: "Apple MacBook Air M1 · 8GB · 256GB SSD".to_owned(),
            brand: "Apple".to_owned(),
            specs: "Apple M1 · 13.3\" Retina".to_owned(),
            price: rupees(58_999),
            mrp: Some(rupees(92_900)),
            image: "/products/p4/1.png".to_owned(),
            ram: "8GB".to_owned(),
            storage: "256GB".to_owned(),
            condition_grade: ConditionGrade::Good,
            condition_notes: Some("Two faint scratches on base".to_owned()),
            stock: 5,
            included: vec!["30W charger".to_owned(), "6-month warranty".to_owned()],
        },
        Product {
            id: ProductId::new("p5"),
            unit_id: "RN-DLXPS13-FR-0005".to_owned(),
            title: "Dell XPS 13 9310 · i7 · 16GB · 512GB SSD".to_owned(),
            brand: "Dell".to_owned(),
            specs: "i7-1185G7 · 13.4\" FHD+".to_owned(),
            price: rupees(64_999),
            mrp: Some(rupees(1_19_990)),
            image: "/products/p5/1.png".to_owned(),
            ram: "16GB".to_owned(),
            storage: "512GB".to_owned(),
            condition_grade: ConditionGrade::Fair,
            condition_notes: Some("Visible wear on palm rest, new battery fitted".to_owned()),
            stock: 2,
            included: vec!["45W charger".to_owned(), "6-month warranty".to_owned()],
        },
        Product {
            id: ProductId::new("p6"),
            unit_id: "RN-ACSW3-EX-0006".to_owned(),
            title: "Acer Swift 3 · Ryzen 5 · 8GB · 512GB SSD".to_owned(),
            brand: "Acer".to_owned(),
            specs: "Ryzen 5 5500U · 14\" FHD".to_owned(),
            price: rupees(28_499),
            mrp: Some(rupees(39_999)),
            image: "/products/p6/1.png".to_owned(),
            ram: "8GB".to_owned(),
            storage: "512GB".to_owned(),
            condition_grade: ConditionGrade::Excellent,
            condition_notes: None,
            stock: 0,
            included: vec!["65W charger".to_owned(), "6-month warranty".to_owned()],
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_lookup() {
        let catalog = Catalog::sample();
        assert!(catalog.get(&ProductId::new("p1")).is_some());
        assert!(catalog.get(&ProductId::new("missing")).is_none());
    }

    #[test]
    fn test_sample_catalog_search() {
        let catalog = Catalog::sample();
        let hits = catalog.search("thinkpad");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].brand, "Lenovo");

        // Empty query lists everything
        assert_eq!(catalog.search("  ").len(), catalog.all().len());
    }

    #[test]
    fn test_stock_flag() {
        let catalog = Catalog::sample();
        assert!(catalog.get(&ProductId::new("p1")).unwrap().in_stock());
        assert!(!catalog.get(&ProductId::new("p6")).unwrap().in_stock());
    }
}
