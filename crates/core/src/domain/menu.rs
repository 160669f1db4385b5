use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MenuError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    Mild,
    Medium,
    Hot,
}

impl SpiceLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Medium => "medium",
            Self::Hot => "hot",
        }
    }
}

/// A priced, independently identified option of a menu item (e.g. a size).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    /// Unit price for items ordered directly. Ignored when `variants` is
    /// non-empty; the variant price is authoritative.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub spice_level: Option<SpiceLevel>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl MenuItem {
    fn search_haystack(&self) -> String {
        let mut haystack = String::new();
        haystack.push_str(&self.name);
        haystack.push(' ');
        haystack.push_str(&self.description);
        for tag in &self.tags {
            haystack.push(' ');
            haystack.push_str(tag);
        }
        for allergen in &self.allergens {
            haystack.push(' ');
            haystack.push_str(allergen);
        }
        haystack.to_lowercase()
    }
}

/// Snapshot of an orderable entry resolved from the menu. Carries the name
/// and authoritative price by value so cart lines never hold live catalog
/// references.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderableRef {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
}

/// The restaurant catalog. Read-only after construction; the only state
/// shared across concurrent calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Menu {
    items: Vec<MenuItem>,
}

#[derive(Deserialize)]
struct MenuFile {
    #[serde(default)]
    items: Vec<MenuItem>,
}

impl Menu {
    /// Builds a menu, enforcing that every orderable identifier (variant ids
    /// plus bare-item ids) is globally unique and every price is usable.
    pub fn new(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        let mut seen = std::collections::HashSet::new();

        for item in &items {
            if item.variants.is_empty() {
                let price = item.price.ok_or_else(|| MenuError::MissingPrice {
                    item_id: item.id.0.clone(),
                })?;
                if price.is_sign_negative() {
                    return Err(MenuError::NegativePrice { id: item.id.0.clone() });
                }
                if !seen.insert(item.id.0.clone()) {
                    return Err(MenuError::DuplicateId { id: item.id.0.clone() });
                }
            } else {
                for variant in &item.variants {
                    if variant.price.is_sign_negative() {
                        return Err(MenuError::NegativePrice { id: variant.id.0.clone() });
                    }
                    if !seen.insert(variant.id.0.clone()) {
                        return Err(MenuError::DuplicateId { id: variant.id.0.clone() });
                    }
                }
            }
        }

        Ok(Self { items })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, MenuError> {
        let file: MenuFile = toml::from_str(raw).map_err(MenuError::Parse)?;
        Self::new(file.items)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, MenuError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| MenuError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Case-insensitive substring search over name, description, tags, and
    /// allergens.
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.items.iter().filter(|item| item.search_haystack().contains(&needle)).collect()
    }

    /// Resolves an orderable identifier to a priced snapshot. Variant ids
    /// resolve through their owning item; bare items resolve by item id.
    pub fn resolve(&self, id: &str) -> Option<OrderableRef> {
        for item in &self.items {
            if item.variants.is_empty() {
                if item.id.0 == id {
                    return item.price.map(|price| OrderableRef {
                        id: item.id.0.clone(),
                        name: item.name.clone(),
                        unit_price: price,
                    });
                }
                continue;
            }

            for variant in &item.variants {
                if variant.id.0 == id {
                    return Some(OrderableRef {
                        id: variant.id.0.clone(),
                        name: format!("{} ({})", item.name, variant.name),
                        unit_price: variant.price,
                    });
                }
            }
        }

        None
    }

    /// The demo pizza menu used by the terminal simulator and tests.
    pub fn builtin() -> Self {
        let items = vec![
            MenuItem {
                id: ItemId("pepperoni".to_string()),
                name: "Pepperoni Pizza".to_string(),
                price: None,
                description: "Classic pepperoni pizza with mozzarella".to_string(),
                tags: vec!["pizza".to_string(), "meat".to_string(), "pepperoni".to_string()],
                allergens: vec!["gluten".to_string(), "dairy".to_string()],
                vegetarian: false,
                spice_level: Some(SpiceLevel::Mild),
                variants: vec![
                    Variant {
                        id: VariantId("pepperoni_small".to_string()),
                        name: "Small".to_string(),
                        price: Decimal::new(1000, 2),
                    },
                    Variant {
                        id: VariantId("pepperoni_large".to_string()),
                        name: "Large".to_string(),
                        price: Decimal::new(1200, 2),
                    },
                ],
            },
            MenuItem {
                id: ItemId("cheese".to_string()),
                name: "Cheese Pizza".to_string(),
                price: None,
                description: "Stone-baked cheese pizza".to_string(),
                tags: vec!["pizza".to_string(), "cheese".to_string(), "vegetarian".to_string()],
                allergens: vec!["gluten".to_string(), "dairy".to_string()],
                vegetarian: true,
                spice_level: None,
                variants: vec![
                    Variant {
                        id: VariantId("cheese_small".to_string()),
                        name: "Small".to_string(),
                        price: Decimal::new(800, 2),
                    },
                    Variant {
                        id: VariantId("cheese_large".to_string()),
                        name: "Large".to_string(),
                        price: Decimal::new(1000, 2),
                    },
                ],
            },
            MenuItem {
                id: ItemId("coke".to_string()),
                name: "Coke".to_string(),
                price: Some(Decimal::new(200, 2)),
                description: "Chilled can of Coke".to_string(),
                tags: vec!["drink".to_string(), "soda".to_string()],
                allergens: Vec::new(),
                vegetarian: true,
                spice_level: None,
                variants: Vec::new(),
            },
        ];

        Self::new(items).expect("builtin menu is valid")
    }
}
