use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Product categories in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Hotel,
    Restaurant,
    Attraction,
    Package,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Hotel => "hotel",
            ProductCategory::Restaurant => "restaurant",
            ProductCategory::Attraction => "attraction",
            ProductCategory::Package => "package",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hotel" => Ok(ProductCategory::Hotel),
            "restaurant" => Ok(ProductCategory::Restaurant),
            "attraction" => Ok(ProductCategory::Attraction),
            "package" => Ok(ProductCategory::Package),
            other => Err(ProductError::Validation(format!("Unknown product category: {}", other))),
        }
    }
}

/// A bookable catalog entry with a finite `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category: ProductCategory,
    pub image: String,
    pub location: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            quantity: input.quantity.unwrap_or(0),
            category: input.category,
            image: input.image,
            location: input.location,
            rating: input.rating.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: Option<i32>,
    pub category: ProductCategory,
    pub image: String,
    pub location: String,
    pub rating: Option<f64>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ProductError> {
        require_text("name", &self.name)?;
        require_text("description", &self.description)?;
        require_text("image", &self.image)?;
        require_text("location", &self.location)?;
        check_price(self.price)?;
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        Ok(())
    }
}

/// Partial update. Stock is not editable here; it only moves through the
/// reduce/add operations, which write the ledger.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<ProductCategory>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
}

impl ProductUpdate {
    /// Validate and apply onto `product`. Leaves `product` untouched on error.
    pub fn apply(&self, product: &mut Product) -> Result<(), ProductError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(image) = &self.image {
            require_text("image", image)?;
        }
        if let Some(location) = &self.location {
            require_text("location", location)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }

        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        if let Some(location) = &self.location {
            product.location = location.clone();
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        product.updated_at = Utc::now();
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ProductError> {
    if value.trim().is_empty() {
        return Err(ProductError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), ProductError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ProductError::Validation("price must be a non-negative number".to_string()));
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), ProductError> {
    if quantity < 0 {
        return Err(ProductError::Validation("quantity must not be negative".to_string()));
    }
    Ok(())
}

fn check_rating(rating: f64) -> Result<(), ProductError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ProductError::Validation("rating must be between 0 and 5".to_string()));
    }
    Ok(())
}

/// Product-related errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),
}
