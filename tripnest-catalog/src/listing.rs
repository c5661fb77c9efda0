use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which catalog collection a listing belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Hotel,
    Restaurant,
    Attraction,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Hotel => "hotel",
            ListingKind::Restaurant => "restaurant",
            ListingKind::Attraction => "attraction",
        }
    }

    /// Capitalized label used in "not found" messages.
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::Hotel => "Hotel",
            ListingKind::Restaurant => "Restaurant",
            ListingKind::Attraction => "Attraction",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub average: f64,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub capacity: i32,
    pub available_rooms: i32,
}

impl RoomType {
    pub fn fits(&self, guests: i32, rooms: i32) -> bool {
        self.available_rooms >= rooms && self.capacity >= guests
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationOption {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub max_guests: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttractionCategory {
    #[serde(rename = "Theme Park")]
    ThemePark,
    Museum,
    #[serde(rename = "Historical Site")]
    HistoricalSite,
    #[serde(rename = "Natural Wonder")]
    NaturalWonder,
    Adventure,
    Cultural,
    Entertainment,
}

impl AttractionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AttractionCategory::ThemePark => "Theme Park",
            AttractionCategory::Museum => "Museum",
            AttractionCategory::HistoricalSite => "Historical Site",
            AttractionCategory::NaturalWonder => "Natural Wonder",
            AttractionCategory::Adventure => "Adventure",
            AttractionCategory::Cultural => "Cultural",
            AttractionCategory::Entertainment => "Entertainment",
        }
    }
}

/// Kind-specific data carried by a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListingDetails {
    #[serde(rename_all = "camelCase")]
    Hotel {
        #[serde(default)]
        amenities: Vec<Amenity>,
        #[serde(default)]
        room_types: Vec<RoomType>,
    },
    #[serde(rename_all = "camelCase")]
    Restaurant {
        cuisine: Vec<String>,
        #[serde(default)]
        amenities: Vec<Amenity>,
        #[serde(default)]
        reservation_types: Vec<ReservationOption>,
    },
    #[serde(rename_all = "camelCase")]
    Attraction {
        category: AttractionCategory,
        #[serde(default)]
        activities: Vec<Activity>,
        #[serde(default)]
        amenities: Vec<Amenity>,
    },
}

/// A hotel, restaurant or attraction shown in the browse pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[serde(default)]
    pub rating: Rating,
    pub price_range: PriceRange,
    #[serde(default)]
    pub is_popular: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl Listing {
    pub fn kind(&self) -> ListingKind {
        match self.details {
            ListingDetails::Hotel { .. } => ListingKind::Hotel,
            ListingDetails::Restaurant { .. } => ListingKind::Restaurant,
            ListingDetails::Attraction { .. } => ListingKind::Attraction,
        }
    }

    /// Values matched by the kind's membership filter: amenity names for
    /// hotels, cuisines for restaurants, the category for attractions.
    pub fn tags(&self) -> Vec<&str> {
        match &self.details {
            ListingDetails::Hotel { amenities, .. } => {
                amenities.iter().map(|a| a.name.as_str()).collect()
            }
            ListingDetails::Restaurant { cuisine, .. } => cuisine.iter().map(String::as_str).collect(),
            ListingDetails::Attraction { category, .. } => vec![category.label()],
        }
    }

    pub fn room_types(&self) -> &[RoomType] {
        match &self.details {
            ListingDetails::Hotel { room_types, .. } => room_types,
            _ => &[],
        }
    }
}
