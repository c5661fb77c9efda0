use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use tripnest_catalog::{Listing, ListingKind, NewProduct, Product, ProductCategory};
use tripnest_core::{CoreError, CoreResult};

use crate::Repositories;

// (name, description, price, quantity, category, image, location, rating)
const DEMO_PRODUCTS: &[(&str, &str, f64, i32, ProductCategory, &str, &str, f64)] = &[
    ("Nest Resort & Spa", "Luxury resort with stunning ocean views and world-class amenities.", 299.0, 50, ProductCategory::Hotel, "/images/nest-resort.jpeg", "Bali, Indonesia", 4.9),
    ("Mountain View Lodge", "Cozy mountain retreat with breathtaking alpine views.", 189.0, 30, ProductCategory::Hotel, "/images/mountain-view.jpeg", "Swiss Alps", 4.7),
    ("Desert Oasis Hotel", "Unique desert experience with traditional Moroccan hospitality.", 159.0, 25, ProductCategory::Hotel, "/images/sahara.jpeg", "Sahara Desert, Morocco", 4.6),
    ("Sahara Spice Restaurant", "Authentic Moroccan cuisine with traditional flavors and warm hospitality.", 45.0, 100, ProductCategory::Restaurant, "/images/sahara-spice.jpeg", "Marrakech, Morocco", 4.8),
    ("Nest Fine Dining", "Elegant dining experience with international cuisine and ocean views.", 75.0, 80, ProductCategory::Restaurant, "/images/nest-fine-dining.jpeg", "Bali, Indonesia", 4.9),
    ("Mountain Bistro", "Cozy alpine bistro serving traditional Swiss dishes and local wines.", 55.0, 60, ProductCategory::Restaurant, "/images/mountain-bistro.jpeg", "Swiss Alps, Switzerland", 4.6),
    ("Bali Temple Tour", "Discover the spiritual heart of Bali with visits to ancient temples.", 85.0, 40, ProductCategory::Attraction, "/images/bali-temple-tour.jpeg", "Bali, Indonesia", 4.7),
    ("Swiss Alps Hiking", "Explore the breathtaking Swiss Alps with guided hiking tours.", 150.0, 25, ProductCategory::Attraction, "/images/swiss-alps-hiking.jpeg", "Swiss Alps, Switzerland", 4.6),
    ("Paris Art History Tour", "Discover the artistic heritage of Paris with visits to world-famous museums.", 95.0, 45, ProductCategory::Attraction, "/images/paris-art-history.jpeg", "Paris, France", 4.9),
];

pub fn demo_products() -> Vec<Product> {
    DEMO_PRODUCTS
        .iter()
        .map(|&(name, description, price, quantity, category, image, location, rating)| {
            Product::new(NewProduct {
                name: name.to_string(),
                description: description.to_string(),
                price,
                quantity: Some(quantity),
                category,
                image: image.to_string(),
                location: location.to_string(),
                rating: Some(rating),
            })
        })
        .collect()
}

fn listing(kind: ListingKind, mut doc: Value) -> CoreResult<Listing> {
    doc["id"] = json!(Uuid::new_v4());
    doc["createdAt"] = json!(Utc::now());
    doc["kind"] = json!(kind.as_str());
    serde_json::from_value(doc).map_err(|e| CoreError::Storage(format!("invalid demo listing: {}", e)))
}

pub fn demo_listings() -> CoreResult<Vec<Listing>> {
    Ok(vec![
        listing(ListingKind::Hotel, json!({
            "name": "Nest Resort & Spa",
            "description": "Luxury resort with ocean views, infinity pools, spa services and fine dining.",
            "location": { "address": "Jl. Raya Uluwatu No. 1", "city": "Bali", "country": "Indonesia" },
            "images": [{ "url": "/images/nest-resort.jpeg", "alt": "Nest Resort & Spa" }],
            "rating": { "average": 4.9, "count": 156 },
            "priceRange": { "min": 299.0, "max": 599.0, "currency": "USD" },
            "isPopular": true,
            "amenities": [
                { "name": "Infinity Pool", "icon": "pool" },
                { "name": "Spa Services", "icon": "spa" },
                { "name": "Free WiFi", "icon": "wifi" },
                { "name": "Beach Access", "icon": "beach" }
            ],
            "roomTypes": [
                { "name": "Deluxe Ocean View", "description": "Spacious room with ocean views", "price": 299.0, "capacity": 2, "availableRooms": 15 },
                { "name": "Villa with Private Pool", "description": "Villa with its own infinity pool", "price": 599.0, "capacity": 4, "availableRooms": 5 }
            ]
        }))?,
        listing(ListingKind::Hotel, json!({
            "name": "Mountain View Lodge",
            "description": "Cozy mountain retreat with breathtaking alpine views.",
            "location": { "address": "Bahnhofstrasse 12", "city": "Zermatt", "country": "Switzerland" },
            "images": [{ "url": "/images/mountain-view.jpeg", "alt": "Mountain View Lodge" }],
            "rating": { "average": 4.7, "count": 89 },
            "priceRange": { "min": 189.0, "max": 249.0, "currency": "USD" },
            "isPopular": true,
            "amenities": [
                { "name": "Mountain Views", "icon": "mountain" },
                { "name": "Ski Storage", "icon": "ski" },
                { "name": "Free WiFi", "icon": "wifi" }
            ],
            "roomTypes": [
                { "name": "Alpine Suite", "description": "Suite with a fireplace", "price": 249.0, "capacity": 2, "availableRooms": 8 },
                { "name": "Family Room", "description": "Two bedrooms for families", "price": 189.0, "capacity": 4, "availableRooms": 6 }
            ]
        }))?,
        listing(ListingKind::Hotel, json!({
            "name": "Desert Oasis Hotel",
            "description": "Traditional riad with Moroccan hospitality at the edge of the desert.",
            "location": { "address": "Derb Sidi Bouloukat 24", "city": "Marrakech", "country": "Morocco" },
            "images": [{ "url": "/images/sahara.jpeg", "alt": "Desert Oasis Hotel" }],
            "rating": { "average": 4.6, "count": 124 },
            "priceRange": { "min": 159.0, "max": 259.0, "currency": "USD" },
            "isPopular": false,
            "amenities": [
                { "name": "Desert Tours", "icon": "camel" },
                { "name": "Traditional Spa", "icon": "spa" },
                { "name": "Free WiFi", "icon": "wifi" }
            ],
            "roomTypes": [
                { "name": "Desert View Room", "price": 159.0, "capacity": 2, "availableRooms": 10 },
                { "name": "Riad Suite", "price": 259.0, "capacity": 3, "availableRooms": 4 }
            ]
        }))?,
        listing(ListingKind::Restaurant, json!({
            "name": "Sahara Spice Restaurant",
            "description": "Authentic Moroccan cuisine in a beautiful desert setting.",
            "location": { "address": "Place Jemaa el-Fna", "city": "Marrakech", "country": "Morocco" },
            "images": [{ "url": "/images/sahara-spice.jpeg", "alt": "Sahara Spice" }],
            "rating": { "average": 4.8, "count": 203 },
            "priceRange": { "min": 25.0, "max": 65.0, "currency": "USD" },
            "isPopular": true,
            "cuisine": ["Moroccan", "Mediterranean", "Traditional"],
            "amenities": [
                { "name": "Outdoor Seating", "icon": "outdoor" },
                { "name": "Live Music", "icon": "music" }
            ],
            "reservationTypes": [
                { "name": "Standard Table", "price": 0.0, "maxGuests": 6 },
                { "name": "Private Dining", "description": "Private room", "price": 50.0, "maxGuests": 12 }
            ]
        }))?,
        listing(ListingKind::Restaurant, json!({
            "name": "Nest Fine Dining",
            "description": "International cuisine with ocean views in a luxurious setting.",
            "location": { "address": "Jl. Raya Uluwatu No. 1", "city": "Bali", "country": "Indonesia" },
            "images": [{ "url": "/images/nest-fine-dining.jpeg", "alt": "Nest Fine Dining" }],
            "rating": { "average": 4.9, "count": 167 },
            "priceRange": { "min": 45.0, "max": 120.0, "currency": "USD" },
            "isPopular": true,
            "cuisine": ["International", "Asian Fusion", "Seafood"],
            "amenities": [
                { "name": "Ocean Views", "icon": "ocean" },
                { "name": "Wine Pairing", "icon": "wine" }
            ],
            "reservationTypes": [
                { "name": "Standard Reservation", "price": 0.0, "maxGuests": 8 },
                { "name": "Chef's Table Experience", "price": 150.0, "maxGuests": 6 }
            ]
        }))?,
        listing(ListingKind::Restaurant, json!({
            "name": "Mountain Bistro",
            "description": "Alpine bistro serving traditional Swiss dishes and local wines.",
            "location": { "address": "Hofmattstrasse 4", "city": "Zermatt", "country": "Switzerland" },
            "images": [{ "url": "/images/mountain-bistro.jpeg", "alt": "Mountain Bistro" }],
            "rating": { "average": 4.6, "count": 98 },
            "priceRange": { "min": 35.0, "max": 75.0, "currency": "USD" },
            "isPopular": false,
            "cuisine": ["Swiss", "Alpine", "European"],
            "amenities": [{ "name": "Fireplace", "icon": "fireplace" }],
            "reservationTypes": [{ "name": "Standard Table", "price": 0.0, "maxGuests": 6 }]
        }))?,
        listing(ListingKind::Attraction, json!({
            "name": "Bali Temple Tour",
            "description": "Discover the spiritual heart of Bali with visits to ancient temples.",
            "location": { "address": "Tanah Lot", "city": "Bali", "country": "Indonesia" },
            "images": [{ "url": "/images/bali-temple-tour.jpeg", "alt": "Bali Temple Tour" }],
            "rating": { "average": 4.7, "count": 234 },
            "priceRange": { "min": 65.0, "max": 105.0, "currency": "USD" },
            "isPopular": true,
            "category": "Cultural",
            "activities": [
                { "name": "Tanah Lot Temple Visit", "duration": "2 hours", "difficulty": "Easy" },
                { "name": "Uluwatu Temple Sunset", "duration": "3 hours", "difficulty": "Easy" }
            ],
            "amenities": [{ "name": "Guided Tours", "icon": "guide" }]
        }))?,
        listing(ListingKind::Attraction, json!({
            "name": "Swiss Alps Hiking",
            "description": "Guided hiking tours through the Swiss Alps.",
            "location": { "address": "Gornergrat", "city": "Zermatt", "country": "Switzerland" },
            "images": [{ "url": "/images/swiss-alps-hiking.jpeg", "alt": "Swiss Alps Hiking" }],
            "rating": { "average": 4.6, "count": 145 },
            "priceRange": { "min": 120.0, "max": 180.0, "currency": "USD" },
            "isPopular": true,
            "category": "Adventure",
            "activities": [
                { "name": "Matterhorn Glacier Trail", "duration": "6 hours", "difficulty": "Hard" }
            ],
            "amenities": [{ "name": "Equipment Rental", "icon": "gear" }]
        }))?,
        listing(ListingKind::Attraction, json!({
            "name": "Louvre Museum",
            "description": "The world's largest art museum.",
            "location": { "address": "Rue de Rivoli", "city": "Paris", "country": "France" },
            "images": [{ "url": "/images/paris-art-history.jpeg", "alt": "Louvre Museum" }],
            "rating": { "average": 4.9, "count": 512 },
            "priceRange": { "min": 20.0, "max": 95.0, "currency": "USD" },
            "isPopular": false,
            "category": "Museum",
            "activities": [
                { "name": "Highlights Tour", "duration": "2 hours", "difficulty": "Easy" }
            ],
            "amenities": [{ "name": "Audio Guide", "icon": "audio" }]
        }))?,
    ])
}

/// Load the demo catalog into an empty store. A store that already has
/// products is left alone.
pub async fn seed_demo_data(repos: &Repositories) -> CoreResult<()> {
    if !repos.products.list_products(None).await?.is_empty() {
        info!("Catalog already populated, skipping demo data");
        return Ok(());
    }

    let products = demo_products();
    for product in &products {
        repos.products.create_product(product).await?;
    }

    let listings = demo_listings()?;
    for listing in &listings {
        repos.listings.save_listing(listing).await?;
    }

    info!("Seeded {} products and {} listings", products.len(), listings.len());
    Ok(())
}
