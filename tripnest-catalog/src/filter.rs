use crate::listing::Listing;

/// Requested stay used to narrow hotel results by room availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRequest {
    pub guests: i32,
    pub rooms: i32,
}

/// Browse filters for hotels, restaurants and attractions.
///
/// Every populated field must match; empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring of `location.city`.
    pub city: Option<String>,
    /// Case-insensitive substring of `location.country`.
    pub country: Option<String>,
    /// Membership filter against [`Listing::tags`]: matches when any tag is listed.
    pub tags: Vec<String>,
    /// Lower bound on `priceRange.min`.
    pub min_price: Option<f64>,
    /// Upper bound on `priceRange.max`.
    pub max_price: Option<f64>,
    /// Minimum `rating.average`.
    pub min_rating: Option<f64>,
    pub stay: Option<StayRequest>,
}

impl ListingFilter {
    /// Split a comma-separated query value into trimmed, non-empty entries.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(city) = &self.city {
            if !contains_ignore_case(&listing.location.city, city) {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if !contains_ignore_case(&listing.location.country, country) {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let tags = listing.tags();
            let hit = self
                .tags
                .iter()
                .any(|wanted| tags.iter().any(|t| t.eq_ignore_ascii_case(wanted)));
            if !hit {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price_range.min < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price_range.max > max {
                return false;
            }
        }
        if let Some(rating) = self.min_rating {
            if listing.rating.average < rating {
                return false;
            }
        }
        if let Some(stay) = self.stay {
            if !listing.room_types().iter().any(|r| r.fits(stay.guests, stay.rooms)) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn hotel(city: &str, min: f64, max: f64, rating: f64, rooms: Vec<RoomType>) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            name: format!("Hotel {}", city),
            description: "Stay".to_string(),
            location: Location {
                address: "1 Main St".to_string(),
                city: city.to_string(),
                country: "France".to_string(),
            },
            images: vec![],
            rating: Rating { average: rating, count: 10 },
            price_range: PriceRange { min, max, currency: "USD".to_string() },
            is_popular: false,
            created_at: Utc::now(),
            details: ListingDetails::Hotel {
                amenities: vec![Amenity { name: "Pool".to_string(), icon: None }],
                room_types: rooms,
            },
        }
    }

    fn room(capacity: i32, available: i32) -> RoomType {
        RoomType {
            name: "Standard".to_string(),
            description: None,
            price: 100.0,
            capacity,
            available_rooms: available,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ListingFilter::default();
        assert!(filter.matches(&hotel("Paris", 100.0, 300.0, 4.0, vec![])));
    }

    #[test]
    fn test_location_is_case_insensitive_substring() {
        let filter = ListingFilter {
            city: Some("PAR".to_string()),
            country: Some("fran".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&hotel("Paris", 100.0, 300.0, 4.0, vec![])));
        assert!(!filter.matches(&hotel("Lyon", 100.0, 300.0, 4.0, vec![])));
    }

    #[test]
    fn test_price_and_rating_bounds() {
        let listing = hotel("Nice", 80.0, 250.0, 3.9, vec![]);

        let filter = ListingFilter { min_price: Some(80.0), max_price: Some(250.0), ..Default::default() };
        assert!(filter.matches(&listing));

        let filter = ListingFilter { min_price: Some(90.0), ..Default::default() };
        assert!(!filter.matches(&listing));

        let filter = ListingFilter { max_price: Some(200.0), ..Default::default() };
        assert!(!filter.matches(&listing));

        let filter = ListingFilter { min_rating: Some(4.0), ..Default::default() };
        assert!(!filter.matches(&listing));
    }

    #[test]
    fn test_tags_membership() {
        let filter = ListingFilter { tags: ListingFilter::parse_tags(" spa , pool,"), ..Default::default() };
        assert_eq!(filter.tags, vec!["spa", "pool"]);
        assert!(filter.matches(&hotel("Nice", 80.0, 250.0, 3.9, vec![])));

        let filter = ListingFilter { tags: vec!["Gym".to_string()], ..Default::default() };
        assert!(!filter.matches(&hotel("Nice", 80.0, 250.0, 3.9, vec![])));
    }

    #[test]
    fn test_stay_requires_a_fitting_room() {
        let listing = hotel("Nice", 80.0, 250.0, 3.9, vec![room(2, 5), room(4, 1)]);

        let filter = ListingFilter { stay: Some(StayRequest { guests: 4, rooms: 1 }), ..Default::default() };
        assert!(filter.matches(&listing));

        let filter = ListingFilter { stay: Some(StayRequest { guests: 4, rooms: 2 }), ..Default::default() };
        assert!(!filter.matches(&listing));
    }
}
