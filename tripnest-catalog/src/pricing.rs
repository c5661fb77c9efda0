use crate::listing::RoomType;
use serde::Serialize;
use tripnest_shared::money::{percentage_of, round_cents, TAX_RATE};

/// Service fee charged on hotel stays on top of tax.
pub const SERVICE_FEE_RATE: f64 = 0.05;

/// Priced room option for a requested stay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuote {
    pub room_type: String,
    pub description: Option<String>,
    pub price: f64,
    pub available_rooms: i32,
    pub capacity: i32,
    pub total_price: f64,
    pub taxes: f64,
    pub fees: f64,
    pub final_price: f64,
}

impl RoomQuote {
    pub fn for_room(room: &RoomType, rooms: i32) -> Self {
        let total_price = round_cents(room.price * rooms as f64);
        let taxes = percentage_of(total_price, TAX_RATE);
        let fees = percentage_of(total_price, SERVICE_FEE_RATE);
        Self {
            room_type: room.name.clone(),
            description: room.description.clone(),
            price: room.price,
            available_rooms: room.available_rooms,
            capacity: room.capacity,
            total_price,
            taxes,
            fees,
            final_price: round_cents(total_price + taxes + fees),
        }
    }
}

/// Quote every room type that can hold `guests` across `rooms` rooms.
pub fn quote_rooms(room_types: &[RoomType], guests: i32, rooms: i32) -> Vec<RoomQuote> {
    room_types
        .iter()
        .filter(|r| r.fits(guests, rooms))
        .map(|r| RoomQuote::for_room(r, rooms))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_adds_tax_and_fees() {
        let rooms = vec![
            RoomType {
                name: "Suite".to_string(),
                description: Some("Sea view".to_string()),
                price: 250.0,
                capacity: 4,
                available_rooms: 3,
            },
            RoomType {
                name: "Standard".to_string(),
                description: None,
                price: 90.0,
                capacity: 2,
                available_rooms: 10,
            },
        ];

        let quotes = quote_rooms(&rooms, 3, 2);
        assert_eq!(quotes.len(), 1);

        let suite = &quotes[0];
        assert_eq!(suite.room_type, "Suite");
        assert_eq!(suite.total_price, 500.0);
        assert_eq!(suite.taxes, 75.0);
        assert_eq!(suite.fees, 25.0);
        assert_eq!(suite.final_price, 600.0);
    }
}
