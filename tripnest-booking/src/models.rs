use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tripnest_shared::Masked;
use uuid::Uuid;

use crate::BookingError;

/// What is being reserved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Hotel,
    Restaurant,
    Attraction,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Hotel => "hotel",
            BookingType::Restaurant => "restaurant",
            BookingType::Attraction => "attraction",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingType::Hotel => "Hotel",
            BookingType::Restaurant => "Restaurant",
            BookingType::Attraction => "Attraction",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingType {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hotel" => Ok(BookingType::Hotel),
            "restaurant" => Ok(BookingType::Restaurant),
            "attraction" => Ok(BookingType::Attraction),
            other => Err(BookingError::InvalidField {
                field: "bookingType",
                reason: format!("unknown booking type '{}'", other),
            }),
        }
    }
}

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(BookingError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HotelRoomType {
    Standard,
    Deluxe,
    Suite,
    Executive,
    Presidential,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReservationType {
    Dinner,
    #[serde(rename = "VIP/Mezzanine")]
    VipMezzanine,
    #[serde(rename = "Birthday/Anniversary")]
    BirthdayAnniversary,
    Nightlife,
}

/// Fields that only exist for one booking type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "bookingType", rename_all = "lowercase")]
pub enum BookingDetails {
    #[serde(rename_all = "camelCase")]
    Hotel {
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: HotelRoomType,
        hotel_name: String,
        hotel_location: String,
    },
    #[serde(rename_all = "camelCase")]
    Restaurant {
        reservation_date: NaiveDate,
        reservation_time: String,
        reservation_type: ReservationType,
        restaurant_name: String,
        restaurant_location: String,
    },
    #[serde(rename_all = "camelCase")]
    Attraction {
        attraction: String,
        date: NaiveDate,
        time: String,
        attraction_name: String,
        attraction_location: String,
    },
}

impl BookingDetails {
    pub fn booking_type(&self) -> BookingType {
        match self {
            BookingDetails::Hotel { .. } => BookingType::Hotel,
            BookingDetails::Restaurant { .. } => BookingType::Restaurant,
            BookingDetails::Attraction { .. } => BookingType::Attraction,
        }
    }

    /// Name of the booked venue, for log lines.
    pub fn venue_name(&self) -> &str {
        match self {
            BookingDetails::Hotel { hotel_name, .. } => hotel_name,
            BookingDetails::Restaurant { restaurant_name, .. } => restaurant_name,
            BookingDetails::Attraction { attraction_name, .. } => attraction_name,
        }
    }
}

/// A persisted reservation of a hotel stay, restaurant table or attraction slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Masked<String>,
    pub product_id: Option<Uuid>,
    #[serde(flatten)]
    pub details: BookingDetails,
    pub guests: String,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub total_price: Option<f64>,
    pub currency: String,
    pub booking_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn booking_type(&self) -> BookingType {
        self.details.booking_type()
    }

    /// Move to `status`, stamping `updated_at`. Callers check the transition first.
    pub fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub product_id: Option<Uuid>,
    pub details: BookingDetails,
    pub guests: String,
    pub special_requests: Option<String>,
    pub total_price: Option<f64>,
    pub currency: String,
}

impl NewBooking {
    pub fn booking_type(&self) -> BookingType {
        self.details.booking_type()
    }

    pub fn into_booking(self) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            user_email: self.email.clone(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: Masked::new(self.phone),
            product_id: self.product_id,
            details: self.details,
            guests: self.guests,
            special_requests: self.special_requests,
            status: BookingStatus::Pending,
            total_price: self.total_price,
            currency: self.currency,
            booking_date: now,
            created_at: now,
            updated_at: now,
        }
    }
}
