//! Request payloads for the three booking endpoints and their validation
//! into a [`NewBooking`].
//!
//! Every field arrives optional so a missing value produces a readable
//! "Missing required field" error instead of a deserialization failure.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{BookingDetails, HotelRoomType, NewBooking, ReservationType};
use crate::BookingError;

/// Who is booking and when "today" is.
#[derive(Debug, Clone)]
pub struct BookingContext {
    pub user_id: Uuid,
    pub today: NaiveDate,
    pub currency: String,
}

/// Fields shared by every booking type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guests: Option<Value>,
    pub special_requests: Option<String>,
    pub product_id: Option<String>,
    pub total_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelBookingRequest {
    #[serde(flatten)]
    pub guest: GuestDetails,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub room_type: Option<String>,
    pub hotel_name: Option<String>,
    pub hotel_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantBookingRequest {
    #[serde(flatten)]
    pub guest: GuestDetails,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
    pub reservation_type: Option<String>,
    pub restaurant_name: Option<String>,
    pub restaurant_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionBookingRequest {
    #[serde(flatten)]
    pub guest: GuestDetails,
    pub attraction: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub attraction_name: Option<String>,
    pub attraction_location: Option<String>,
}

impl HotelBookingRequest {
    pub fn validate(self, ctx: &BookingContext) -> Result<NewBooking, BookingError> {
        let guest = self.guest.validate()?;

        let check_in = parse_date("checkIn", required("checkIn", self.check_in)?)?;
        let check_out = parse_date("checkOut", required("checkOut", self.check_out)?)?;
        let room_type: HotelRoomType = parse_enum("roomType", required("roomType", self.room_type)?)?;
        let hotel_name = required("hotelName", self.hotel_name)?;
        let hotel_location = required("hotelLocation", self.hotel_location)?;

        not_in_past("checkIn", check_in, ctx.today)?;
        if check_out <= check_in {
            return Err(BookingError::InvalidField {
                field: "checkOut",
                reason: "must be after the check-in date".to_string(),
            });
        }

        Ok(guest.into_new_booking(
            ctx,
            BookingDetails::Hotel {
                check_in,
                check_out,
                room_type,
                hotel_name,
                hotel_location,
            },
        ))
    }
}

impl RestaurantBookingRequest {
    pub fn validate(self, ctx: &BookingContext) -> Result<NewBooking, BookingError> {
        let guest = self.guest.validate()?;

        let reservation_date =
            parse_date("reservationDate", required("reservationDate", self.reservation_date)?)?;
        let reservation_time =
            parse_time("reservationTime", required("reservationTime", self.reservation_time)?)?;
        let reservation_type: ReservationType =
            parse_enum("reservationType", required("reservationType", self.reservation_type)?)?;
        let restaurant_name = required("restaurantName", self.restaurant_name)?;
        let restaurant_location = required("restaurantLocation", self.restaurant_location)?;

        not_in_past("reservationDate", reservation_date, ctx.today)?;

        Ok(guest.into_new_booking(
            ctx,
            BookingDetails::Restaurant {
                reservation_date,
                reservation_time,
                reservation_type,
                restaurant_name,
                restaurant_location,
            },
        ))
    }
}

impl AttractionBookingRequest {
    pub fn validate(self, ctx: &BookingContext) -> Result<NewBooking, BookingError> {
        let guest = self.guest.validate()?;

        // Either name field may be sent; each defaults to the other.
        let attraction = non_empty(self.attraction);
        let attraction_name = non_empty(self.attraction_name);
        let attraction = required("attraction", attraction.or_else(|| attraction_name.clone()))?;
        let attraction_name = attraction_name.unwrap_or_else(|| attraction.clone());

        let date = parse_date("date", required("date", self.date)?)?;
        let time = parse_time("time", required("time", self.time)?)?;
        let attraction_location = required("attractionLocation", self.attraction_location)?;

        not_in_past("date", date, ctx.today)?;

        Ok(guest.into_new_booking(
            ctx,
            BookingDetails::Attraction {
                attraction,
                date,
                time,
                attraction_name,
                attraction_location,
            },
        ))
    }
}

struct ValidGuest {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    guests: String,
    special_requests: Option<String>,
    product_id: Option<Uuid>,
    total_price: Option<f64>,
}

impl GuestDetails {
    fn validate(self) -> Result<ValidGuest, BookingError> {
        let first_name = required("firstName", self.first_name)?;
        let last_name = required("lastName", self.last_name)?;
        let email = required("email", self.email)?.to_lowercase();
        let phone = required("phone", self.phone)?;
        let guests = guests(self.guests)?;

        if !looks_like_email(&email) {
            return Err(BookingError::InvalidField {
                field: "email",
                reason: "must be a valid email address".to_string(),
            });
        }

        let product_id = match non_empty(self.product_id) {
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| BookingError::InvalidField {
                field: "productId",
                reason: "must be a valid id".to_string(),
            })?),
            None => None,
        };

        if let Some(price) = self.total_price {
            if !price.is_finite() || price < 0.0 {
                return Err(BookingError::InvalidField {
                    field: "totalPrice",
                    reason: "must be a non-negative number".to_string(),
                });
            }
        }

        Ok(ValidGuest {
            first_name,
            last_name,
            email,
            phone,
            guests,
            special_requests: non_empty(self.special_requests),
            product_id,
            total_price: self.total_price,
        })
    }
}

impl ValidGuest {
    fn into_new_booking(self, ctx: &BookingContext, details: BookingDetails) -> NewBooking {
        NewBooking {
            user_id: Some(ctx.user_id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            product_id: self.product_id,
            details,
            guests: self.guests,
            special_requests: self.special_requests,
            total_price: self.total_price,
            currency: ctx.currency.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(field: &'static str, value: Option<String>) -> Result<String, BookingError> {
    non_empty(value).ok_or(BookingError::MissingField(field))
}

/// The form sends guests as a string ("2"), API clients often send a number.
fn guests(value: Option<Value>) -> Result<String, BookingError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(count) if count >= 1 => Ok(count.to_string()),
            _ => Err(BookingError::InvalidField {
                field: "guests",
                reason: "must be at least 1".to_string(),
            }),
        },
        None | Some(Value::Null) | Some(Value::String(_)) => Err(BookingError::MissingField("guests")),
        Some(_) => Err(BookingError::InvalidField {
            field: "guests",
            reason: "must be a number or text".to_string(),
        }),
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(field: &'static str, raw: String) -> Result<NaiveDate, BookingError> {
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| BookingError::InvalidField {
            field,
            reason: format!("'{}' is not a valid date", raw),
        })
}

fn parse_time(field: &'static str, raw: String) -> Result<String, BookingError> {
    let valid = ["%H:%M", "%H:%M:%S", "%I:%M %p"]
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(&raw, fmt).is_ok());
    if !valid {
        return Err(BookingError::InvalidField {
            field,
            reason: format!("'{}' is not a valid time", raw),
        });
    }
    Ok(raw)
}

fn parse_enum<T: DeserializeOwned>(field: &'static str, raw: String) -> Result<T, BookingError> {
    serde_json::from_value(Value::String(raw.clone())).map_err(|_| BookingError::InvalidField {
        field,
        reason: format!("'{}' is not an accepted value", raw),
    })
}

fn not_in_past(field: &'static str, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
    if date < today {
        return Err(BookingError::InvalidField {
            field,
            reason: "cannot be in the past".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> BookingContext {
        BookingContext {
            user_id: Uuid::new_v4(),
            today: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            currency: "USD".to_string(),
        }
    }

    fn hotel(body: Value) -> Result<NewBooking, BookingError> {
        serde_json::from_value::<HotelBookingRequest>(body).unwrap().validate(&ctx())
    }

    fn hotel_body() -> Value {
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "  Grace@Example.COM ",
            "phone": "555-0199",
            "guests": "2",
            "checkIn": "2025-01-10",
            "checkOut": "2025-01-12",
            "roomType": "Suite",
            "hotelName": "Harbour View",
            "hotelLocation": "Sydney"
        })
    }

    #[test]
    fn test_valid_hotel_booking() {
        let booking = hotel(hotel_body()).unwrap();
        assert_eq!(booking.email, "grace@example.com");
        assert_eq!(booking.product_id, None);
        match booking.details {
            BookingDetails::Hotel { room_type, check_in, .. } => {
                assert_eq!(room_type, HotelRoomType::Suite);
                assert_eq!(check_in, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_checkout_before_checkin_is_rejected() {
        let mut body = hotel_body();
        body["checkOut"] = json!("2025-01-09");
        let err = hotel(body).unwrap_err();
        assert!(matches!(err, BookingError::InvalidField { field: "checkOut", .. }));
    }

    #[test]
    fn test_checkin_in_the_past_is_rejected() {
        let mut body = hotel_body();
        body["checkIn"] = json!("2024-12-31");
        let err = hotel(body).unwrap_err();
        assert!(matches!(err, BookingError::InvalidField { field: "checkIn", .. }));
    }

    #[test]
    fn test_missing_personal_field() {
        let mut body = hotel_body();
        body["phone"] = json!("   ");
        assert_eq!(hotel(body).unwrap_err(), BookingError::MissingField("phone"));
    }

    #[test]
    fn test_unknown_room_type() {
        let mut body = hotel_body();
        body["roomType"] = json!("Penthouse");
        assert!(matches!(hotel(body).unwrap_err(), BookingError::InvalidField { field: "roomType", .. }));
    }

    #[test]
    fn test_numeric_guests_and_product_id() {
        let product_id = Uuid::new_v4();
        let mut body = hotel_body();
        body["guests"] = json!(3);
        body["productId"] = json!(product_id.to_string());
        let booking = hotel(body).unwrap();
        assert_eq!(booking.guests, "3");
        assert_eq!(booking.product_id, Some(product_id));

        let mut body = hotel_body();
        body["productId"] = json!("not-a-uuid");
        assert!(matches!(hotel(body).unwrap_err(), BookingError::InvalidField { field: "productId", .. }));
    }

    #[test]
    fn test_restaurant_requires_reservation_fields() {
        let req: RestaurantBookingRequest = serde_json::from_value(json!({
            "firstName": "Alan",
            "lastName": "Turing",
            "email": "alan@example.com",
            "phone": "555-0142",
            "guests": "4",
            "reservationDate": "2025-02-01",
            "reservationTime": "19:30",
            "restaurantName": "Noma",
            "restaurantLocation": "Copenhagen"
        }))
        .unwrap();
        assert_eq!(req.validate(&ctx()).unwrap_err(), BookingError::MissingField("reservationType"));
    }

    #[test]
    fn test_attraction_name_fallback() {
        let req: AttractionBookingRequest = serde_json::from_value(json!({
            "firstName": "Katherine",
            "lastName": "Johnson",
            "email": "kj@example.com",
            "phone": "555-0111",
            "guests": "1",
            "attractionName": "Louvre",
            "date": "2025-03-03",
            "time": "10:00",
            "attractionLocation": "Paris"
        }))
        .unwrap();

        let booking = req.validate(&ctx()).unwrap();
        match booking.details {
            BookingDetails::Attraction { attraction, attraction_name, .. } => {
                assert_eq!(attraction, "Louvre");
                assert_eq!(attraction_name, "Louvre");
            }
            other => panic!("unexpected details {:?}", other),
        }
    }
}
