//! Data Transfer Objects - request/response types for the API.
//!
//! Everything here is camelCase on the wire. Client-supplied coordinates
//! are deliberately absent from the inputs: the server always pins a post
//! to the directory's coordinates for the submitted building code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mealboard_core::domain::{self, PostKind, PostView, User};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub meal_plan: bool,
    #[serde(default = "default_true")]
    pub receives_notifications: bool,
}

fn default_true() -> bool {
    true
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public profile. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub meal_plan: bool,
    pub receives_notifications: bool,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            meal_plan: user.meal_plan,
            receives_notifications: user.receives_notifications,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Partial profile update; absent fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub meal_plan: Option<bool>,
    pub receives_notifications: Option<bool>,
}

/// Where a post is pinned, on the way in. Only the code matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub building_code: String,
}

/// Request to create a post. `expiresAt` is either RFC 3339 or an
/// "h:mm AM/PM" clock string resolved against today's date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub location: LocationInput,
    pub expires_at: String,
}

/// Partial post update; only fields present in the request change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationInput>,
    pub expires_at: Option<String>,
    pub is_expired: Option<bool>,
}

/// Optional list constraints, straight off the query string:
/// `?type=FreeFood&location=KSL&isExpired=false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(rename = "type")]
    pub kind: Option<PostKind>,
    /// Building code.
    pub location: Option<String>,
    pub is_expired: Option<bool>,
}

/// A post's pin, on the way out: directory coordinates plus display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub building_code: String,
    pub building_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Reporter identity joined into post responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A post as the API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: LocationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<ReporterResponse>,
    pub created_at: String,
    pub expires_at: String,
    pub is_expired: bool,
    /// Stored flag OR elapsed `expiresAt`, evaluated at render time.
    pub effectively_expired: bool,
    pub is_flagged: bool,
    pub flag_count: i32,
}

impl PostResponse {
    /// Render a reporter-joined post, deriving the effective expiry
    /// against `now`.
    pub fn from_view(view: PostView, now: DateTime<Utc>) -> Self {
        let post = view.post;
        Self {
            id: post.id,
            kind: post.kind,
            title: post.title.clone(),
            description: post.description.clone(),
            location: LocationResponse {
                building_name: domain::display_name(&post.location.building_code).to_string(),
                building_code: post.location.building_code.clone(),
                lat: post.location.lat,
                lng: post.location.lng,
            },
            reporter: view.reporter.map(|r| ReporterResponse {
                first_name: r.first_name,
                last_name: r.last_name,
                email: r.email,
            }),
            created_at: post.created_at.to_rfc3339(),
            expires_at: post.expires_at.to_rfc3339(),
            is_expired: post.is_expired,
            effectively_expired: post.effectively_expired(now),
            is_flagged: post.is_flagged,
            flag_count: post.flag_count,
        }
    }
}

/// Response to a flag operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub flag_count: i32,
}

/// A Building Directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingResponse {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mealboard_core::domain::{Location, Post, Reporter};

    #[test]
    fn create_request_uses_camel_case_wire_names() {
        let body = serde_json::json!({
            "type": "FreeFood",
            "title": "Pizza",
            "location": { "buildingCode": "KSL" },
            "expiresAt": "11:59 PM"
        });

        let req: CreatePostRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.kind, PostKind::FreeFood);
        assert_eq!(req.location.building_code, "KSL");
        assert_eq!(req.expires_at, "11:59 PM");
        assert!(req.description.is_none());
    }

    #[test]
    fn unknown_post_type_fails_deserialization() {
        let body = serde_json::json!({
            "type": "Barbecue",
            "title": "Pizza",
            "location": { "buildingCode": "KSL" },
            "expiresAt": "11:59 PM"
        });
        assert!(serde_json::from_value::<CreatePostRequest>(body).is_err());
    }

    #[test]
    fn post_response_derives_effective_expiry_and_display_name() {
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap();
        let view = PostView {
            post: Post {
                id: 4,
                kind: PostKind::MealSwipe,
                title: "Swipe".into(),
                description: None,
                location: Location {
                    building_code: "KSL".into(),
                    lat: 41.507354,
                    lng: -81.609313,
                },
                reporter_id: 1,
                created_at: created,
                expires_at: expires,
                is_expired: false,
                is_flagged: false,
                flag_count: 0,
            },
            reporter: Some(Reporter {
                first_name: "Casey".into(),
                last_name: "Western".into(),
                email: "casey@example.edu".into(),
            }),
        };

        let after = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let rendered = PostResponse::from_view(view, after);

        assert!(!rendered.is_expired);
        assert!(rendered.effectively_expired);
        assert_eq!(rendered.location.building_name, "Kelvin Smith Library");

        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(json["type"], "MealSwipe");
        assert_eq!(json["flagCount"], 0);
        assert_eq!(json["reporter"]["firstName"], "Casey");
        // Password material has no wire representation at all.
        assert!(json.get("passwordHash").is_none());
    }
}
