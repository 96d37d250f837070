//! Post validation and normalization.
//!
//! Raw creation/update input becomes a canonical payload here, or fails
//! with a [`DomainError::Validation`] before anything touches the store.
//! Coordinates are always re-hydrated from the Building Directory; a
//! client-supplied pin is never trusted.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::domain::{Location, NewPost, PostKind, building};
use crate::error::DomainError;

/// Raw creation input, as it arrives from the transport layer.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub building_code: String,
    /// Either an RFC 3339 timestamp or an "h:mm AM/PM" clock string
    /// interpreted against today's date.
    pub expires_at: String,
}

/// Raw partial-update input. Only fields present in the request are set;
/// an absent field keeps its prior value.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub building_code: Option<String>,
    pub expires_at: Option<String>,
    pub is_expired: Option<bool>,
}

/// A validated partial update ready to be applied to a loaded post.
/// `description` is tri-state: absent, cleared, or replaced.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Location>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: Option<bool>,
}

/// Validate and normalize creation input into a persistable payload.
///
/// `now` anchors both `created_at` and the resolution of clock-string
/// expirations; passing it in keeps the function deterministic for tests.
pub fn normalize_new_post<Tz: TimeZone>(
    reporter_id: i64,
    input: PostInput,
    now: DateTime<Tz>,
) -> Result<NewPost, DomainError> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(DomainError::Validation("Title must not be empty".into()));
    }

    let location = resolve_location(&input.building_code)?;
    let expires_at = parse_expires_at(&input.expires_at, &now)?;

    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(NewPost {
        kind: input.kind,
        title,
        description,
        location,
        reporter_id,
        created_at: now.with_timezone(&Utc),
        expires_at,
    })
}

/// Validate a partial update. Fields absent from the input stay absent in
/// the patch; a present-but-empty title is rejected rather than silently
/// reverted, and a present-but-empty description clears the field.
pub fn normalize_update<Tz: TimeZone>(
    update: PostUpdate,
    now: DateTime<Tz>,
) -> Result<PostPatch, DomainError> {
    let mut patch = PostPatch::default();

    if let Some(title) = update.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation("Title must not be empty".into()));
        }
        patch.title = Some(title);
    }

    if let Some(description) = update.description {
        let description = description.trim().to_string();
        patch.description = Some((!description.is_empty()).then_some(description));
    }

    if let Some(code) = update.building_code {
        patch.location = Some(resolve_location(&code)?);
    }

    if let Some(raw) = update.expires_at {
        patch.expires_at = Some(parse_expires_at(&raw, &now)?);
    }

    patch.is_expired = update.is_expired;

    Ok(patch)
}

fn resolve_location(code: &str) -> Result<Location, DomainError> {
    let building = building::resolve(code).ok_or_else(|| {
        DomainError::Validation(format!("Unknown building code: {code}"))
    })?;

    Ok(Location {
        building_code: building.code.to_string(),
        lat: building.lat,
        lng: building.lng,
    })
}

/// Resolve the expiration input to a UTC instant.
///
/// RFC 3339 timestamps pass through unchanged. Anything else must be an
/// "h:mm AM/PM" clock string, anchored to today's date in the server's
/// time zone. A resulting instant already in the past is accepted as-is;
/// callers own the sensibility of their expiration times.
pub fn parse_expires_at<Tz: TimeZone>(
    raw: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    // "%I:%M %p" handles the 12-hour wrap: 12 AM is hour 0, 12 PM stays 12,
    // other PM hours get +12.
    let time = NaiveTime::parse_from_str(&raw.to_uppercase(), "%I:%M %p").map_err(|_| {
        DomainError::Validation(format!(
            "Expiration must be RFC 3339 or \"h:mm AM/PM\", got: {raw}"
        ))
    })?;

    let local_naive = now.date_naive().and_time(time);
    let resolved = match local_naive.and_local_timezone(now.timezone()) {
        chrono::LocalResult::Single(dt) => dt,
        // DST fold or gap: take the earlier instant.
        chrono::LocalResult::Ambiguous(earlier, _) => earlier,
        chrono::LocalResult::None => {
            return Err(DomainError::Validation(format!(
                "Expiration time does not exist on today's date: {raw}"
            )));
        }
    };

    Ok(resolved.with_timezone(&Utc))
}
