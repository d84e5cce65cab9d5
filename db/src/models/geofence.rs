use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Length of the shareable join code handed to students.
pub const FENCE_CODE_LEN: usize = 6;

/// How many fresh codes to roll when an insert collides on the unique
/// `fence_code` key before giving up.
const CODE_RETRY_LIMIT: usize = 5;

/// A named, time-bounded circular region gating attendance for one class
/// session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "geofences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short alphanumeric join code, unique across all fences.
    pub fence_code: String,
    /// Class/session label. Unique per UTC start date, not globally.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in metres. Must be positive; the HTTP layer validates this
    /// before anything reaches the model.
    pub radius: f64,
    /// Only "circle" is supported.
    pub fence_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: GeofenceStatus,
    pub time_created: DateTime<Utc>,
    pub creator_matric: String,
}

/// Stored lifecycle state. `Inactive` is terminal: a manually deactivated
/// fence never reopens. The window-derived state is computed on top of
/// this by [`Model::effective_status`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GeofenceStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorMatric",
        to = "super::user::Column::UserMatric"
    )]
    Creator,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Error)]
pub enum CreateGeofenceError {
    #[error("Invalid duration for geofence: start time must be before end time")]
    InvalidDuration,
    #[error("End time cannot be in the past")]
    EndedInPast,
    #[error("Geofence with this name already exists for this date")]
    DuplicateSession,
    #[error("Unsupported fence type: {0}")]
    UnsupportedFenceType(String),
    #[error("Could not allocate a unique fence code")]
    CodeCollision,
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum DeactivateGeofenceError {
    #[error("Geofence doesn't exist or not found for specified date")]
    NotFound,
    #[error("Geofence is already inactive")]
    AlreadyInactive,
    #[error("Only the creator of a geofence may deactivate it")]
    Forbidden,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    /// Creates a geofence for one class session.
    ///
    /// Validation order follows the admin-facing error messages: duration,
    /// past end time, then the one-session-per-name-per-day rule. The join
    /// code is random; if the insert trips the unique `fence_code` key the
    /// code is rolled again a bounded number of times before reporting
    /// [`CreateGeofenceError::CodeCollision`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DbConn,
        creator_matric: &str,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius: f64,
        fence_type: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Model, CreateGeofenceError> {
        if !fence_type.eq_ignore_ascii_case("circle") {
            return Err(CreateGeofenceError::UnsupportedFenceType(
                fence_type.to_owned(),
            ));
        }
        if start_time >= end_time {
            return Err(CreateGeofenceError::InvalidDuration);
        }
        if end_time < now {
            return Err(CreateGeofenceError::EndedInPast);
        }
        if Self::find_on_day(db, name, start_time.date_naive())
            .await?
            .is_some()
        {
            return Err(CreateGeofenceError::DuplicateSession);
        }

        let status = if start_time <= now && now < end_time {
            GeofenceStatus::Active
        } else {
            GeofenceStatus::Scheduled
        };

        for _ in 0..CODE_RETRY_LIMIT {
            let fence = ActiveModel {
                fence_code: Set(generate_fence_code()),
                name: Set(name.to_owned()),
                latitude: Set(latitude),
                longitude: Set(longitude),
                radius: Set(radius),
                fence_type: Set(fence_type.to_lowercase()),
                start_time: Set(start_time),
                end_time: Set(end_time),
                status: Set(status),
                time_created: Set(now),
                creator_matric: Set(creator_matric.to_owned()),
                ..Default::default()
            };

            match fence.insert(db).await {
                Ok(created) => return Ok(created),
                Err(e) if crate::is_unique_violation(&e) => {
                    // Code collided with an existing fence; roll a new one.
                    tracing::warn!(name, "fence code collision, regenerating");
                    continue;
                }
                Err(e) => return Err(CreateGeofenceError::Db(e)),
            }
        }

        Err(CreateGeofenceError::CodeCollision)
    }

    /// Manually closes a fence. Only the creator may do this, and
    /// `Inactive` is terminal.
    pub async fn deactivate(
        db: &DbConn,
        caller_matric: &str,
        name: &str,
        date: NaiveDate,
    ) -> Result<Model, DeactivateGeofenceError> {
        let Some(fence) = Self::find_on_day(db, name, date).await? else {
            return Err(DeactivateGeofenceError::NotFound);
        };

        if fence.status == GeofenceStatus::Inactive {
            return Err(DeactivateGeofenceError::AlreadyInactive);
        }
        if fence.creator_matric != caller_matric {
            return Err(DeactivateGeofenceError::Forbidden);
        }

        let mut am: ActiveModel = fence.into();
        am.status = Set(GeofenceStatus::Inactive);
        Ok(am.update(db).await?)
    }

    pub async fn find_by_code(db: &DbConn, fence_code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::FenceCode.eq(fence_code))
            .one(db)
            .await
    }

    /// Finds the session with the given name whose `start_time` falls on
    /// the given UTC calendar date. The creation-time uniqueness rule
    /// guarantees at most one match.
    pub async fn find_on_day(
        db: &DbConn,
        name: &str,
        date: NaiveDate,
    ) -> Result<Option<Model>, DbErr> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        Entity::find()
            .filter(Column::Name.eq(name))
            .filter(Column::StartTime.gte(day_start))
            .filter(Column::StartTime.lt(day_end))
            .one(db)
            .await
    }

    pub async fn list(db: &DbConn, name: Option<&str>) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find();
        if let Some(name) = name {
            query = query.filter(Column::Name.eq(name));
        }
        query.order_by_desc(Column::StartTime).all(db).await
    }

    pub async fn list_created_by(
        db: &DbConn,
        creator_matric: &str,
        name: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find().filter(Column::CreatorMatric.eq(creator_matric));
        if let Some(name) = name {
            query = query.filter(Column::Name.eq(name));
        }
        query.order_by_desc(Column::StartTime).all(db).await
    }

    /// The lifecycle state at `now`: a stored `Inactive` is final, anything
    /// else is derived from the session window, so a `Scheduled` fence
    /// becomes active the moment its window opens without any writeback,
    /// and lapses once the window closes.
    pub fn effective_status(&self, now: DateTime<Utc>) -> GeofenceStatus {
        if self.status == GeofenceStatus::Inactive {
            return GeofenceStatus::Inactive;
        }
        if now < self.start_time {
            GeofenceStatus::Scheduled
        } else if now < self.end_time {
            GeofenceStatus::Active
        } else {
            GeofenceStatus::Inactive
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == GeofenceStatus::Active
    }
}

fn generate_fence_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FENCE_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use crate::models::user::{Model as UserModel, Role};

    async fn seed_admin(db: &DbConn) -> UserModel {
        UserModel::create(db, "ADM/01/0001", "lecturer", "lect@test.com", "password", Role::Admin)
            .await
            .unwrap()
    }

    fn window(now: DateTime<Utc>, start_in_mins: i64, len_mins: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = now + Duration::minutes(start_in_mins);
        (start, start + Duration::minutes(len_mins))
    }

    #[tokio::test]
    async fn create_open_session_is_active_with_fresh_code() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();
        let (start, end) = window(now, -10, 60);

        let fence = Model::create(
            &db,
            &admin.user_matric,
            "GEO101",
            6.5244,
            3.3792,
            100.0,
            "circle",
            start,
            end,
            now,
        )
        .await
        .unwrap();

        assert_eq!(fence.status, GeofenceStatus::Active);
        assert_eq!(fence.fence_code.len(), FENCE_CODE_LEN);
        assert!(fence.fence_code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(fence.creator_matric, admin.user_matric);
    }

    #[tokio::test]
    async fn create_future_session_is_scheduled() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();
        let (start, end) = window(now, 30, 60);

        let fence = Model::create(
            &db, &admin.user_matric, "GEO102", 6.5, 3.3, 50.0, "circle", start, end, now,
        )
        .await
        .unwrap();

        assert_eq!(fence.status, GeofenceStatus::Scheduled);
        assert_eq!(fence.effective_status(now), GeofenceStatus::Scheduled);
        assert_eq!(
            fence.effective_status(now + Duration::minutes(45)),
            GeofenceStatus::Active
        );
        assert_eq!(
            fence.effective_status(now + Duration::minutes(120)),
            GeofenceStatus::Inactive
        );
    }

    #[tokio::test]
    async fn create_rejects_inverted_window_without_persisting() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();

        let err = Model::create(
            &db,
            &admin.user_matric,
            "GEO103",
            6.5,
            3.3,
            50.0,
            "circle",
            now + Duration::hours(2),
            now + Duration::hours(1),
            now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreateGeofenceError::InvalidDuration));
        assert!(Model::list(&db, Some("GEO103")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_session_that_already_ended() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();

        let err = Model::create(
            &db,
            &admin.user_matric,
            "GEO104",
            6.5,
            3.3,
            50.0,
            "circle",
            now - Duration::hours(3),
            now - Duration::hours(1),
            now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreateGeofenceError::EndedInPast));
        assert!(Model::list(&db, Some("GEO104")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_second_session_same_name_same_day() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();
        let (start, end) = window(now, -5, 60);

        Model::create(
            &db, &admin.user_matric, "GEO105", 6.5, 3.3, 50.0, "circle", start, end, now,
        )
        .await
        .unwrap();

        let err = Model::create(
            &db,
            &admin.user_matric,
            "GEO105",
            6.5,
            3.3,
            75.0,
            "circle",
            start + Duration::minutes(1),
            end + Duration::minutes(1),
            now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreateGeofenceError::DuplicateSession));
    }

    #[tokio::test]
    async fn create_rejects_unknown_fence_type() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let now = Utc::now();
        let (start, end) = window(now, -5, 60);

        let err = Model::create(
            &db, &admin.user_matric, "GEO106", 6.5, 3.3, 50.0, "polygon", start, end, now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreateGeofenceError::UnsupportedFenceType(t) if t == "polygon"));
    }

    #[tokio::test]
    async fn deactivate_is_creator_only_and_terminal() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let other = UserModel::create(
            &db,
            "ADM/01/0002",
            "other",
            "other@test.com",
            "password",
            Role::Admin,
        )
        .await
        .unwrap();

        let now = Utc::now();
        let (start, end) = window(now, -5, 60);
        let fence = Model::create(
            &db, &admin.user_matric, "GEO107", 6.5, 3.3, 50.0, "circle", start, end, now,
        )
        .await
        .unwrap();
        let date = fence.start_time.date_naive();

        let err = Model::deactivate(&db, &other.user_matric, "GEO107", date)
            .await
            .unwrap_err();
        assert!(matches!(err, DeactivateGeofenceError::Forbidden));

        let closed = Model::deactivate(&db, &admin.user_matric, "GEO107", date)
            .await
            .unwrap();
        assert_eq!(closed.status, GeofenceStatus::Inactive);
        // inactive even if the window is still open
        assert_eq!(closed.effective_status(now), GeofenceStatus::Inactive);

        let err = Model::deactivate(&db, &admin.user_matric, "GEO107", date)
            .await
            .unwrap_err();
        assert!(matches!(err, DeactivateGeofenceError::AlreadyInactive));
    }

    #[tokio::test]
    async fn deactivate_unknown_session_reports_not_found() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;

        let err = Model::deactivate(&db, &admin.user_matric, "NOPE", Utc::now().date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, DeactivateGeofenceError::NotFound));
    }
}
