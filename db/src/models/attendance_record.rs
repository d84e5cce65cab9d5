use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use thiserror::Error;

use crate::admission::{self, Admission};
use crate::models::geofence::{self, GeofenceStatus};
use crate::models::user;

/// One student's attendance for one session. Immutable once written; the
/// ledger never updates or deletes rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_matric: String,
    pub fence_code: String,
    /// Denormalised session label for reporting.
    pub geofence_name: String,
    pub timestamp: DateTime<Utc>,
    /// Derived idempotency key `user_matric + fence_code`, unique at the
    /// storage layer. The insert itself is the duplicate check.
    pub matric_fence_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserMatric",
        to = "super::user::Column::UserMatric"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::geofence::Entity",
        from = "Column::FenceCode",
        to = "super::geofence::Column::FenceCode"
    )]
    Geofence,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::geofence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Geofence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Error)]
pub enum RecordAttendanceError {
    #[error("User not found")]
    UserNotFound,
    #[error("Geofence code not found or is not active")]
    FenceNotFoundOrInactive,
    #[error("User is not within geofence ({distance_m:.1}m away, radius {radius_m:.1}m)")]
    OutsideGeofence { distance_m: f64, radius_m: f64 },
    #[error("Geofence is not open for attendance")]
    FenceClosed,
    #[error("Attendance already recorded for this class")]
    AlreadyRecorded,
    #[error("Only circular geofences are supported")]
    UnsupportedFenceType,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    /// Records attendance for `user_matric` against the fence identified by
    /// `fence_code`, at most once per (student, fence) pair.
    ///
    /// Lookup misses, spatial/temporal rejections and the idempotency
    /// conflict each map to their own error kind. The duplicate check is
    /// not a separate read: the insert carries the unique
    /// `matric_fence_code` key, so two concurrent submissions resolve to
    /// one row and one [`RecordAttendanceError::AlreadyRecorded`].
    pub async fn record(
        db: &DbConn,
        user_matric: &str,
        fence_code: &str,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Result<Model, RecordAttendanceError> {
        let user = user::Model::find_by_matric(db, user_matric)
            .await?
            .ok_or(RecordAttendanceError::UserNotFound)?;

        let fence = geofence::Model::find_by_code(db, fence_code)
            .await?
            .ok_or(RecordAttendanceError::FenceNotFoundOrInactive)?;
        if fence.status == GeofenceStatus::Inactive {
            return Err(RecordAttendanceError::FenceNotFoundOrInactive);
        }

        match admission::evaluate(&fence, latitude, longitude, now) {
            Admission::Inside => {}
            Admission::Outside { distance_m } => {
                return Err(RecordAttendanceError::OutsideGeofence {
                    distance_m,
                    radius_m: fence.radius,
                });
            }
            Admission::NotOpen => return Err(RecordAttendanceError::FenceClosed),
            Admission::UnsupportedFenceType => {
                return Err(RecordAttendanceError::UnsupportedFenceType);
            }
        }

        let record = ActiveModel {
            user_matric: Set(user.user_matric.clone()),
            fence_code: Set(fence.fence_code.clone()),
            geofence_name: Set(fence.name.clone()),
            timestamp: Set(now),
            matric_fence_code: Set(format!("{}{}", user.user_matric, fence.fence_code)),
            ..Default::default()
        };

        match record.insert(db).await {
            Ok(created) => Ok(created),
            Err(e) if crate::is_unique_violation(&e) => Err(RecordAttendanceError::AlreadyRecorded),
            Err(e) => Err(RecordAttendanceError::Db(e)),
        }
    }

    /// A student's own records, newest first, optionally narrowed to one
    /// session name.
    pub async fn list_for_student(
        db: &DbConn,
        user_matric: &str,
        geofence_name: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find().filter(Column::UserMatric.eq(user_matric));
        if let Some(name) = geofence_name {
            query = query.filter(Column::GeofenceName.eq(name));
        }
        query.order_by_desc(Column::Timestamp).all(db).await
    }

    /// All records for one session on one UTC day, joined with the
    /// recording user for display.
    pub async fn list_for_session(
        db: &DbConn,
        geofence_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<(Model, Option<user::Model>)>, DbErr> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        Entity::find()
            .filter(Column::GeofenceName.eq(geofence_name))
            .filter(Column::Timestamp.gte(day_start))
            .filter(Column::Timestamp.lt(day_end))
            .order_by_asc(Column::Timestamp)
            .find_also_related(user::Entity)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geofence::Model as GeofenceModel;
    use crate::models::user::{Model as UserModel, Role};
    use crate::test_utils::setup_test_db;
    use sea_orm::PaginatorTrait;

    const CENTER_LAT: f64 = 6.5244;
    const CENTER_LON: f64 = 3.3792;

    struct Ctx {
        db: DbConn,
        student: UserModel,
        fence: GeofenceModel,
        now: DateTime<Utc>,
    }

    async fn setup() -> Ctx {
        let db = setup_test_db().await;
        let admin = UserModel::create(
            &db,
            "ADM/01/0001",
            "lecturer",
            "lect@test.com",
            "password",
            Role::Admin,
        )
        .await
        .unwrap();
        let student = UserModel::create(
            &db,
            "UG/20/1234",
            "student",
            "stud@test.com",
            "password",
            Role::Student,
        )
        .await
        .unwrap();

        let now = Utc::now();
        let fence = GeofenceModel::create(
            &db,
            &admin.user_matric,
            "GEO101",
            CENTER_LAT,
            CENTER_LON,
            100.0,
            "circle",
            now - Duration::minutes(10),
            now + Duration::minutes(50),
            now,
        )
        .await
        .unwrap();

        Ctx {
            db,
            student,
            fence,
            now,
        }
    }

    #[tokio::test]
    async fn record_at_center_succeeds() {
        let ctx = setup().await;

        let record = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap();

        assert_eq!(record.user_matric, ctx.student.user_matric);
        assert_eq!(record.geofence_name, "GEO101");
        assert_eq!(record.timestamp, ctx.now);
        assert_eq!(
            record.matric_fence_code,
            format!("{}{}", ctx.student.user_matric, ctx.fence.fence_code)
        );
    }

    #[tokio::test]
    async fn record_far_away_is_rejected_outside() {
        let ctx = setup().await;

        // ~8.4 km north of the fence center
        let err = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            6.6000,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RecordAttendanceError::OutsideGeofence { distance_m, .. } if distance_m > 8_000.0
        ));
        assert_eq!(Entity::find().count(&ctx.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn second_record_reports_already_recorded_and_keeps_one_row() {
        let ctx = setup().await;

        Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap();

        let err = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now + Duration::seconds(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RecordAttendanceError::AlreadyRecorded));
        assert_eq!(Entity::find().count(&ctx.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_window_reports_fence_closed_even_when_status_never_flipped() {
        let ctx = setup().await;

        // Stored status is still Active; only the window has lapsed.
        let err = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now + Duration::hours(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RecordAttendanceError::FenceClosed));
    }

    #[tokio::test]
    async fn deactivated_fence_is_reported_as_not_found_or_inactive() {
        let ctx = setup().await;
        GeofenceModel::deactivate(
            &ctx.db,
            &ctx.fence.creator_matric,
            "GEO101",
            ctx.fence.start_time.date_naive(),
        )
        .await
        .unwrap();

        let err = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RecordAttendanceError::FenceNotFoundOrInactive));
    }

    #[tokio::test]
    async fn unknown_code_and_unknown_user_each_have_their_own_kind() {
        let ctx = setup().await;

        let err = Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            "ZZZZ99",
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordAttendanceError::FenceNotFoundOrInactive));

        let err = Model::record(
            &ctx.db,
            "GHOST/00/0000",
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordAttendanceError::UserNotFound));
    }

    #[tokio::test]
    async fn student_listing_filters_by_session_name() {
        let ctx = setup().await;

        Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap();

        let all = Model::list_for_student(&ctx.db, &ctx.student.user_matric, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        let named = Model::list_for_student(&ctx.db, &ctx.student.user_matric, Some("GEO101"))
            .await
            .unwrap();
        assert_eq!(named.len(), 1);

        let other = Model::list_for_student(&ctx.db, &ctx.student.user_matric, Some("GEO999"))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn session_listing_joins_the_recording_user() {
        let ctx = setup().await;

        Model::record(
            &ctx.db,
            &ctx.student.user_matric,
            &ctx.fence.fence_code,
            CENTER_LAT,
            CENTER_LON,
            ctx.now,
        )
        .await
        .unwrap();

        let rows = Model::list_for_session(&ctx.db, "GEO101", ctx.now.date_naive())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let (record, joined) = &rows[0];
        assert_eq!(record.user_matric, ctx.student.user_matric);
        assert_eq!(joined.as_ref().unwrap().username, "student");
    }
}
