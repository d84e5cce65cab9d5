pub mod m20250601_000001_create_users;
pub mod m20250601_000002_create_geofences;
pub mod m20250601_000003_create_attendance_records;
