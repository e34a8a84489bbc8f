use sqlx::MySqlPool;

/// Schema bootstrap. Not a migration system: the statement is idempotent and
/// is issued before every request. Binary collation keeps citizen IDs and
/// periods case- and accent-sensitive.
pub const CREATE_PAYSLIPS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS payslips (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        citizen_id VARCHAR(64) NOT NULL,
        name VARCHAR(255) NOT NULL,
        period VARCHAR(64) NOT NULL,
        period_label VARCHAR(255) NOT NULL,
        upload_date VARCHAR(255) NOT NULL,
        file_name VARCHAR(255) NOT NULL,
        file_size BIGINT NOT NULL,
        status VARCHAR(255) NOT NULL,
        created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        UNIQUE KEY uq_payslips_citizen_period (citizen_id, period)
    ) DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin
"#;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}
