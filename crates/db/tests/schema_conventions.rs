use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table with an `updated_at` column must carry the shared trigger.
#[sqlx::test(migrations = "./migrations")]
async fn test_updated_at_tables_have_trigger(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.columns
         WHERE table_schema = 'public' AND column_name = 'updated_at'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table,) in &tables {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM information_schema.triggers
             WHERE event_object_table = $1
               AND action_statement LIKE '%trigger_set_updated_at%'",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(count > 0, "Table {table} has updated_at but no trigger");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_database_reachable(pool: PgPool) {
    pagecraft_db::health_check(&pool).await.unwrap();
}
