//! Diesel table definitions. Must match `migrations/*_create_documents`.

diesel::table! {
    /// Every record of every collection. `seq` fixes insertion order.
    documents (seq) {
        seq -> Int8,
        handle -> Varchar,
        collection -> Varchar,
        body -> Jsonb,
    }
}

diesel::table! {
    /// One row per (collection, unique field, value); the primary key is the
    /// uniqueness guarantee.
    document_unique_keys (collection, field, value) {
        collection -> Varchar,
        field -> Varchar,
        value -> Text,
        handle -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(documents, document_unique_keys);
